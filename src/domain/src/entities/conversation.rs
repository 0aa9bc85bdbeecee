/// Reply from the hub's conversation component.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationReply {
    Speech(String),
    Error(String),
}

/// What the hub answers when its conversation agent could not parse the text.
pub const UNPARSED_SENTINEL: &str = "Sorry, I didn't understand that";

impl ConversationReply {
    /// The spoken answer, or `None` when the hub produced nothing usable.
    pub fn answer(&self) -> Option<&str> {
        match self {
            ConversationReply::Speech(text) => {
                let text = text.trim();
                if text.is_empty() || text == UNPARSED_SENTINEL {
                    None
                } else {
                    Some(text)
                }
            }
            ConversationReply::Error(_) => None,
        }
    }
}
