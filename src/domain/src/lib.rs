//! Home Assistant skill domain model.
//!
//! Entities as the hub reports them, the intents a voice front end hands
//! over, the spoken outcomes the dispatcher produces, and the pure logic
//! (fuzzy matching, brightness arithmetic) shared by every layer.

pub mod brightness;
pub mod entities;
pub mod matching;
pub mod services;

pub use entities::conversation::ConversationReply;
pub use entities::hub_entity::{HubEntity, Resolution};
pub use entities::intent::{BrightnessDirection, Intent, SwitchAction};
pub use entities::outcome::{FallbackResult, Outcome};
