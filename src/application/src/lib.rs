pub mod dispatcher;
pub mod skill;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::CommandDispatcher;
pub use skill::HomeAssistantSkill;
