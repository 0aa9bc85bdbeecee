pub mod conversation;
pub mod hub_entity;
pub mod intent;
pub mod outcome;
