//! End-to-end checks of the skill against a mock Home Assistant hub.

pub mod fixtures;

#[cfg(test)]
mod scenarios;
