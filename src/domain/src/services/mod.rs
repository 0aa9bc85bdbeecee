//! Domain service traits.

use async_trait::async_trait;
use serde_json::Value;
use shared::error::Result;

use crate::entities::conversation::ConversationReply;
use crate::entities::hub_entity::Resolution;

/// Everything the dispatcher needs from the home-automation hub.
///
/// Lookup methods fold transport and status failures into their return
/// value so callers see one uniform "hub offline" condition.
#[async_trait]
pub trait HubApi: Send + Sync {
    /// Fetches all states and fuzzy-matches `spoken_name` against those in
    /// `allowed_domains`.
    async fn find_entity(&self, spoken_name: &str, allowed_domains: &[&str]) -> Resolution;

    /// Fetches a single entity's full state.
    async fn find_entity_attributes(&self, entity_id: &str) -> Resolution;

    /// Calls `/api/services/{domain}/{service}`; the body is returned raw.
    async fn execute_service(&self, domain: &str, service: &str, payload: &Value) -> Result<Value>;

    /// True iff the hub reports `name` among its loaded components.
    async fn find_component(&self, name: &str) -> bool;

    /// Relays free text to the hub's conversation agent.
    async fn engage_conversation(&self, utterance: &str) -> ConversationReply;
}

/// A sensor value about to be spoken.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub name: String,
    pub value: String,
    pub unit: String,
}

/// Rewrites a sensor value/unit into something that reads well aloud.
///
/// Best effort: returning `None` leaves the reading untouched.
pub trait UnitNormalizer: Send + Sync {
    fn normalize(&self, reading: &SensorReading) -> Option<SensorReading>;
}

/// Leaves every reading as the hub reported it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUnitNormalizer;

impl UnitNormalizer for NoopUnitNormalizer {
    fn normalize(&self, _reading: &SensorReading) -> Option<SensorReading> {
        None
    }
}
