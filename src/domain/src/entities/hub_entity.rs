use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use shared::types::EntityId;

const UNKNOWN_STATE: &str = "unknown";

fn unknown_state() -> String {
    UNKNOWN_STATE.to_string()
}

fn state_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(state)) => state,
        Some(Value::Null) | None => unknown_state(),
        Some(other) => other.to_string(),
    })
}

fn attributes_or_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(attributes)) => attributes,
        _ => Map::new(),
    })
}

// Timestamps are advisory: anything unparseable becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::String(raw)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(parse_timestamp(&raw))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    // offset-less values are taken as UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|at| at.and_utc())
}

/// One device, automation, sensor or scene as reported by `/api/states`.
///
/// Built fresh from every hub response and dropped once the intent that
/// fetched it has been answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubEntity {
    pub entity_id: EntityId,
    #[serde(default = "unknown_state", deserialize_with = "state_or_unknown")]
    pub state: String,
    #[serde(default, deserialize_with = "attributes_or_empty")]
    pub attributes: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_changed: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl HubEntity {
    pub fn new(entity_id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            state: state.into(),
            attributes: Map::new(),
            last_changed: None,
            last_updated: None,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// Parses a hub state object, returning `None` for anything without
    /// an `entity_id`.
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Entity type prefix, e.g. `light` for `light.kitchen`.
    pub fn domain(&self) -> &str {
        self.entity_id
            .split_once('.')
            .map(|(domain, _)| domain)
            .unwrap_or(&self.entity_id)
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attribute(key).and_then(Value::as_str)
    }

    /// The `friendly_name` attribute, if the hub sent one.
    pub fn declared_name(&self) -> Option<&str> {
        self.attribute_str("friendly_name")
    }

    /// A name suitable for speaking: `friendly_name`, else the raw id.
    pub fn friendly_name(&self) -> &str {
        self.declared_name().unwrap_or(&self.entity_id)
    }

    /// Current brightness level (0-255) for dimmable lights.
    pub fn brightness(&self) -> Option<u8> {
        let value = self.attribute("brightness")?;
        let level = value
            .as_u64()
            .map(|v| v as f64)
            .or_else(|| value.as_f64())?;
        Some(level.round().clamp(0.0, 255.0) as u8)
    }

    pub fn unit_of_measurement(&self) -> Option<&str> {
        self.attribute_str("unit_of_measurement")
    }

    pub fn is_off(&self) -> bool {
        self.state == "off"
    }
}

/// Result of asking the hub for an entity.
///
/// Exactly one of resolved, not found, or a transport/status failure.
#[derive(Debug)]
pub enum Resolution {
    Found(HubEntity),
    NotFound,
    Error(shared::Error),
}

impl From<Option<HubEntity>> for Resolution {
    fn from(entity: Option<HubEntity>) -> Self {
        entity.map_or(Resolution::NotFound, Resolution::Found)
    }
}
