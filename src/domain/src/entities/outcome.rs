use serde::Serialize;
use std::collections::BTreeMap;

/// Namespace every dialog key lives under.
pub const DIALOG_PREFIX: &str = "homeassistant";

/// Terminal spoken result of handling one intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    SetupError,
    HubOffline,
    Sorry,
    UnknownDevice { dev_name: String },
    AlreadyInState { dev_name: String, action: String },
    DeviceOn { dev_name: String },
    DeviceOff { dev_name: String },
    BrightnessBadRequest,
    BrightnessSet { dev_name: String, brightness: u8, percent: u8 },
    CannotDimWhileOff { dev_name: String },
    NotDimmable { dev_name: String },
    BrightnessDecreased { dev_name: String, brightness: u8, percent: u8 },
    BrightnessIncreased { dev_name: String, brightness: u8, percent: u8 },
    AutomationTriggered { dev_name: String },
    SensorReading { dev_name: String, value: String, unit: String },
    TrackerLocation { dev_name: String, location: String },
    /// Verbatim reply from the hub's conversation agent.
    Spoken { text: String, expect_response: bool },
}

impl Outcome {
    pub fn key(&self) -> &'static str {
        match self {
            Outcome::SetupError => "error.setup",
            Outcome::HubOffline => "error.offline",
            Outcome::Sorry => "error.sorry",
            Outcome::UnknownDevice { .. } => "device.unknown",
            Outcome::AlreadyInState { .. } => "device.already",
            Outcome::DeviceOn { .. } => "device.on",
            Outcome::DeviceOff { .. } => "device.off",
            Outcome::BrightnessBadRequest => "brightness.badreq",
            Outcome::BrightnessSet { .. } => "brightness.dimmed",
            Outcome::CannotDimWhileOff { .. } => "brightness.cantdim.off",
            Outcome::NotDimmable { .. } => "brightness.cantdim.dimmable",
            Outcome::BrightnessDecreased { .. } => "brightness.decreased",
            Outcome::BrightnessIncreased { .. } => "brightness.increased",
            Outcome::AutomationTriggered { .. } => "automation.trigger",
            Outcome::SensorReading { .. } => "sensor",
            Outcome::TrackerLocation { .. } => "tracker.found",
            Outcome::Spoken { .. } => "conversation.reply",
        }
    }

    /// Full dialog name, e.g. `homeassistant.device.on`.
    pub fn dialog_name(&self) -> String {
        format!("{}.{}", DIALOG_PREFIX, self.key())
    }

    /// Template fields carried by this outcome.
    pub fn data(&self) -> BTreeMap<&'static str, String> {
        let mut data = BTreeMap::new();
        match self {
            Outcome::SetupError
            | Outcome::HubOffline
            | Outcome::Sorry
            | Outcome::BrightnessBadRequest => {}
            Outcome::UnknownDevice { dev_name }
            | Outcome::DeviceOn { dev_name }
            | Outcome::DeviceOff { dev_name }
            | Outcome::CannotDimWhileOff { dev_name }
            | Outcome::NotDimmable { dev_name }
            | Outcome::AutomationTriggered { dev_name } => {
                data.insert("dev_name", dev_name.clone());
            }
            Outcome::AlreadyInState { dev_name, action } => {
                data.insert("dev_name", dev_name.clone());
                data.insert("action", action.clone());
            }
            Outcome::BrightnessSet {
                dev_name,
                brightness,
                percent,
            }
            | Outcome::BrightnessDecreased {
                dev_name,
                brightness,
                percent,
            }
            | Outcome::BrightnessIncreased {
                dev_name,
                brightness,
                percent,
            } => {
                data.insert("dev_name", dev_name.clone());
                data.insert("brightness", brightness.to_string());
                data.insert("percent", percent.to_string());
            }
            Outcome::SensorReading {
                dev_name,
                value,
                unit,
            } => {
                data.insert("dev_name", dev_name.clone());
                data.insert("value", value.clone());
                data.insert("unit", unit.clone());
            }
            Outcome::TrackerLocation { dev_name, location } => {
                data.insert("dev_name", dev_name.clone());
                data.insert("location", location.clone());
            }
            Outcome::Spoken { text, .. } => {
                data.insert("text", text.clone());
            }
        }
        data
    }

    /// Whether the voice front end should listen again after speaking.
    pub fn expects_response(&self) -> bool {
        matches!(
            self,
            Outcome::Spoken {
                expect_response: true,
                ..
            }
        )
    }
}

/// Result of offering an unmatched utterance to the conversation relay.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackResult {
    /// This handler produced nothing; other fallback handlers may try.
    Declined,
    Handled(Outcome),
}
