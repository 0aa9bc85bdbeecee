use serde::{Deserialize, Serialize};
use std::fmt;

pub const SWITCH_ON_DOMAINS: &[&str] = &["group", "light", "fan", "switch", "scene", "input_boolean"];
// scenes can't be turned off or toggled
pub const SWITCH_OFF_DOMAINS: &[&str] = &["group", "light", "fan", "switch", "input_boolean"];
pub const LIGHT_DOMAINS: &[&str] = &["group", "light"];
pub const AUTOMATION_DOMAINS: &[&str] = &["automation", "scene", "script"];
pub const SENSOR_DOMAINS: &[&str] = &["sensor"];
pub const TRACKER_DOMAINS: &[&str] = &["device_tracker"];

/// A recognized voice command with its slot values.
///
/// Numeric slots stay as raw text; the dispatcher validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Switch {
        action: String,
        entity: String,
    },
    SetBrightness {
        entity: String,
        value: Option<String>,
    },
    AdjustBrightness {
        entity: String,
        direction: BrightnessDirection,
        value: Option<String>,
    },
    Automation {
        entity: String,
    },
    Sensor {
        entity: String,
    },
    Tracker {
        entity: String,
    },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Switch { .. } => "SwitchIntent",
            Intent::SetBrightness { .. } => "LightSetBrightnessIntent",
            Intent::AdjustBrightness { .. } => "LightAdjBrightnessIntent",
            Intent::Automation { .. } => "AutomationIntent",
            Intent::Sensor { .. } => "SensorIntent",
            Intent::Tracker { .. } => "TrackerIntent",
        }
    }

    /// The spoken entity phrase.
    pub fn entity(&self) -> &str {
        match self {
            Intent::Switch { entity, .. }
            | Intent::SetBrightness { entity, .. }
            | Intent::AdjustBrightness { entity, .. }
            | Intent::Automation { entity }
            | Intent::Sensor { entity }
            | Intent::Tracker { entity } => entity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrightnessDirection {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchAction {
    On,
    Off,
    Toggle,
}

impl SwitchAction {
    /// Maps an action token to a switch action, translating localized
    /// verbs first. Returns `None` for tokens with no matching service.
    pub fn parse(action: &str, language: &str) -> Option<Self> {
        let action = action.trim().to_lowercase();
        let canonical = localized_synonym(&action, language).unwrap_or(action.as_str());
        match canonical {
            "on" => Some(SwitchAction::On),
            "off" => Some(SwitchAction::Off),
            "toggle" => Some(SwitchAction::Toggle),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SwitchAction::On => "on",
            SwitchAction::Off => "off",
            SwitchAction::Toggle => "toggle",
        }
    }

    pub fn allowed_domains(self) -> &'static [&'static str] {
        match self {
            SwitchAction::On => SWITCH_ON_DOMAINS,
            SwitchAction::Off | SwitchAction::Toggle => SWITCH_OFF_DOMAINS,
        }
    }

    /// Hub service under the `homeassistant` domain.
    pub fn service(self) -> &'static str {
        match self {
            SwitchAction::On => "turn_on",
            SwitchAction::Off => "turn_off",
            SwitchAction::Toggle => "toggle",
        }
    }
}

impl fmt::Display for SwitchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn localized_synonym(action: &str, language: &str) -> Option<&'static str> {
    let language = language.to_lowercase();
    if language.starts_with("de") {
        return match action {
            "ein" | "an" => Some("on"),
            "aus" => Some("off"),
            "umschalten" => Some("toggle"),
            _ => None,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_actions() {
        assert_eq!(SwitchAction::parse("on", "en-us"), Some(SwitchAction::On));
        assert_eq!(SwitchAction::parse(" OFF ", "en-us"), Some(SwitchAction::Off));
        assert_eq!(SwitchAction::parse("toggle", "en-us"), Some(SwitchAction::Toggle));
        assert_eq!(SwitchAction::parse("open", "en-us"), None);
    }

    #[test]
    fn german_verbs_are_translated() {
        assert_eq!(SwitchAction::parse("ein", "de"), Some(SwitchAction::On));
        assert_eq!(SwitchAction::parse("aus", "de-de"), Some(SwitchAction::Off));
        assert_eq!(SwitchAction::parse("ein", "en-us"), None);
    }

    #[test]
    fn scenes_only_allowed_for_on() {
        assert!(SwitchAction::On.allowed_domains().contains(&"scene"));
        assert!(!SwitchAction::Off.allowed_domains().contains(&"scene"));
        assert!(!SwitchAction::Toggle.allowed_domains().contains(&"scene"));
    }

    #[test]
    fn intent_deserializes_from_tagged_json() {
        let intent: Intent = serde_json::from_str(
            r#"{"intent":"adjust_brightness","entity":"hall","direction":"decrease","value":null}"#,
        )
        .unwrap();
        assert_eq!(intent.name(), "LightAdjBrightnessIntent");
        assert_eq!(intent.entity(), "hall");
    }
}
