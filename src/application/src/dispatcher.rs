use domain::brightness::{self, PercentError, DEFAULT_STEP_PERCENT};
use domain::entities::intent::{
    AUTOMATION_DOMAINS, LIGHT_DOMAINS, SENSOR_DOMAINS, TRACKER_DOMAINS,
};
use domain::services::{HubApi, NoopUnitNormalizer, SensorReading, UnitNormalizer};
use domain::{BrightnessDirection, FallbackResult, HubEntity, Intent, Outcome, Resolution, SwitchAction};
use serde_json::{json, Value};
use shared::types::ServiceRef;
use std::sync::Arc;

const HOMEASSISTANT: &str = "homeassistant";
const TURN_ON: ServiceRef = ServiceRef::new(HOMEASSISTANT, "turn_on");
const TRIGGER_AUTOMATION: ServiceRef = ServiceRef::new("automation", "trigger");

/// A guarded step either yields a value or ends the intent with an outcome.
type Step<T> = std::result::Result<T, Outcome>;

/// Turns intents into hub service calls and spoken outcomes.
pub struct CommandDispatcher {
    hub: Arc<dyn HubApi>,
    language: String,
    normalizer: Arc<dyn UnitNormalizer>,
}

impl CommandDispatcher {
    pub fn new(hub: Arc<dyn HubApi>, language: impl Into<String>) -> Self {
        Self {
            hub,
            language: language.into(),
            normalizer: Arc::new(NoopUnitNormalizer),
        }
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn UnitNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn hub(&self) -> &Arc<dyn HubApi> {
        &self.hub
    }

    pub async fn dispatch(&self, intent: &Intent) -> Outcome {
        tracing::debug!("Starting {} for '{}'", intent.name(), intent.entity());
        let result = match intent {
            Intent::Switch { action, entity } => self.switch(action, entity).await,
            Intent::SetBrightness { entity, value } => {
                self.set_brightness(entity, value.as_deref()).await
            }
            Intent::AdjustBrightness {
                entity,
                direction,
                value,
            } => self.adjust_brightness(entity, *direction, value.as_deref()).await,
            Intent::Automation { entity } => self.automation(entity).await,
            Intent::Sensor { entity } => self.sensor(entity).await,
            Intent::Tracker { entity } => self.tracker(entity).await,
        };
        let outcome = result.unwrap_or_else(|outcome| outcome);
        tracing::debug!("{} finished with {}", intent.name(), outcome.dialog_name());
        outcome
    }

    /// Offers free text to the hub's conversation agent.
    pub async fn relay_conversation(&self, utterance: &str) -> FallbackResult {
        let reply = self.hub.engage_conversation(utterance).await;
        match reply.answer() {
            Some(answer) => FallbackResult::Handled(Outcome::Spoken {
                text: answer.to_string(),
                expect_response: answer.ends_with('?'),
            }),
            None => {
                tracing::debug!("Conversation agent gave no usable answer: {:?}", reply);
                FallbackResult::Declined
            }
        }
    }

    async fn resolve(&self, spoken: &str, domains: &[&str]) -> Step<HubEntity> {
        match self.hub.find_entity(spoken, domains).await {
            Resolution::Found(entity) => {
                tracing::debug!("Entity {} is '{}'", entity.entity_id, entity.state);
                Ok(entity)
            }
            Resolution::NotFound => Err(Outcome::UnknownDevice {
                dev_name: spoken.to_string(),
            }),
            Resolution::Error(_) => Err(Outcome::HubOffline),
        }
    }

    async fn execute(&self, service: ServiceRef, payload: Value) -> Step<()> {
        match self
            .hub
            .execute_service(service.domain, service.service, &payload)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::warn!("Service {} failed: {}", service, e);
                Err(Outcome::HubOffline)
            }
        }
    }

    async fn switch(&self, action: &str, spoken: &str) -> Step<Outcome> {
        let Some(action) = SwitchAction::parse(action, &self.language) else {
            tracing::debug!("No service for switch action '{}'", action);
            return Ok(Outcome::Sorry);
        };

        let entity = self.resolve(spoken, action.allowed_domains()).await?;
        let dev_name = entity.friendly_name().to_string();

        if entity.state == action.as_str() {
            tracing::debug!("{} already {}", entity.entity_id, action);
            return Ok(Outcome::AlreadyInState {
                dev_name,
                action: action.to_string(),
            });
        }

        let service = ServiceRef::new(HOMEASSISTANT, action.service());
        self.execute(service, json!({ "entity_id": entity.entity_id }))
            .await?;

        // toggling is left to the hub; the dialog follows the state we saw
        let turned_on = match action {
            SwitchAction::On => true,
            SwitchAction::Off => false,
            SwitchAction::Toggle => entity.is_off(),
        };
        Ok(if turned_on {
            Outcome::DeviceOn { dev_name }
        } else {
            Outcome::DeviceOff { dev_name }
        })
    }

    async fn set_brightness(&self, spoken: &str, value: Option<&str>) -> Step<Outcome> {
        let percent = requested_percent(value)?;
        let level = brightness::percent_to_level(percent);
        tracing::debug!("Brightness {}% -> level {}", percent, level);

        let entity = self.resolve(spoken, LIGHT_DOMAINS).await?;
        self.execute(
            TURN_ON,
            json!({ "entity_id": entity.entity_id, "brightness": level }),
        )
        .await?;

        Ok(Outcome::BrightnessSet {
            dev_name: entity.friendly_name().to_string(),
            brightness: level,
            percent: percent.round() as u8,
        })
    }

    async fn adjust_brightness(
        &self,
        spoken: &str,
        direction: BrightnessDirection,
        value: Option<&str>,
    ) -> Step<Outcome> {
        let delta = brightness::percent_to_level(requested_percent(value)?);

        let entity = self.resolve(spoken, LIGHT_DOMAINS).await?;
        let dev_name = entity.friendly_name().to_string();
        if entity.is_off() {
            return Ok(Outcome::CannotDimWhileOff { dev_name });
        }

        let current = match self.hub.find_entity_attributes(&entity.entity_id).await {
            Resolution::Found(attrs) => attrs.brightness(),
            Resolution::NotFound => {
                return Ok(Outcome::UnknownDevice {
                    dev_name: spoken.to_string(),
                })
            }
            Resolution::Error(_) => return Ok(Outcome::HubOffline),
        };
        let Some(current) = current else {
            return Ok(Outcome::NotDimmable { dev_name });
        };

        let level = match direction {
            BrightnessDirection::Decrease => brightness::decrease(current, delta),
            BrightnessDirection::Increase => brightness::increase(current, delta),
        };
        tracing::debug!("Brightness {} -> {} ({:?} by {})", current, level, direction, delta);

        self.execute(
            TURN_ON,
            json!({ "entity_id": entity.entity_id, "brightness": level }),
        )
        .await?;

        let percent = brightness::level_to_percent(level);
        Ok(match direction {
            BrightnessDirection::Decrease => Outcome::BrightnessDecreased {
                dev_name,
                brightness: level,
                percent,
            },
            BrightnessDirection::Increase => Outcome::BrightnessIncreased {
                dev_name,
                brightness: level,
                percent,
            },
        })
    }

    async fn automation(&self, spoken: &str) -> Step<Outcome> {
        let entity = self.resolve(spoken, AUTOMATION_DOMAINS).await?;
        let dev_name = entity.friendly_name().to_string();
        let payload = json!({ "entity_id": entity.entity_id });
        tracing::debug!("Triggering {}", entity.entity_id);

        match entity.domain() {
            "automation" => {
                self.execute(TRIGGER_AUTOMATION, payload).await?;
                Ok(Outcome::AutomationTriggered { dev_name })
            }
            "script" => {
                self.execute(TURN_ON, payload).await?;
                Ok(Outcome::AutomationTriggered { dev_name })
            }
            "scene" => {
                self.execute(TURN_ON, payload).await?;
                Ok(Outcome::DeviceOn { dev_name })
            }
            _ => Ok(Outcome::Sorry),
        }
    }

    async fn sensor(&self, spoken: &str) -> Step<Outcome> {
        let entity = self.resolve(spoken, SENSOR_DOMAINS).await?;
        let reading = SensorReading {
            name: entity.friendly_name().to_string(),
            value: entity.state.clone(),
            unit: entity.unit_of_measurement().unwrap_or_default().to_string(),
        };
        let reading = self.normalizer.normalize(&reading).unwrap_or(reading);

        Ok(Outcome::SensorReading {
            dev_name: reading.name,
            value: reading.value,
            unit: reading.unit,
        })
    }

    async fn tracker(&self, spoken: &str) -> Step<Outcome> {
        let entity = self.resolve(spoken, TRACKER_DOMAINS).await?;
        Ok(Outcome::TrackerLocation {
            dev_name: entity.friendly_name().to_string(),
            location: entity.state.clone(),
        })
    }
}

fn requested_percent(value: Option<&str>) -> Step<f64> {
    brightness::parse_percent(value, DEFAULT_STEP_PERCENT).map_err(|e| {
        tracing::debug!("Rejected brightness value: {}", e);
        match e {
            PercentError::NotANumber(_) => Outcome::Sorry,
            PercentError::OutOfRange(_) => Outcome::BrightnessBadRequest,
        }
    })
}
