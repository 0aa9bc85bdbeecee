use application::HomeAssistantSkill;
use domain::entities::conversation::UNPARSED_SENTINEL;
use domain::{BrightnessDirection, FallbackResult, Intent, Outcome};
use mockito::{Matcher, Server, ServerGuard};
use presentation::DialogRenderer;
use serde_json::json;

use crate::fixtures::{hub_state, settings_for, states_body};

fn kitchen_states(state: &str) -> String {
    states_body(&[
        hub_state("light.kitchen", state, json!({"friendly_name": "Kitchen Light"})),
        hub_state(
            "sensor.outside_temperature",
            "21.50",
            json!({"friendly_name": "Outside Temperature", "unit_of_measurement": "°C"}),
        ),
    ])
}

async fn hub_with_states(body: String) -> ServerGuard {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/states")
        .match_header("x-ha-access", "secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;
    server
}

fn switch(action: &str, entity: &str) -> Intent {
    Intent::Switch {
        action: action.into(),
        entity: entity.into(),
    }
}

#[tokio::test]
async fn kitchen_light_turns_on() {
    let mut server = hub_with_states(kitchen_states("off")).await;
    let turn_on = server
        .mock("POST", "/api/services/homeassistant/turn_on")
        .match_header("x-ha-access", "secret")
        .match_body(Matcher::Json(json!({"entity_id": "light.kitchen"})))
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let mut skill = HomeAssistantSkill::new(settings_for(&server.host_with_port(), &[]));
    let outcome = skill.handle_intent(&switch("on", "kitchen light")).await;

    turn_on.assert_async().await;
    assert_eq!(outcome.key(), "device.on");
    assert_eq!(outcome.data()["dev_name"], "Kitchen Light");
    assert_eq!(DialogRenderer::default().render(&outcome), "Turned on Kitchen Light.");
}

#[tokio::test]
async fn light_already_off_is_left_alone() {
    let mut server = hub_with_states(kitchen_states("off")).await;
    let any_service = server
        .mock("POST", Matcher::Regex(r"^/api/services/".to_string()))
        .expect(0)
        .create_async()
        .await;

    let mut skill = HomeAssistantSkill::new(settings_for(&server.host_with_port(), &[]));
    let outcome = skill.handle_intent(&switch("off", "kitchen light")).await;

    any_service.assert_async().await;
    assert_eq!(
        outcome,
        Outcome::AlreadyInState {
            dev_name: "Kitchen Light".into(),
            action: "off".into()
        }
    );
}

#[tokio::test]
async fn unreachable_hub_is_offline() {
    // nothing listens on the discard port
    let mut skill = HomeAssistantSkill::new(settings_for("127.0.0.1:9", &[]));
    let outcome = skill.handle_intent(&switch("on", "kitchen light")).await;

    assert_eq!(outcome, Outcome::HubOffline);
    assert_eq!(outcome.dialog_name(), "homeassistant.error.offline");
}

#[tokio::test]
async fn server_error_is_offline_too() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/states")
        .with_status(500)
        .create_async()
        .await;

    let mut skill = HomeAssistantSkill::new(settings_for(&server.host_with_port(), &[]));
    assert_eq!(
        skill.handle_intent(&switch("on", "kitchen light")).await,
        Outcome::HubOffline
    );
}

#[tokio::test]
async fn unmatched_phrase_is_unknown_device() {
    let server = hub_with_states(kitchen_states("off")).await;

    let mut skill = HomeAssistantSkill::new(settings_for(&server.host_with_port(), &[]));
    let outcome = skill.handle_intent(&switch("on", "garage door opener")).await;

    assert_eq!(
        outcome,
        Outcome::UnknownDevice {
            dev_name: "garage door opener".into()
        }
    );
}

#[tokio::test]
async fn missing_host_is_a_setup_error() {
    let mut skill = HomeAssistantSkill::new(Default::default());
    assert_eq!(
        skill.handle_intent(&switch("on", "kitchen light")).await,
        Outcome::SetupError
    );
}

#[tokio::test]
async fn dimming_reads_current_brightness() {
    let mut server = hub_with_states(kitchen_states("on")).await;
    server
        .mock("GET", "/api/states/light.kitchen")
        .with_status(200)
        .with_body(
            hub_state(
                "light.kitchen",
                "on",
                json!({"friendly_name": "Kitchen Light", "brightness": 30}),
            )
            .to_string(),
        )
        .create_async()
        .await;
    let turn_on = server
        .mock("POST", "/api/services/homeassistant/turn_on")
        .match_body(Matcher::Json(json!({"entity_id": "light.kitchen", "brightness": 10})))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let mut skill = HomeAssistantSkill::new(settings_for(&server.host_with_port(), &[]));
    let outcome = skill
        .handle_intent(&Intent::AdjustBrightness {
            entity: "kitchen light".into(),
            direction: BrightnessDirection::Decrease,
            value: Some("20%".into()),
        })
        .await;

    turn_on.assert_async().await;
    assert_eq!(outcome.key(), "brightness.decreased");
    assert_eq!(outcome.data()["brightness"], "10");
}

#[tokio::test]
async fn sensor_units_are_spoken() {
    let server = hub_with_states(kitchen_states("off")).await;

    let mut skill = HomeAssistantSkill::new(settings_for(&server.host_with_port(), &[]));
    let outcome = skill
        .handle_intent(&Intent::Sensor {
            entity: "outside temperature".into(),
        })
        .await;

    assert_eq!(
        DialogRenderer::default().render(&outcome),
        "Outside Temperature is 21.5 degrees Celsius"
    );
}

async fn conversation_hub(reply: serde_json::Value) -> ServerGuard {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/components")
        .with_status(200)
        .with_body(r#"["homeassistant", "light", "conversation"]"#)
        .create_async()
        .await;
    server
        .mock("POST", "/api/conversation/process")
        .match_body(Matcher::PartialJson(json!({"text": "is the door locked"})))
        .with_status(200)
        .with_body(json!({ "speech": { "plain": reply } }).to_string())
        .create_async()
        .await;
    server
}

#[tokio::test]
async fn sentinel_reply_declines_the_utterance() {
    let server = conversation_hub(json!(UNPARSED_SENTINEL)).await;

    let mut skill = HomeAssistantSkill::new(settings_for(
        &server.host_with_port(),
        &[("enable_fallback", "true")],
    ));
    assert_eq!(
        skill.handle_fallback("is the door locked").await,
        FallbackResult::Declined
    );
    assert!(skill.fallback_enabled());
}

#[tokio::test]
async fn conversation_reply_is_spoken() {
    let server = conversation_hub(json!({"speech": "Which door?"})).await;

    let mut skill = HomeAssistantSkill::new(settings_for(
        &server.host_with_port(),
        &[("enable_fallback", "true")],
    ));
    let result = skill.handle_fallback("is the door locked").await;

    assert_eq!(
        result,
        FallbackResult::Handled(Outcome::Spoken {
            text: "Which door?".into(),
            expect_response: true
        })
    );
}

#[tokio::test]
async fn fallback_stays_off_unless_enabled() {
    let server = conversation_hub(json!("The door is locked")).await;

    let mut skill = HomeAssistantSkill::new(settings_for(&server.host_with_port(), &[]));
    assert_eq!(
        skill.handle_fallback("is the door locked").await,
        FallbackResult::Declined
    );
}
