use async_trait::async_trait;
use domain::matching::best_match;
use domain::services::HubApi;
use domain::{ConversationReply, HubEntity, Resolution};
use serde_json::Value;
use shared::error::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// How `find_entity_attributes` answers, independent of the state list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttributeFetch {
    #[default]
    Served,
    Missing,
    Unreachable,
}

/// In-memory hub that records every service call.
///
/// `states == None` behaves like an unreachable hub.
pub struct FakeHub {
    states: Option<Vec<HubEntity>>,
    reply: Option<ConversationReply>,
    components: Vec<String>,
    fail_services: bool,
    attribute_fetch: AttributeFetch,
    calls: Mutex<Vec<(String, String, Value)>>,
    state_fetches: AtomicUsize,
}

impl Default for FakeHub {
    fn default() -> Self {
        Self {
            states: Some(Vec::new()),
            reply: None,
            components: Vec::new(),
            fail_services: false,
            attribute_fetch: AttributeFetch::Served,
            calls: Mutex::new(Vec::new()),
            state_fetches: AtomicUsize::new(0),
        }
    }
}

impl FakeHub {
    pub fn with_states(states: Vec<HubEntity>) -> Self {
        Self {
            states: Some(states),
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            states: None,
            ..Self::default()
        }
    }

    pub fn failing_services(mut self) -> Self {
        self.fail_services = true;
        self
    }

    pub fn with_attribute_fetch(mut self, attribute_fetch: AttributeFetch) -> Self {
        self.attribute_fetch = attribute_fetch;
        self
    }

    pub fn replying(mut self, reply: ConversationReply) -> Self {
        self.reply = Some(reply);
        self
    }

    pub fn with_components(mut self, components: &[&str]) -> Self {
        self.components = components.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<(String, String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn state_fetches(&self) -> usize {
        self.state_fetches.load(Ordering::SeqCst)
    }

    fn unreachable() -> Error {
        Error::Network("connection refused".to_string())
    }
}

#[async_trait]
impl HubApi for FakeHub {
    async fn find_entity(&self, spoken_name: &str, allowed_domains: &[&str]) -> Resolution {
        self.state_fetches.fetch_add(1, Ordering::SeqCst);
        match &self.states {
            Some(states) => best_match(spoken_name, states, allowed_domains)
                .map(|(entity, _)| entity.clone())
                .into(),
            None => Resolution::Error(Self::unreachable()),
        }
    }

    async fn find_entity_attributes(&self, entity_id: &str) -> Resolution {
        match (&self.states, self.attribute_fetch) {
            (None, _) | (_, AttributeFetch::Unreachable) => Resolution::Error(Self::unreachable()),
            (Some(_), AttributeFetch::Missing) => Resolution::NotFound,
            (Some(states), AttributeFetch::Served) => states
                .iter()
                .find(|entity| entity.entity_id == entity_id)
                .cloned()
                .into(),
        }
    }

    async fn execute_service(&self, domain: &str, service: &str, payload: &Value) -> Result<Value> {
        if self.fail_services || self.states.is_none() {
            return Err(Error::HubStatus {
                status: 500,
                url: format!("/api/services/{}/{}", domain, service),
            });
        }
        self.calls
            .lock()
            .unwrap()
            .push((domain.to_string(), service.to_string(), payload.clone()));
        Ok(Value::Array(Vec::new()))
    }

    async fn find_component(&self, name: &str) -> bool {
        self.states.is_some() && self.components.iter().any(|c| c == name)
    }

    async fn engage_conversation(&self, _utterance: &str) -> ConversationReply {
        match (&self.states, &self.reply) {
            (None, _) => ConversationReply::Error(Self::unreachable().to_string()),
            (Some(_), Some(reply)) => reply.clone(),
            (Some(_), None) => ConversationReply::Speech(String::new()),
        }
    }
}
