use async_trait::async_trait;
use domain::entities::conversation::ConversationReply;
use domain::entities::hub_entity::{HubEntity, Resolution};
use domain::matching::best_match;
use domain::services::HubApi;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use shared::error::{Error, Result};
use std::time::Duration;

use crate::config::HubSettings;

/// Upper bound for every hub request.
pub const TIMEOUT: Duration = Duration::from_secs(10);

const ACCESS_HEADER: &str = "x-ha-access";

#[derive(Deserialize)]
struct ConversationResponse {
    speech: ConversationSpeech,
}

#[derive(Deserialize)]
struct ConversationSpeech {
    #[serde(default)]
    plain: Value,
}

/// REST client for a Home Assistant hub.
#[derive(Clone)]
pub struct HubClient {
    client: Client,
    base_url: String,
}

impl HubClient {
    pub fn new(settings: &HubSettings) -> Result<Self> {
        let base_url = settings.base_url()?;
        let accept_invalid_certs = settings.ssl() && !settings.verify();
        Self::build(base_url, settings.token(), accept_invalid_certs)
    }

    /// Client against an explicit base URL, verifying certificates.
    pub fn with_base_url(base_url: impl Into<String>, token: Option<&str>) -> Result<Self> {
        Self::build(base_url.into(), token, false)
    }

    fn build(base_url: String, token: Option<&str>, accept_invalid_certs: bool) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(token)
                .map_err(|_| Error::Configuration("access token contains invalid characters".to_string()))?;
            value.set_sensitive(true);
            headers.insert(ACCESS_HEADER, value);
        }

        let client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(TIMEOUT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        tracing::info!("Created Home Assistant client for {}", base_url);
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<Response> {
        let url = self.url(path);
        let response = self.client.get(&url).send().await?;
        ensure_ok(response, url)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Response> {
        let url = self.url(path);
        let response = self.client.post(&url).json(body).send().await?;
        ensure_ok(response, url)
    }

    /// `GET /api/states`, skipping objects that are not entities.
    pub async fn fetch_states(&self) -> Result<Vec<HubEntity>> {
        let states: Vec<Value> = self.get("/api/states").await?.json().await?;
        Ok(states.into_iter().filter_map(HubEntity::from_value).collect())
    }

    /// `GET /api/states/{entity_id}`.
    pub async fn fetch_state(&self, entity_id: &str) -> Result<HubEntity> {
        let response = self.get(&format!("/api/states/{}", entity_id)).await?;
        Ok(response.json().await?)
    }

    /// `GET /api/components`.
    pub async fn fetch_components(&self) -> Result<Vec<String>> {
        Ok(self.get("/api/components").await?.json().await?)
    }

    /// `POST /api/conversation/process`, returning the plain speech text.
    pub async fn process_conversation(&self, utterance: &str) -> Result<String> {
        let response = self
            .post("/api/conversation/process", &json!({ "text": utterance }))
            .await?;
        let reply: ConversationResponse = response.json().await?;
        // older hubs send the text directly, newer ones nest it
        let text = match reply.speech.plain {
            Value::String(text) => text,
            Value::Object(plain) => plain
                .get("speech")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        };
        Ok(text)
    }
}

fn ensure_ok(response: Response, url: String) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::OK {
        Ok(response)
    } else {
        Err(Error::HubStatus {
            status: status.as_u16(),
            url,
        })
    }
}

#[async_trait]
impl HubApi for HubClient {
    async fn find_entity(&self, spoken_name: &str, allowed_domains: &[&str]) -> Resolution {
        let states = match self.fetch_states().await {
            Ok(states) => states,
            Err(e) => {
                tracing::warn!("Failed to fetch hub states: {}", e);
                return Resolution::Error(e);
            }
        };

        match best_match(spoken_name, &states, allowed_domains) {
            Some((entity, score)) => {
                tracing::debug!("Matched '{}' to {} (score {})", spoken_name, entity.entity_id, score);
                Resolution::Found(entity.clone())
            }
            None => {
                tracing::debug!("No entity matched '{}' in {:?}", spoken_name, allowed_domains);
                Resolution::NotFound
            }
        }
    }

    async fn find_entity_attributes(&self, entity_id: &str) -> Resolution {
        match self.fetch_state(entity_id).await {
            Ok(entity) => Resolution::Found(entity),
            Err(e) => {
                tracing::warn!("Failed to fetch state of {}: {}", entity_id, e);
                Resolution::Error(e)
            }
        }
    }

    async fn execute_service(&self, domain: &str, service: &str, payload: &Value) -> Result<Value> {
        tracing::info!("Calling service {}/{} with {}", domain, service, payload);
        let response = self
            .post(&format!("/api/services/{}/{}", domain, service), payload)
            .await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    async fn find_component(&self, name: &str) -> bool {
        match self.fetch_components().await {
            Ok(components) => components.iter().any(|c| c == name),
            Err(e) => {
                tracing::warn!("Failed to list hub components: {}", e);
                false
            }
        }
    }

    async fn engage_conversation(&self, utterance: &str) -> ConversationReply {
        match self.process_conversation(utterance).await {
            Ok(text) => ConversationReply::Speech(text),
            Err(e) => {
                tracing::warn!("Conversation relay failed: {}", e);
                ConversationReply::Error(e.to_string())
            }
        }
    }
}
