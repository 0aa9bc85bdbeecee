use domain::services::{HubApi, UnitNormalizer};
use domain::{FallbackResult, Intent, Outcome};
use infrastructure::{HubClient, HubSettings, SpokenUnitNormalizer};
use shared::error::Result;
use std::sync::Arc;

use crate::dispatcher::CommandDispatcher;

/// Builds a hub handle from settings.
pub type ClientFactory = Box<dyn Fn(&HubSettings) -> Result<Arc<dyn HubApi>> + Send + Sync>;

const CONVERSATION_COMPONENT: &str = "conversation";

/// One skill session: the current settings plus a lazily built hub handle.
///
/// The handle is never patched in place. [`reconfigure`](Self::reconfigure)
/// throws it away and the next call builds a new one.
pub struct HomeAssistantSkill {
    settings: HubSettings,
    factory: ClientFactory,
    normalizer: Arc<dyn UnitNormalizer>,
    dispatcher: Option<CommandDispatcher>,
    fallback_enabled: bool,
}

impl HomeAssistantSkill {
    /// Session talking to a real hub over REST.
    pub fn new(settings: HubSettings) -> Self {
        Self::with_factory(
            settings,
            Box::new(|settings: &HubSettings| -> Result<Arc<dyn HubApi>> {
                Ok(Arc::new(HubClient::new(settings)?) as Arc<dyn HubApi>)
            }),
        )
        .with_normalizer(Arc::new(SpokenUnitNormalizer))
    }

    pub fn with_factory(settings: HubSettings, factory: ClientFactory) -> Self {
        Self {
            settings,
            factory,
            normalizer: Arc::new(domain::services::NoopUnitNormalizer),
            dispatcher: None,
            fallback_enabled: false,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Arc<dyn UnitNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }

    pub fn is_ready(&self) -> bool {
        self.dispatcher.is_some()
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    /// Builds the hub handle unless one already exists.
    pub async fn setup(&mut self) {
        if self.dispatcher.is_some() {
            return;
        }

        let hub = match (self.factory)(&self.settings) {
            Ok(hub) => hub,
            Err(e) => {
                tracing::warn!("Home Assistant skill is not configured: {}", e);
                return;
            }
        };

        self.fallback_enabled = self.settings.enable_fallback()
            && hub.find_component(CONVERSATION_COMPONENT).await;
        tracing::info!(
            "Home Assistant skill ready (fallback {})",
            if self.fallback_enabled { "enabled" } else { "disabled" }
        );

        self.dispatcher = Some(
            CommandDispatcher::new(hub, self.settings.language())
                .with_normalizer(self.normalizer.clone()),
        );
    }

    /// Replaces the settings and rebuilds the hub handle from scratch.
    pub async fn reconfigure(&mut self, settings: HubSettings) {
        tracing::debug!("Settings changed, rebuilding hub client");
        self.settings = settings;
        self.shutdown();
        self.setup().await;
    }

    pub async fn handle_intent(&mut self, intent: &Intent) -> Outcome {
        self.setup().await;
        match &self.dispatcher {
            Some(dispatcher) => dispatcher.dispatch(intent).await,
            None => Outcome::SetupError,
        }
    }

    /// Offers an unrecognized utterance to the hub's conversation agent.
    pub async fn handle_fallback(&mut self, utterance: &str) -> FallbackResult {
        self.setup().await;
        if !self.fallback_enabled {
            return FallbackResult::Declined;
        }
        match &self.dispatcher {
            Some(dispatcher) => dispatcher.relay_conversation(utterance).await,
            None => FallbackResult::Declined,
        }
    }

    /// Hub components, for diagnostics.
    pub async fn has_component(&mut self, name: &str) -> Option<bool> {
        self.setup().await;
        match &self.dispatcher {
            Some(dispatcher) => Some(dispatcher.hub().find_component(name).await),
            None => None,
        }
    }

    pub fn shutdown(&mut self) {
        self.dispatcher = None;
        self.fallback_enabled = false;
    }
}
