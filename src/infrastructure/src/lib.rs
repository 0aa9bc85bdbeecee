pub mod config;
pub mod hub_client;
pub mod unit_normalizer;

pub use config::HubSettings;
pub use hub_client::HubClient;
pub use unit_normalizer::SpokenUnitNormalizer;
