use anyhow::Context;
use dotenvy::dotenv;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use shared::error::{Error, Result};
use shared::types::flag_is_set;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8123;
pub const DEFAULT_LANGUAGE: &str = "en-us";

// Settings arrive as strings from the voice host, but config files may
// carry real numbers and booleans.
fn scalar_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

/// Skill settings as the voice host exposes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubSettings {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub host: Option<String>,
    /// Static access token sent as `x-ha-access`.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub portnum: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub ssl: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub verify: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub enable_fallback: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub lang: Option<String>,
}

impl HubSettings {
    /// Builds settings from the host's string map.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| map.get(key).cloned())
    }

    /// Reads `HASS_*` environment variables, after loading `.env`.
    pub fn from_env() -> Self {
        dotenv().ok();
        let settings = Self::from_lookup(|key| env::var(format!("HASS_{}", key.to_uppercase())).ok());
        Self {
            // HASS_PORT reads more naturally than HASS_PORTNUM
            portnum: settings
                .portnum
                .or_else(|| env::var("HASS_PORT").ok()),
            ..settings
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("host"),
            password: lookup("password"),
            portnum: lookup("portnum"),
            ssl: lookup("ssl"),
            verify: lookup("verify"),
            enable_fallback: lookup("enable_fallback"),
            lang: lookup("lang"),
        }
    }

    /// Loads settings from a TOML or JSON file.
    pub fn load_from_file(path: &Path) -> shared::types::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let settings: Self = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                // Try to detect format from content
                if content.trim().starts_with('{') {
                    serde_json::from_str(&content)?
                } else {
                    toml::from_str(&content)?
                }
            }
        };
        Ok(settings)
    }

    /// Settings file locations, highest priority first.
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("homeassistant.toml")];
        if let Ok(home) = env::var("HOME") {
            let dir = PathBuf::from(home).join(".config/homeassistant-skill");
            paths.push(dir.join("settings.toml"));
            paths.push(dir.join("settings.json"));
        }
        paths
    }

    /// Resolves settings from an explicit file, else the first settings
    /// file found, with environment variables filling any gaps.
    pub fn load(explicit: Option<&Path>) -> shared::types::Result<Self> {
        let from_file = match explicit {
            Some(path) => Some(Self::load_from_file(path)?),
            None => Self::config_paths()
                .into_iter()
                .filter(|path| path.exists())
                .find_map(|path| match Self::load_from_file(&path) {
                    Ok(settings) => Some(settings),
                    Err(e) => {
                        tracing::warn!("Failed to load settings from {}: {}", path.display(), e);
                        None
                    }
                }),
        };

        let env_settings = Self::from_env();
        Ok(match from_file {
            Some(settings) => settings.or(env_settings),
            None => env_settings,
        })
    }

    /// Fills unset fields from `other`.
    pub fn or(self, other: Self) -> Self {
        Self {
            host: self.host.or(other.host),
            password: self.password.or(other.password),
            portnum: self.portnum.or(other.portnum),
            ssl: self.ssl.or(other.ssl),
            verify: self.verify.or(other.verify),
            enable_fallback: self.enable_fallback.or(other.enable_fallback),
            lang: self.lang.or(other.lang),
        }
    }

    pub fn ssl(&self) -> bool {
        flag_is_set(self.ssl.as_deref())
    }

    /// Certificate verification stays on unless explicitly disabled.
    pub fn verify(&self) -> bool {
        match self.verify.as_deref() {
            None => true,
            value => flag_is_set(value),
        }
    }

    pub fn enable_fallback(&self) -> bool {
        flag_is_set(self.enable_fallback.as_deref())
    }

    pub fn language(&self) -> &str {
        self.lang
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn token(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Hub port; absent, empty or `0` means the default 8123.
    pub fn port(&self) -> Result<u16> {
        let raw = match self.portnum.as_deref().map(str::trim) {
            None | Some("") => return Ok(DEFAULT_PORT),
            Some(raw) => raw,
        };
        let port: u16 = raw
            .parse()
            .map_err(|_| Error::Configuration(format!("invalid port number '{}'", raw)))?;
        Ok(if port == 0 { DEFAULT_PORT } else { port })
    }

    pub fn host(&self) -> Result<&str> {
        self.host
            .as_deref()
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .ok_or_else(|| Error::Configuration("hub host is not set".to_string()))
    }

    /// `http(s)://host:port`.
    pub fn base_url(&self) -> Result<String> {
        let scheme = if self.ssl() { "https" } else { "http" };
        Ok(format!("{}://{}:{}", scheme, self.host()?, self.port()?))
    }
}
