use anyhow::Context;
use domain::Outcome;
use shared::types::Result;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

const DIALOG_EXTENSION: &str = "dialog";

// Keyed by the outcome key, without the dialog prefix.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("error.setup", "Please configure the Home Assistant skill first."),
    ("error.offline", "I can't reach Home Assistant right now."),
    ("error.sorry", "Sorry, I can't do that."),
    ("device.unknown", "I couldn't find a device called {dev_name}."),
    ("device.already", "{dev_name} is already {action}."),
    ("device.on", "Turned on {dev_name}."),
    ("device.off", "Turned off {dev_name}."),
    ("brightness.badreq", "Brightness has to be between 0 and 100 percent."),
    ("brightness.dimmed", "Set {dev_name} to {percent} percent."),
    ("brightness.cantdim.off", "{dev_name} is off, so I can't change its brightness."),
    ("brightness.cantdim.dimmable", "{dev_name} can't be dimmed."),
    ("brightness.decreased", "Dimmed {dev_name} to {percent} percent."),
    ("brightness.increased", "Brightened {dev_name} to {percent} percent."),
    ("automation.trigger", "Triggered {dev_name}."),
    ("sensor", "{dev_name} is {value} {unit}"),
    ("tracker.found", "{dev_name} is at {location}."),
    ("conversation.reply", "{text}"),
];

/// Turns outcomes into sentences.
///
/// Built-in English templates can be replaced per dialog by files named
/// `homeassistant.<key>.dialog`; the first non-empty line is the template.
#[derive(Debug, Clone)]
pub struct DialogRenderer {
    templates: HashMap<String, String>,
}

impl Default for DialogRenderer {
    fn default() -> Self {
        let templates = BUILTIN_TEMPLATES
            .iter()
            .map(|(key, template)| (key.to_string(), template.to_string()))
            .collect();
        Self { templates }
    }
}

impl DialogRenderer {
    /// Built-in templates overridden by any `.dialog` files in `dir`.
    pub fn with_overrides(dir: &Path) -> Result<Self> {
        let mut renderer = Self::default();
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read dialog directory {}", dir.display()))?;

        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(DIALOG_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            match content.lines().map(str::trim).find(|line| !line.is_empty()) {
                Some(template) => {
                    let key = name
                        .strip_prefix(domain::entities::outcome::DIALOG_PREFIX)
                        .and_then(|rest| rest.strip_prefix('.'))
                        .unwrap_or(name);
                    tracing::debug!("Dialog {} overridden from {}", key, path.display());
                    renderer.templates.insert(key.to_string(), template.to_string());
                }
                None => tracing::warn!("Ignoring empty dialog file {}", path.display()),
            }
        }
        Ok(renderer)
    }

    pub fn render(&self, outcome: &Outcome) -> String {
        let data = outcome.data();
        match self.templates.get(outcome.key()) {
            Some(template) => fill(template, &data),
            None => outcome.dialog_name(),
        }
    }
}

/// Replaces `{name}` placeholders; unknown placeholders are kept verbatim.
fn fill(template: &str, data: &BTreeMap<&'static str, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match data.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.trim_end().to_string()
}
