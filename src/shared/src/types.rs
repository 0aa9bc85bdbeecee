use std::fmt;

pub type Result<T> = anyhow::Result<T>;

// Common types
pub type EntityId = String;

/// A `<domain>.<service>` pair invoked on the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRef {
    pub domain: &'static str,
    pub service: &'static str,
}

impl ServiceRef {
    pub const fn new(domain: &'static str, service: &'static str) -> Self {
        Self { domain, service }
    }
}

impl fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.service)
    }
}

/// Parses the host's boolean-as-string settings; only `"true"` is truthy.
pub fn flag_is_set(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true"))
}
