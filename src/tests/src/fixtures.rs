use infrastructure::HubSettings;
use serde_json::{json, Value};
use std::collections::HashMap;

/// One entry of `GET /api/states`.
pub fn hub_state(entity_id: &str, state: &str, attributes: Value) -> Value {
    json!({
        "entity_id": entity_id,
        "state": state,
        "attributes": attributes,
        "last_changed": "2018-02-12T19:04:51.123456+00:00",
        "last_updated": "2018-02-12T19:04:51.123456+00:00"
    })
}

pub fn states_body(states: &[Value]) -> String {
    Value::Array(states.to_vec()).to_string()
}

/// Settings for a hub listening on `host:port`, as mock servers report it.
pub fn settings_for(host_with_port: &str, extra: &[(&str, &str)]) -> HubSettings {
    let (host, port) = host_with_port
        .rsplit_once(':')
        .unwrap_or((host_with_port, ""));
    let mut map: HashMap<String, String> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    map.insert("host".to_string(), host.to_string());
    map.insert("portnum".to_string(), port.to_string());
    map.entry("password".to_string())
        .or_insert_with(|| "secret".to_string());
    HubSettings::from_map(&map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_split_host_and_port() {
        let settings = settings_for("127.0.0.1:40123", &[("lang", "de")]);
        assert_eq!(settings.base_url().unwrap(), "http://127.0.0.1:40123");
        assert_eq!(settings.token(), Some("secret"));
        assert_eq!(settings.language(), "de");
    }
}
