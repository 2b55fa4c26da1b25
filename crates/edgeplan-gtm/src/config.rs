//! Decoding of resource configuration attributes

use crate::error::{GtmError, Result};
use edgeplan_cloud::{ResourceState, split_import_id};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a configuration object; null attributes count as absent
pub(crate) fn decode<T: DeserializeOwned>(kind: &'static str, config: &Value) -> Result<T> {
    serde_json::from_value(without_nulls(config)).map_err(|e| GtmError::InvalidConfig {
        kind,
        message: e.to_string(),
    })
}

fn without_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), without_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(without_nulls).collect()),
        other => other.clone(),
    }
}

pub(crate) fn default_true() -> bool {
    true
}

/// `(domain, name)` from a `domain:name` identifier
pub(crate) fn domain_and_name(id: &str) -> Result<(String, String)> {
    match split_import_id(id, 2).as_deref() {
        Some([domain, name]) => Ok((domain.to_string(), name.to_string())),
        _ => Err(GtmError::InvalidImportId(id.to_string())),
    }
}

pub(crate) fn state_id(domain: &str, name: &str) -> String {
    format!("{}:{}", domain, name)
}

/// `wait_on_complete` recorded in `state`, true when never recorded
pub(crate) fn recorded_wait_on_complete(state: &ResourceState) -> bool {
    state.get_attribute("wait_on_complete").unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Example {
        name: String,
        #[serde(default)]
        tags: Vec<String>,
        #[serde(default = "default_true")]
        wait: bool,
    }

    #[test]
    fn test_nulls_take_defaults() {
        let example: Example =
            decode("example", &json!({"name": "n", "tags": null, "wait": null})).unwrap();
        assert_eq!(example.name, "n");
        assert!(example.tags.is_empty());
        assert!(example.wait);
    }

    #[test]
    fn test_decode_error_names_kind() {
        let err = decode::<Example>("example", &json!({"tags": []})).err().unwrap();
        assert!(err.to_string().starts_with("invalid example configuration"));
    }

    #[test]
    fn test_domain_and_name() {
        assert_eq!(
            domain_and_name("example.akadns.net:map").unwrap(),
            ("example.akadns.net".to_string(), "map".to_string())
        );
        assert_eq!(
            domain_and_name(":map").unwrap_err().to_string(),
            "invalid resource ID: :map"
        );
        assert!(domain_and_name("example.akadns.net:").is_err());
    }
}
