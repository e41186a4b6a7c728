//! Per-plugin configuration mapping.
//!
//! The host hands each plugin an arbitrary key/value object.  The core never
//! inspects its shape; it only copies it so a factory can never observe or
//! mutate the host's original.

use serde_json::{Map, Value};

/// Untyped plugin configuration as supplied by the host.
pub type ConfigMap = Map<String, Value>;

/// Converts a raw configuration value into a [`ConfigMap`].
///
/// Objects are taken as-is and `null` becomes an empty map.  Any other value
/// is not a configuration mapping and yields `None`.
pub fn config_map_from_value(value: &Value) -> Option<ConfigMap> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::Null => Some(ConfigMap::new()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_is_copied() {
        let value = json!({ "volume": 0.5, "labels": ["a", "b"] });
        let map = config_map_from_value(&value).unwrap();
        assert_eq!(map.get("volume"), Some(&json!(0.5)));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_null_is_empty() {
        assert_eq!(config_map_from_value(&Value::Null), Some(ConfigMap::new()));
    }

    #[test]
    fn test_scalar_is_rejected() {
        assert!(config_map_from_value(&json!(42)).is_none());
        assert!(config_map_from_value(&json!("on")).is_none());
        assert!(config_map_from_value(&json!([1, 2])).is_none());
    }
}
