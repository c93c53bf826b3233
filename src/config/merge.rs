//! Field-by-field merging of configuration tiers.

use serde_json::Value;

/// Merge `overlay` onto `base`.
///
/// Objects merge key by key, recursively. Any other overlay value replaces the
/// base value, except `null`, which leaves the base untouched.
///
/// ```
/// use serde_json::json;
/// use todo_list::config::deep_merge;
///
/// let defaults = json!({ "server": { "host": "127.0.0.1", "port": 3000 } });
/// let project = json!({ "server": { "port": 8080 } });
///
/// assert_eq!(
///     deep_merge(defaults, project),
///     json!({ "server": { "host": "127.0.0.1", "port": 8080 } })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold [`deep_merge`] over tiers given lowest priority first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_sections_merge() {
        let base = json!({
            "server": {"host": "127.0.0.1", "port": 3000},
            "client": {"notification_ms": 3000}
        });
        let overlay = json!({"server": {"port": 9000}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({
                "server": {"host": "127.0.0.1", "port": 9000},
                "client": {"notification_ms": 3000}
            })
        );
    }

    #[test]
    fn test_null_preserves_base() {
        let base = json!({"server": {"port": 3000}});
        let overlay = json!({"server": {"port": null}});
        assert_eq!(deep_merge(base, overlay), json!({"server": {"port": 3000}}));
    }

    #[test]
    fn test_scalar_replaces_section() {
        let base = json!({"client": {"base_url": "http://a"}});
        let overlay = json!({"client": "oops"});
        assert_eq!(deep_merge(base, overlay), json!({"client": "oops"}));
    }

    #[test]
    fn test_merge_all_later_tiers_win() {
        let tiers = vec![
            json!({"server": {"port": 1}}),
            json!({"server": {"host": "0.0.0.0"}}),
            json!({"server": {"port": 3}}),
        ];
        assert_eq!(
            deep_merge_all(tiers),
            json!({"server": {"host": "0.0.0.0", "port": 3}})
        );
    }
}
