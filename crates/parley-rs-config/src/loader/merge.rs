//! Deep merge for layered JSON values.

use serde_json::Value;

/// Merge `overlay` into `base`. Objects merge key by key; anything else
/// (arrays, scalars, null) replaces the base value outright.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::merge_json_values;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nested_objects_merge_and_null_overrides() {
        let mut base = json!({ "ai": { "model": "a", "max_tokens": 10 }, "memory": { "max_records": 5 } });
        let overlay = json!({ "ai": { "model": "b" }, "memory": { "max_records": null } });
        merge_json_values(&mut base, &overlay);
        assert_eq!(
            base,
            json!({ "ai": { "model": "b", "max_tokens": 10 }, "memory": { "max_records": null } })
        );
    }
}
