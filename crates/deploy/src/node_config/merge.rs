//! Structural merge of configuration trees.

use serde_json::{Map, Value};

/// Merge `source` into `target`, right-biased.
///
/// Objects are merged key by key, recursively. Any other value in `source`
/// (scalars, arrays, null) replaces the value held by `target` at that key.
/// Keys only present in `target` are left untouched.
pub fn deep_merge(target: &mut Value, source: &Value) {
    let Value::Object(source) = source else {
        *target = source.clone();
        return;
    };

    if !target.is_object() {
        *target = Value::Object(Map::new());
    }

    let Value::Object(target) = target else {
        return;
    };

    for (key, value) in source {
        if value.is_object() {
            let entry = target
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            deep_merge(entry, value);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// By-value variant of [`deep_merge`].
pub fn merged(mut target: Value, source: &Value) -> Value {
    deep_merge(&mut target, source);
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_with_empty_source_is_identity() {
        let target = json!({
            "node": { "sequencer": true, "staker": { "enable": true } },
            "http": { "port": 8449 }
        });

        assert_eq!(merged(target.clone(), &json!({})), target);
    }

    #[test]
    fn test_merge_source_wins_on_scalar_conflict() {
        let result = merged(
            json!({ "port": 8449, "addr": "0.0.0.0" }),
            &json!({ "port": 8547 }),
        );

        assert_eq!(result["port"], json!(8547));
        assert_eq!(result["addr"], json!("0.0.0.0"));
    }

    #[test]
    fn test_merge_recurses_into_nested_objects() {
        let result = merged(json!({ "a": { "x": 1 } }), &json!({ "a": { "y": 2 } }));
        assert_eq!(result, json!({ "a": { "x": 1, "y": 2 } }));
    }

    #[test]
    fn test_merge_replaces_arrays() {
        let result = merged(json!({ "a": [1, 2] }), &json!({ "a": [3] }));
        assert_eq!(result, json!({ "a": [3] }));
    }

    #[test]
    fn test_merge_creates_missing_subtrees() {
        let result = merged(
            json!({ "node": {} }),
            &json!({ "node": { "bold": { "strategy": "MakeNodes" } } }),
        );
        assert_eq!(result, json!({ "node": { "bold": { "strategy": "MakeNodes" } } }));
    }

    #[test]
    fn test_merge_object_over_scalar() {
        let result = merged(
            json!({ "node": { "sequencer": true } }),
            &json!({ "node": { "sequencer": { "enable": false } } }),
        );
        assert_eq!(result, json!({ "node": { "sequencer": { "enable": false } } }));
    }

    #[test]
    fn test_merge_null_and_false_overwrite() {
        let result = merged(
            json!({ "a": { "b": 1 }, "c": true }),
            &json!({ "a": null, "c": false }),
        );
        assert_eq!(result, json!({ "a": null, "c": false }));
    }

    #[test]
    fn test_merge_preserves_target_key_order() {
        let result = merged(
            json!({ "chain": 1, "node": 2, "http": 3 }),
            &json!({ "node": 4, "execution": 5 }),
        );
        let keys: Vec<&str> = result
            .as_object()
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["chain", "node", "http", "execution"]);
    }

    #[test]
    fn test_merge_does_not_mutate_source() {
        let source = json!({ "a": { "b": [1] } });
        let snapshot = source.clone();
        let _ = merged(json!({ "a": { "c": 2 } }), &source);
        assert_eq!(source, snapshot);
    }
}
