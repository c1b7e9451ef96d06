//! Field-swap transform for flat payload mappings.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SwapError {
    #[error("MISSING_FIELD: {0}")]
    MissingField(String),
}

/// Return a copy of `map` with each pair's values exchanged.
///
/// Pairs are applied in order; both fields of a pair must be present in the
/// input. All other entries pass through unchanged, and the input itself is
/// never mutated.
pub fn swap_keys(
    map: &Map<String, Value>,
    pairs: &[(&str, &str)],
) -> Result<Map<String, Value>, SwapError> {
    let mut out = map.clone();
    for (a, b) in pairs {
        let value_a = out
            .get(*a)
            .cloned()
            .ok_or_else(|| SwapError::MissingField((*a).to_string()))?;
        let value_b = out
            .get(*b)
            .cloned()
            .ok_or_else(|| SwapError::MissingField((*b).to_string()))?;
        out.insert((*a).to_string(), value_b);
        out.insert((*b).to_string(), value_a);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn swaps_a_pair() {
        let old = obj(json!({"x": 1, "y": 2}));
        let new = swap_keys(&old, &[("x", "y")]).unwrap();
        assert_eq!(Value::Object(new), json!({"x": 2, "y": 1}));
    }

    #[test]
    fn double_swap_restores_original() {
        let old = obj(json!({"x": 1, "y": 2, "z": [3]}));
        let once = swap_keys(&old, &[("x", "y")]).unwrap();
        let twice = swap_keys(&once, &[("x", "y")]).unwrap();
        assert_eq!(twice, old);
    }

    #[test]
    fn other_entries_pass_through() {
        let old = obj(json!({"new_value": 3, "old_value": 2, "note": "kept"}));
        let new = swap_keys(&old, &[("new_value", "old_value")]).unwrap();
        assert_eq!(
            Value::Object(new),
            json!({"new_value": 2, "old_value": 3, "note": "kept"})
        );
    }

    #[test]
    fn missing_field_fails() {
        let old = obj(json!({"x": 1}));
        let err = swap_keys(&old, &[("x", "y")]).unwrap_err();
        assert_eq!(err, SwapError::MissingField("y".to_string()));
    }

    #[test]
    fn input_is_untouched() {
        let old = obj(json!({"x": 1, "y": 2}));
        let _ = swap_keys(&old, &[("x", "y")]).unwrap();
        assert_eq!(Value::Object(old), json!({"x": 1, "y": 2}));
    }
}
