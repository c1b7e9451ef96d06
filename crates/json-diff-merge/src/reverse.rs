//! Diff reversal: produce the record that exactly undoes another.

use serde_json::Value;
use thiserror::Error;

use json_tree_diff::{ChangeKind, DiffRecord, UnsupportedChangeType};

use crate::swap::{swap_keys, SwapError};

#[derive(Debug, Error, PartialEq)]
pub enum ReverseError {
    #[error(transparent)]
    Swap(#[from] SwapError),
    #[error(transparent)]
    UnsupportedChangeType(#[from] UnsupportedChangeType),
    /// The payload of a kind with a field-swap rule was not an object.
    #[error("INVALID_PAYLOAD at {0}: expected an object")]
    InvalidPayload(String),
}

// ── Rule table ────────────────────────────────────────────────────────────

/// How one change kind inverts: which payload fields to exchange, and what
/// the kind renames to.
struct ReverseRule {
    swap_keys: &'static [(&'static str, &'static str)],
    rename: Option<ChangeKind>,
}

fn reverse_rule(kind: ChangeKind) -> ReverseRule {
    match kind {
        ChangeKind::ValuesChanged => ReverseRule {
            swap_keys: &[("new_value", "old_value")],
            rename: None,
        },
        ChangeKind::IterableItemRemoved => ReverseRule {
            swap_keys: &[],
            rename: Some(ChangeKind::IterableItemAdded),
        },
        ChangeKind::IterableItemAdded => ReverseRule {
            swap_keys: &[],
            rename: Some(ChangeKind::IterableItemRemoved),
        },
        ChangeKind::DictionaryItemAdded => ReverseRule {
            swap_keys: &[],
            rename: Some(ChangeKind::DictionaryItemRemoved),
        },
        ChangeKind::DictionaryItemRemoved => ReverseRule {
            swap_keys: &[],
            rename: Some(ChangeKind::DictionaryItemAdded),
        },
    }
}

// ── Reversal ──────────────────────────────────────────────────────────────

/// Produce the record that undoes `record`.
///
/// Paths are never rewritten, only payload fields are swapped and kinds
/// renamed, so reversing twice is the identity. A change type without a
/// reversal rule fails with [`UnsupportedChangeType`] — an un-inverted
/// change would silently corrupt any merge built on top of it.
pub fn reverse_diff(record: &DiffRecord) -> Result<DiffRecord, ReverseError> {
    let mut out = DiffRecord::new();
    for (kind_name, changes) in record.iter() {
        let kind = ChangeKind::from_str(kind_name)?;
        let rule = reverse_rule(kind);
        let out_kind = rule.rename.unwrap_or(kind);
        for (path, payload) in changes {
            let payload = if rule.swap_keys.is_empty() {
                payload.clone()
            } else {
                let fields = payload
                    .as_object()
                    .ok_or_else(|| ReverseError::InvalidPayload(path.clone()))?;
                Value::Object(swap_keys(fields, rule.swap_keys)?)
            };
            out.insert(out_kind, path.clone(), payload);
        }
    }
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(wire: Value) -> DiffRecord {
        serde_json::from_value(wire).unwrap()
    }

    #[test]
    fn reverses_values_and_renames_item_kinds() {
        let plain = record(json!({
            "values_changed": {"root[1]": {"new_value": 3, "old_value": 2}},
            "iterable_item_removed": {"root[2]": 3},
        }));
        let expected = record(json!({
            "values_changed": {"root[1]": {"new_value": 2, "old_value": 3}},
            "iterable_item_added": {"root[2]": 3},
        }));
        assert_eq!(reverse_diff(&plain).unwrap(), expected);
    }

    #[test]
    fn reverses_dictionary_kinds() {
        let plain = record(json!({
            "dictionary_item_added": {"root['y']": 3},
            "dictionary_item_removed": {"root['x']": 1},
        }));
        let reversed = reverse_diff(&plain).unwrap();
        assert_eq!(
            reversed,
            record(json!({
                "dictionary_item_removed": {"root['y']": 3},
                "dictionary_item_added": {"root['x']": 1},
            }))
        );
    }

    #[test]
    fn reversing_twice_is_identity() {
        let plain = record(json!({
            "values_changed": {
                "root['a']": {"new_value": [1, 2], "old_value": {"b": 3}},
                "root[0]": {"new_value": "x", "old_value": "y"},
            },
            "iterable_item_added": {"root[5]": {"deep": true}},
            "dictionary_item_removed": {"root['gone']": null},
        }));
        let twice = reverse_diff(&reverse_diff(&plain).unwrap()).unwrap();
        assert_eq!(twice, plain);
    }

    #[test]
    fn passthrough_metadata_survives() {
        let plain = record(json!({
            "values_changed": {"root": {"new_value": 2, "old_value": 1, "diff": "@@ -1 +1 @@"}},
        }));
        let reversed = reverse_diff(&plain).unwrap();
        assert_eq!(
            reversed,
            record(json!({
                "values_changed": {"root": {"new_value": 1, "old_value": 2, "diff": "@@ -1 +1 @@"}},
            }))
        );
    }

    #[test]
    fn unknown_change_type_is_rejected() {
        let plain = record(json!({"type_changes": {"root": {"old_type": "int"}}}));
        let err = reverse_diff(&plain).unwrap_err();
        assert_eq!(
            err,
            ReverseError::UnsupportedChangeType(UnsupportedChangeType("type_changes".to_string()))
        );
    }

    #[test]
    fn swap_requires_both_fields() {
        let plain = record(json!({"values_changed": {"root": {"new_value": 2}}}));
        let err = reverse_diff(&plain).unwrap_err();
        assert_eq!(err, ReverseError::Swap(SwapError::MissingField("old_value".to_string())));
    }

    #[test]
    fn swap_requires_object_payload() {
        let plain = record(json!({"values_changed": {"root": 7}}));
        let err = reverse_diff(&plain).unwrap_err();
        assert_eq!(err, ReverseError::InvalidPayload("root".to_string()));
    }
}
