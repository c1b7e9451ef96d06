//! Diff-record data model: change type → path → payload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// All changes of one kind, keyed by path.
pub type Changes = IndexMap<String, Value>;

#[derive(Debug, Error, PartialEq)]
#[error("UNSUPPORTED_CHANGE_TYPE: {0}")]
pub struct UnsupportedChangeType(pub String);

// ── Change kinds ──────────────────────────────────────────────────────────

/// The change types this engine produces and knows how to replay.
///
/// Records are open on the wire (any string can appear as a change-type key);
/// the engine is closed over these five kinds, and anything else fails with
/// [`UnsupportedChangeType`] instead of being silently passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    ValuesChanged,
    IterableItemAdded,
    IterableItemRemoved,
    DictionaryItemAdded,
    DictionaryItemRemoved,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::ValuesChanged => "values_changed",
            ChangeKind::IterableItemAdded => "iterable_item_added",
            ChangeKind::IterableItemRemoved => "iterable_item_removed",
            ChangeKind::DictionaryItemAdded => "dictionary_item_added",
            ChangeKind::DictionaryItemRemoved => "dictionary_item_removed",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, UnsupportedChangeType> {
        match s {
            "values_changed" => Ok(ChangeKind::ValuesChanged),
            "iterable_item_added" => Ok(ChangeKind::IterableItemAdded),
            "iterable_item_removed" => Ok(ChangeKind::IterableItemRemoved),
            "dictionary_item_added" => Ok(ChangeKind::DictionaryItemAdded),
            "dictionary_item_removed" => Ok(ChangeKind::DictionaryItemRemoved),
            other => Err(UnsupportedChangeType(other.to_string())),
        }
    }
}

// ── Record ────────────────────────────────────────────────────────────────

/// A grouped set of changes between two tree values.
///
/// Serializes transparently to the plain JSON shape
/// `{change_type: {path: payload}}`. `values_changed` payloads are objects
/// carrying `old_value` and `new_value` (plus any passthrough metadata);
/// item-level kinds carry the added/removed value itself. Within one record
/// each (change type, path) pair appears at most once, and every transform
/// over records returns a new record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffRecord {
    entries: IndexMap<String, Changes>,
}

impl DiffRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the record describes no changes.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(|changes| changes.is_empty())
    }

    /// Total number of (change type, path) entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(|changes| changes.len()).sum()
    }

    /// Store `payload` under (`kind`, `path`), replacing any previous entry.
    pub fn insert(&mut self, kind: ChangeKind, path: impl Into<String>, payload: Value) {
        self.insert_raw(kind.as_str(), path, payload);
    }

    /// Like [`insert`](Self::insert) but with an arbitrary change-type name,
    /// for records that originate outside this engine.
    pub fn insert_raw(&mut self, kind: impl Into<String>, path: impl Into<String>, payload: Value) {
        self.entries
            .entry(kind.into())
            .or_default()
            .insert(path.into(), payload);
    }

    /// The changes of one kind, if any were recorded.
    pub fn get(&self, kind: ChangeKind) -> Option<&Changes> {
        self.entries.get(kind.as_str())
    }

    /// Iterate over (change-type name, changes) groups in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Changes> {
        self.entries.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_name_round_trip() {
        for kind in [
            ChangeKind::ValuesChanged,
            ChangeKind::IterableItemAdded,
            ChangeKind::IterableItemRemoved,
            ChangeKind::DictionaryItemAdded,
            ChangeKind::DictionaryItemRemoved,
        ] {
            assert_eq!(ChangeKind::from_str(kind.as_str()), Ok(kind));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = ChangeKind::from_str("type_changes").unwrap_err();
        assert_eq!(err, UnsupportedChangeType("type_changes".to_string()));
    }

    #[test]
    fn insert_and_get() {
        let mut rec = DiffRecord::new();
        assert!(rec.is_empty());
        rec.insert(ChangeKind::IterableItemAdded, "root[2]", json!(3));
        assert_eq!(rec.len(), 1);
        let changes = rec.get(ChangeKind::IterableItemAdded).unwrap();
        assert_eq!(changes.get("root[2]"), Some(&json!(3)));
        assert!(rec.get(ChangeKind::ValuesChanged).is_none());
    }

    #[test]
    fn insert_replaces_existing_path() {
        let mut rec = DiffRecord::new();
        rec.insert(ChangeKind::IterableItemAdded, "root[0]", json!(1));
        rec.insert(ChangeKind::IterableItemAdded, "root[0]", json!(2));
        assert_eq!(rec.len(), 1);
        let changes = rec.get(ChangeKind::IterableItemAdded).unwrap();
        assert_eq!(changes.get("root[0]"), Some(&json!(2)));
    }

    #[test]
    fn serde_wire_shape() {
        let mut rec = DiffRecord::new();
        rec.insert(
            ChangeKind::ValuesChanged,
            "root[1]",
            json!({"new_value": 3, "old_value": 2}),
        );
        rec.insert(ChangeKind::IterableItemRemoved, "root[2]", json!(3));
        let wire = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            wire,
            json!({
                "values_changed": {"root[1]": {"new_value": 3, "old_value": 2}},
                "iterable_item_removed": {"root[2]": 3},
            })
        );
        let back: DiffRecord = serde_json::from_value(wire).unwrap();
        assert_eq!(back, rec);
    }
}
