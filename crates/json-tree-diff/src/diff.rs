//! Structural diff: compare two concrete values and produce a [`DiffRecord`].

use serde_json::{Map, Value};

use crate::path::{format_path, Path, PathStep};
use crate::record::{ChangeKind, DiffRecord};

/// Compare `src` and `dst` and return the record that transforms `src` into
/// `dst`.
///
/// Objects are compared by key: keys only in `src` become
/// `dictionary_item_removed`, keys only in `dst` become
/// `dictionary_item_added`, shared keys recurse. Arrays are compared
/// positionally: the common prefix recurses pairwise, a longer destination
/// tail becomes `iterable_item_added`, a longer source tail
/// `iterable_item_removed`. Everything else — scalar changes and
/// container-kind changes alike — becomes `values_changed` with full
/// `old_value`/`new_value` payloads, so the record never leaves the five
/// kinds the delta and reversal engines accept.
pub fn diff(src: &Value, dst: &Value) -> DiffRecord {
    let mut rec = DiffRecord::new();
    let mut path = Path::new();
    diff_at(&mut rec, &mut path, src, dst);
    rec
}

// ── Core recursive differ ─────────────────────────────────────────────────

fn diff_at(rec: &mut DiffRecord, path: &mut Path, src: &Value, dst: &Value) {
    if src == dst {
        return;
    }
    match (src, dst) {
        (Value::Object(s), Value::Object(d)) => diff_obj(rec, path, s, d),
        (Value::Array(s), Value::Array(d)) => diff_arr(rec, path, s, d),
        _ => {
            let mut payload = Map::new();
            payload.insert("new_value".to_string(), dst.clone());
            payload.insert("old_value".to_string(), src.clone());
            rec.insert(
                ChangeKind::ValuesChanged,
                format_path(path),
                Value::Object(payload),
            );
        }
    }
}

fn diff_obj(
    rec: &mut DiffRecord,
    path: &mut Path,
    src: &Map<String, Value>,
    dst: &Map<String, Value>,
) {
    for (key, old) in src {
        if !dst.contains_key(key) {
            path.push(PathStep::Key(key.clone()));
            rec.insert(
                ChangeKind::DictionaryItemRemoved,
                format_path(path),
                old.clone(),
            );
            path.pop();
        }
    }
    for (key, new) in dst {
        path.push(PathStep::Key(key.clone()));
        match src.get(key) {
            None => rec.insert(
                ChangeKind::DictionaryItemAdded,
                format_path(path),
                new.clone(),
            ),
            Some(old) => diff_at(rec, path, old, new),
        }
        path.pop();
    }
}

fn diff_arr(rec: &mut DiffRecord, path: &mut Path, src: &[Value], dst: &[Value]) {
    let common = src.len().min(dst.len());
    for i in 0..common {
        path.push(PathStep::Index(i));
        diff_at(rec, path, &src[i], &dst[i]);
        path.pop();
    }
    for (i, added) in dst.iter().enumerate().skip(common) {
        path.push(PathStep::Index(i));
        rec.insert(
            ChangeKind::IterableItemAdded,
            format_path(path),
            added.clone(),
        );
        path.pop();
    }
    for (i, removed) in src.iter().enumerate().skip(common) {
        path.push(PathStep::Index(i));
        rec.insert(
            ChangeKind::IterableItemRemoved,
            format_path(path),
            removed.clone(),
        );
        path.pop();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
