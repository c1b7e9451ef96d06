//! Delta application: replay a [`DiffRecord`] onto a tree.

use serde_json::Value;
use thiserror::Error;

use crate::path::{format_path, parse_path, InvalidPath, Path, PathStep};
use crate::record::{ChangeKind, Changes, DiffRecord, UnsupportedChangeType};

#[derive(Debug, Error, PartialEq)]
pub enum DeltaError {
    #[error(transparent)]
    InvalidPath(#[from] InvalidPath),
    #[error("NOT_FOUND: {0}")]
    PathNotFound(String),
    #[error("INVALID_INDEX: {0}")]
    InvalidIndex(String),
    #[error("INVALID_TARGET: {0}")]
    InvalidTarget(String),
    #[error("MALFORMED_PAYLOAD at {0}: expected an object with `new_value`")]
    MalformedPayload(String),
    #[error(transparent)]
    UnsupportedChangeType(#[from] UnsupportedChangeType),
}

/// A single location edit produced while replaying a record.
#[derive(Debug, Clone)]
pub enum PathOp {
    /// Store a value at the path, overwriting whatever is there.
    Set(Value),
    /// Insert a value at a sequence position, shifting later items up.
    Insert(Value),
    /// Remove the value at the path.
    Remove,
}

/// A tree that diff records can be replayed onto.
///
/// Implemented for `serde_json::Value` here; the shadow tree in the merge
/// crate implements it for partially-known trees.
pub trait DeltaTarget {
    fn apply_path(&mut self, path: &[PathStep], op: PathOp) -> Result<(), DeltaError>;
}

// ── Record replay ─────────────────────────────────────────────────────────

/// Replay `record` onto `target` as a forward transformation.
///
/// Change groups run in a fixed order regardless of record layout:
/// dictionary removals, dictionary additions, value changes, then iterable
/// removals in descending path order and iterable additions in ascending
/// order, so sibling index shifts never invalidate a later path. A record
/// containing an unknown change type is rejected before anything is applied.
pub fn apply_delta<T: DeltaTarget>(target: &mut T, record: &DiffRecord) -> Result<(), DeltaError> {
    for (kind, _) in record.iter() {
        ChangeKind::from_str(kind)?;
    }
    if let Some(changes) = record.get(ChangeKind::DictionaryItemRemoved) {
        for path in changes.keys() {
            target.apply_path(&parse_path(path)?, PathOp::Remove)?;
        }
    }
    if let Some(changes) = record.get(ChangeKind::DictionaryItemAdded) {
        for (path, payload) in changes {
            target.apply_path(&parse_path(path)?, PathOp::Set(payload.clone()))?;
        }
    }
    if let Some(changes) = record.get(ChangeKind::ValuesChanged) {
        for (path, payload) in changes {
            let new_value = payload
                .get("new_value")
                .ok_or_else(|| DeltaError::MalformedPayload(path.clone()))?;
            target.apply_path(&parse_path(path)?, PathOp::Set(new_value.clone()))?;
        }
    }
    if let Some(changes) = record.get(ChangeKind::IterableItemRemoved) {
        for path in sorted_paths(changes)?.iter().rev() {
            target.apply_path(path, PathOp::Remove)?;
        }
    }
    if let Some(changes) = record.get(ChangeKind::IterableItemAdded) {
        let mut items: Vec<(Path, &Value)> = changes
            .iter()
            .map(|(path, payload)| Ok((parse_path(path)?, payload)))
            .collect::<Result<_, InvalidPath>>()?;
        items.sort_by(|a, b| a.0.cmp(&b.0));
        for (path, payload) in items {
            target.apply_path(&path, PathOp::Insert(payload.clone()))?;
        }
    }
    Ok(())
}

fn sorted_paths(changes: &Changes) -> Result<Vec<Path>, InvalidPath> {
    let mut paths: Vec<Path> = changes
        .keys()
        .map(|path| parse_path(path))
        .collect::<Result<_, _>>()?;
    paths.sort();
    Ok(paths)
}

// ── Concrete-value application ────────────────────────────────────────────

/// Apply one edit inside a concrete value.
///
/// Building block for [`DeltaTarget`] implementations that store plain
/// `serde_json` subtrees: navigation to a missing location fails with
/// `PathNotFound` rather than creating anything.
pub fn apply_value_op(doc: &mut Value, path: &[PathStep], op: PathOp) -> Result<(), DeltaError> {
    if path.is_empty() {
        return match op {
            PathOp::Set(value) => {
                *doc = value;
                Ok(())
            }
            _ => Err(DeltaError::InvalidTarget("root".to_string())),
        };
    }
    let (parent_path, last) = path.split_at(path.len() - 1);
    let parent = navigate(doc, parent_path, path)?;
    let last = &last[0];
    match op {
        PathOp::Set(value) => match (parent, last) {
            (Value::Object(map), PathStep::Key(key)) => {
                map.insert(key.clone(), value);
                Ok(())
            }
            (Value::Array(arr), PathStep::Index(i)) => {
                if *i < arr.len() {
                    arr[*i] = value;
                    Ok(())
                } else if *i == arr.len() {
                    arr.push(value);
                    Ok(())
                } else {
                    Err(DeltaError::InvalidIndex(format_path(path)))
                }
            }
            _ => Err(DeltaError::InvalidTarget(format_path(path))),
        },
        PathOp::Insert(value) => match (parent, last) {
            (Value::Array(arr), PathStep::Index(i)) => {
                if *i > arr.len() {
                    return Err(DeltaError::InvalidIndex(format_path(path)));
                }
                arr.insert(*i, value);
                Ok(())
            }
            _ => Err(DeltaError::InvalidTarget(format_path(path))),
        },
        PathOp::Remove => match (parent, last) {
            (Value::Object(map), PathStep::Key(key)) => match map.remove(key) {
                Some(_) => Ok(()),
                None => Err(DeltaError::PathNotFound(format_path(path))),
            },
            (Value::Array(arr), PathStep::Index(i)) => {
                if *i >= arr.len() {
                    return Err(DeltaError::PathNotFound(format_path(path)));
                }
                arr.remove(*i);
                Ok(())
            }
            _ => Err(DeltaError::InvalidTarget(format_path(path))),
        },
    }
}

fn navigate<'a>(
    doc: &'a mut Value,
    steps: &[PathStep],
    full: &[PathStep],
) -> Result<&'a mut Value, DeltaError> {
    let mut cur = doc;
    for step in steps {
        cur = match (cur, step) {
            (Value::Object(map), PathStep::Key(key)) => map
                .get_mut(key)
                .ok_or_else(|| DeltaError::PathNotFound(format_path(full)))?,
            (Value::Array(arr), PathStep::Index(i)) => arr
                .get_mut(*i)
                .ok_or_else(|| DeltaError::PathNotFound(format_path(full)))?,
            _ => return Err(DeltaError::InvalidTarget(format_path(full))),
        };
    }
    Ok(cur)
}

impl DeltaTarget for Value {
    fn apply_path(&mut self, path: &[PathStep], op: PathOp) -> Result<(), DeltaError> {
        apply_value_op(self, path, op)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
