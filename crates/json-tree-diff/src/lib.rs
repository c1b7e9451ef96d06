//! Structural diff and delta application for JSON-like trees.
//!
//! Compares two `serde_json` values and produces a [`DiffRecord`]: changes
//! grouped by change type (`values_changed`, `iterable_item_added`, ...) and
//! keyed by path strings such as `root['options'][0]`. Records can then be
//! replayed onto any type implementing [`DeltaTarget`]; an implementation for
//! plain `serde_json::Value` documents lives here.

pub mod delta;
pub mod diff;
pub mod path;
pub mod record;

pub use delta::{apply_delta, apply_value_op, DeltaError, DeltaTarget, PathOp};
pub use diff::diff;
pub use path::{format_path, parse_path, InvalidPath, Path, PathStep};
pub use record::{ChangeKind, Changes, DiffRecord, UnsupportedChangeType};
