//! Shadow tree: a lazily-built placeholder tree that deltas can be applied
//! to without the original concrete data.
//!
//! Every location is a [`ShadowNode`] whose children are created on demand.
//! A node remembers which indexing discipline has been used against it
//! (integer keys make it list-typed, anything else dict-typed) and fills
//! sequence holes with fresh placeholder nodes, so a flattened tree behaves
//! like real JSON data under insertion, deletion and index renumbering even
//! when most of it was never explicitly set. Each auto-created leaf flattens
//! to a name derived from a per-tree identity counter, so two distinct unset
//! leaves never compare equal.

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use json_tree_diff::{apply_value_op, DeltaError, DeltaTarget, PathOp, PathStep};

#[derive(Debug, Error, PartialEq)]
pub enum ShadowError {
    /// Both integer and non-integer keys were used against the same node.
    #[error("MIXED_INDEXING: node {identity} was indexed as both a sequence and a mapping")]
    MixedIndexing { identity: u64 },
}

// ── Keys and children ─────────────────────────────────────────────────────

/// A child key: a sequence position or a mapping key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShadowKey {
    Index(usize),
    Name(String),
}

impl From<usize> for ShadowKey {
    fn from(index: usize) -> Self {
        ShadowKey::Index(index)
    }
}

impl From<&str> for ShadowKey {
    fn from(name: &str) -> Self {
        ShadowKey::Name(name.to_string())
    }
}

impl From<String> for ShadowKey {
    fn from(name: String) -> Self {
        ShadowKey::Name(name)
    }
}

impl From<&PathStep> for ShadowKey {
    fn from(step: &PathStep) -> Self {
        match step {
            PathStep::Index(i) => ShadowKey::Index(*i),
            PathStep::Key(k) => ShadowKey::Name(k.clone()),
        }
    }
}

/// A child slot: an owned placeholder node or a concrete value.
#[derive(Debug, Clone, PartialEq)]
pub enum ShadowChild {
    Node(ShadowNode),
    Value(Value),
}

impl From<Value> for ShadowChild {
    fn from(value: Value) -> Self {
        ShadowChild::Value(value)
    }
}

impl From<ShadowNode> for ShadowChild {
    fn from(node: ShadowNode) -> Self {
        ShadowChild::Node(node)
    }
}

// ── Nodes ─────────────────────────────────────────────────────────────────

/// One location in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowNode {
    items: IndexMap<ShadowKey, ShadowChild>,
    is_list: bool,
    is_dict: bool,
    identity: u64,
}

impl ShadowNode {
    fn new(counter: &mut u64) -> Self {
        *counter += 1;
        ShadowNode {
            items: IndexMap::new(),
            is_list: false,
            is_dict: false,
            identity: *counter,
        }
    }

    /// The identity assigned at construction; never changes.
    pub fn identity(&self) -> u64 {
        self.identity
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    pub fn is_dict(&self) -> bool {
        self.is_dict
    }

    /// Mark the indexing discipline `key` implies and, for integer keys,
    /// fill every missing position below it with a fresh placeholder node,
    /// so a sequence has no holes below any index that has been touched.
    fn apply_list_fix(&mut self, key: &ShadowKey, counter: &mut u64) {
        match key {
            ShadowKey::Index(index) => {
                self.is_list = true;
                for position in 0..*index {
                    let slot = ShadowKey::Index(position);
                    if !self.items.contains_key(&slot) {
                        let filler = ShadowNode::new(counter);
                        self.items.insert(slot, ShadowChild::Node(filler));
                    }
                }
            }
            ShadowKey::Name(_) => self.is_dict = true,
        }
    }

    /// Read the child at `key`, creating an empty node if absent.
    fn read(&mut self, key: ShadowKey, counter: &mut u64) -> &mut ShadowChild {
        self.apply_list_fix(&key, counter);
        self.items
            .entry(key)
            .or_insert_with(|| ShadowChild::Node(ShadowNode::new(counter)))
    }

    /// Store `value` at `key`, overwriting any previous entry.
    fn write(&mut self, key: ShadowKey, value: ShadowChild, counter: &mut u64) {
        self.apply_list_fix(&key, counter);
        self.items.insert(key, value);
    }

    /// Insert at a sequence position, shifting integer keys at or above it
    /// up by one. Non-integer keys store like `write`.
    fn insert(&mut self, key: ShadowKey, value: ShadowChild, counter: &mut u64) {
        if let ShadowKey::Index(at) = key {
            self.apply_list_fix(&key, counter);
            let items = std::mem::take(&mut self.items);
            self.items = items
                .into_iter()
                .map(|(k, v)| match k {
                    ShadowKey::Index(i) if i >= at => (ShadowKey::Index(i + 1), v),
                    other => (other, v),
                })
                .collect();
            self.items.insert(key, value);
        } else {
            self.write(key, value, counter);
        }
    }

    /// Remove `key` if present; deleting an absent key is a no-op. Removing
    /// an integer key renumbers every greater integer key down by one, so
    /// surviving positions stay contiguous.
    fn delete(&mut self, key: &ShadowKey) {
        if self.items.shift_remove(key).is_none() {
            return;
        }
        if let ShadowKey::Index(at) = key {
            let at = *at;
            let items = std::mem::take(&mut self.items);
            self.items = items
                .into_iter()
                .map(|(k, v)| match k {
                    ShadowKey::Index(i) if i > at => (ShadowKey::Index(i - 1), v),
                    other => (other, v),
                })
                .collect();
        }
    }

    fn placeholder(&self) -> String {
        format!("__shadow_{}__", self.identity)
    }

    /// Convert to a concrete value.
    ///
    /// A childless node flattens to `[]` if list-typed, `{}` if dict-typed,
    /// and to its placeholder name if it was never indexed. A node that was
    /// indexed both ways fails with [`ShadowError::MixedIndexing`] rather
    /// than letting one view win silently.
    fn flatten(&self) -> Result<Value, ShadowError> {
        if self.is_list && self.is_dict {
            return Err(ShadowError::MixedIndexing {
                identity: self.identity,
            });
        }
        if self.items.is_empty() {
            return Ok(if self.is_list {
                Value::Array(Vec::new())
            } else if self.is_dict {
                Value::Object(serde_json::Map::new())
            } else {
                Value::String(self.placeholder())
            });
        }
        if self.is_list {
            let mut entries: Vec<(usize, &ShadowChild)> = self
                .items
                .iter()
                .filter_map(|(key, child)| match key {
                    ShadowKey::Index(i) => Some((*i, child)),
                    ShadowKey::Name(_) => None,
                })
                .collect();
            entries.sort_by_key(|(i, _)| *i);
            let values = entries
                .into_iter()
                .map(|(_, child)| flatten_child(child))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(values))
        } else {
            let mut map = serde_json::Map::new();
            for (key, child) in &self.items {
                let name = match key {
                    ShadowKey::Name(name) => name.clone(),
                    ShadowKey::Index(i) => i.to_string(),
                };
                map.insert(name, flatten_child(child)?);
            }
            Ok(Value::Object(map))
        }
    }
}

fn flatten_child(child: &ShadowChild) -> Result<Value, ShadowError> {
    match child {
        ShadowChild::Node(node) => node.flatten(),
        ShadowChild::Value(value) => Ok(value.clone()),
    }
}

// ── Tree ──────────────────────────────────────────────────────────────────

/// A shadow tree: the root node plus the identity counter for its lineage.
///
/// The counter is owned here and threaded through node construction, so
/// identities are unique within one tree and `Clone` yields a fully
/// independent deep copy — same shape, values, flags and identities, sharing
/// nothing with the original.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowTree {
    counter: u64,
    root: ShadowNode,
    /// Set when a delta replaced the whole tree with a concrete value; all
    /// later operations run inside it.
    root_value: Option<Value>,
}

impl Default for ShadowTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadowTree {
    pub fn new() -> Self {
        let mut counter = 0;
        let root = ShadowNode::new(&mut counter);
        ShadowTree {
            counter,
            root,
            root_value: None,
        }
    }

    pub fn root(&self) -> &ShadowNode {
        &self.root
    }

    /// Read the root's child at `key`, creating an empty placeholder node
    /// (and filling any sequence holes below an integer key) if absent.
    pub fn read(&mut self, key: impl Into<ShadowKey>) -> &mut ShadowChild {
        self.root.read(key.into(), &mut self.counter)
    }

    /// Store `value` at `key` on the root, overwriting any previous entry.
    pub fn write(&mut self, key: impl Into<ShadowKey>, value: impl Into<ShadowChild>) {
        self.root.write(key.into(), value.into(), &mut self.counter);
    }

    /// Insert `value` at a root sequence position, shifting later items up.
    pub fn insert(&mut self, key: impl Into<ShadowKey>, value: impl Into<ShadowChild>) {
        self.root.insert(key.into(), value.into(), &mut self.counter);
    }

    /// Remove the root's child at `key`; absent keys are a no-op.
    pub fn delete(&mut self, key: impl Into<ShadowKey>) {
        self.root.delete(&key.into());
    }

    /// Flatten the whole tree to a concrete, independently owned value.
    pub fn flatten(&self) -> Result<Value, ShadowError> {
        match &self.root_value {
            Some(value) => Ok(value.clone()),
            None => self.root.flatten(),
        }
    }
}

impl DeltaTarget for ShadowTree {
    /// Walk the path, auto-vivifying missing interior nodes. When a step
    /// lands on a concrete value stored earlier, the rest of the path is
    /// applied inside that value with the concrete-tree rules.
    fn apply_path(&mut self, path: &[PathStep], op: PathOp) -> Result<(), DeltaError> {
        if let Some(value) = self.root_value.as_mut() {
            return apply_value_op(value, path, op);
        }
        if path.is_empty() {
            return match op {
                PathOp::Set(value) => {
                    self.root_value = Some(value);
                    Ok(())
                }
                _ => Err(DeltaError::InvalidTarget("root".to_string())),
            };
        }
        let counter = &mut self.counter;
        let mut node = &mut self.root;
        for (depth, step) in path[..path.len() - 1].iter().enumerate() {
            match node.read(ShadowKey::from(step), counter) {
                ShadowChild::Node(child) => node = child,
                ShadowChild::Value(value) => {
                    return apply_value_op(value, &path[depth + 1..], op);
                }
            }
        }
        let key = ShadowKey::from(&path[path.len() - 1]);
        match op {
            PathOp::Set(value) => node.write(key, ShadowChild::Value(value), counter),
            PathOp::Insert(value) => node.insert(key, ShadowChild::Value(value), counter),
            PathOp::Remove => {
                // Mark the discipline and fill holes even when nothing is
                // there to remove: a removal still pins the container kind
                // and the positions below the removed index.
                node.apply_list_fix(&key, counter);
                node.delete(&key);
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
