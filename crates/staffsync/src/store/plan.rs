//! Fan-out write plans.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde_json::Value;

use super::paths::StorePath;

/// A single atomic request touching multiple store paths.
///
/// `Some(value)` writes the path, `None` deletes it. The whole plan is
/// applied as one unit by [`RecordStore::write_many`]; a plan is never
/// split across calls.
///
/// [`RecordStore::write_many`]: super::RecordStore::write_many
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WritePlan {
    ops: BTreeMap<StorePath, Option<Value>>,
}

impl WritePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` at `path`. A later op on the same path replaces an
    /// earlier one.
    pub fn set(&mut self, path: StorePath, value: Value) {
        self.ops.insert(path, Some(value));
    }

    /// Deletes the subtree at `path`.
    pub fn delete(&mut self, path: StorePath) {
        self.ops.insert(path, None);
    }

    /// Folds another plan into this one; `other` wins on path collisions.
    pub fn merge(&mut self, other: WritePlan) {
        self.ops.extend(other.ops);
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn get(&self, path: &StorePath) -> Option<&Option<Value>> {
        self.ops.get(path)
    }

    /// Whether the plan writes (not deletes) the given path.
    pub fn writes(&self, path: &StorePath) -> bool {
        matches!(self.ops.get(path), Some(Some(_)))
    }

    /// Whether the plan deletes the given path.
    pub fn deletes(&self, path: &StorePath) -> bool {
        matches!(self.ops.get(path), Some(None))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StorePath, &Option<Value>)> {
        self.ops.iter()
    }
}

impl IntoIterator for WritePlan {
    type Item = (StorePath, Option<Value>);
    type IntoIter = btree_map::IntoIter<StorePath, Option<Value>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
