//! In-memory record store.
//!
//! Backs tests and local development with the same hierarchical tree
//! semantics as the hosted store: a prefix read returns the subtree,
//! writing null deletes, and emptied parents disappear.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::error::{Result, StoreError};
use super::paths::StorePath;
use super::plan::WritePlan;
use super::RecordStore;

pub struct MemoryRecordStore {
    root: RwLock<Value>,
    fail_writes: AtomicBool,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent write fail with a `StoreError`, without
    /// touching the tree. Used to exercise failure paths in tests.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Clone of the whole tree.
    pub fn snapshot(&self) -> Value {
        self.root.read().expect("store lock poisoned").clone()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed {
                message: "injected write failure".to_string(),
            });
        }
        Ok(())
    }

    fn lookup<'a>(mut node: &'a Value, path: &StorePath) -> Option<&'a Value> {
        for segment in path.segments() {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    /// Sets or deletes a path, pruning parents emptied by a delete.
    /// Returns whether `node` itself became empty.
    fn apply(node: &mut Value, segments: &[&str], value: Option<&Value>) -> bool {
        let Some((head, rest)) = segments.split_first() else {
            return false;
        };
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let map = node.as_object_mut().expect("just coerced to object");

        if rest.is_empty() {
            match value {
                Some(v) => {
                    map.insert((*head).to_string(), v.clone());
                }
                None => {
                    map.remove(*head);
                }
            }
        } else {
            let child = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if Self::apply(child, rest, value) {
                map.remove(*head);
            }
        }
        map.is_empty()
    }

    fn write_locked(root: &mut Value, path: &StorePath, value: Option<&Value>) {
        let segments: Vec<&str> = path.segments().collect();
        if segments.is_empty() {
            return;
        }
        // Null writes delete, as in the hosted store.
        let value = value.filter(|v| !v.is_null());
        Self::apply(root, &segments, value);
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>> {
        let root = self.root.read().expect("store lock poisoned");
        Ok(Self::lookup(&root, path).cloned())
    }

    async fn write_many(&self, plan: WritePlan) -> Result<()> {
        self.check_writable()?;
        let mut root = self.root.write().expect("store lock poisoned");
        for (path, value) in plan.iter() {
            Self::write_locked(&mut root, path, value.as_ref());
        }
        Ok(())
    }

    async fn write_one(&self, path: &StorePath, value: Value) -> Result<()> {
        self.check_writable()?;
        let mut root = self.root.write().expect("store lock poisoned");
        Self::write_locked(&mut root, path, Some(&value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_and_read_nested() {
        let store = MemoryRecordStore::new();
        store
            .write_one(&StorePath::new("records/c1/name"), json!("Dana"))
            .await
            .unwrap();

        let leaf = store.read(&StorePath::new("records/c1/name")).await.unwrap();
        assert_eq!(leaf, Some(json!("Dana")));

        // A prefix read returns the subtree.
        let subtree = store.read(&StorePath::new("records")).await.unwrap();
        assert_eq!(subtree, Some(json!({ "c1": { "name": "Dana" } })));
    }

    #[tokio::test]
    async fn test_missing_path_is_absent() {
        let store = MemoryRecordStore::new();
        assert_eq!(store.read(&StorePath::new("nope/nothing")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_prunes_empty_parents() {
        let store = MemoryRecordStore::new();
        store
            .write_one(&StorePath::new("manager_index/m1/c1_r1"), json!({ "x": 1 }))
            .await
            .unwrap();

        let mut plan = WritePlan::new();
        plan.delete(StorePath::new("manager_index/m1/c1_r1"));
        store.write_many(plan).await.unwrap();

        // The emptied manager bucket no longer exists.
        assert_eq!(
            store.read(&StorePath::new("manager_index/m1")).await.unwrap(),
            None
        );
        assert_eq!(store.read(&StorePath::new("manager_index")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_null_write_deletes() {
        let store = MemoryRecordStore::new();
        store
            .write_one(&StorePath::new("a/b"), json!("v"))
            .await
            .unwrap();
        store.write_one(&StorePath::new("a/b"), Value::Null).await.unwrap();
        assert_eq!(store.read(&StorePath::new("a/b")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_many_applies_all_paths() {
        let store = MemoryRecordStore::new();
        let mut plan = WritePlan::new();
        plan.set(StorePath::new("records/c1/registrations/r1/assignmentStatus"), json!("active"));
        plan.set(StorePath::new("registrations_index/c1_r1/assignmentStatus"), json!("active"));
        plan.delete(StorePath::new("manager_index/m1/c1_r1"));
        store.write_many(plan).await.unwrap();

        assert_eq!(
            store
                .read(&StorePath::new("registrations_index/c1_r1/assignmentStatus"))
                .await
                .unwrap(),
            Some(json!("active"))
        );
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_tree_untouched() {
        let store = MemoryRecordStore::new();
        store
            .write_one(&StorePath::new("a/b"), json!(1))
            .await
            .unwrap();

        store.set_fail_writes(true);
        let mut plan = WritePlan::new();
        plan.set(StorePath::new("a/b"), json!(2));
        assert!(store.write_many(plan).await.is_err());

        store.set_fail_writes(false);
        assert_eq!(store.read(&StorePath::new("a/b")).await.unwrap(), Some(json!(1)));
    }
}
