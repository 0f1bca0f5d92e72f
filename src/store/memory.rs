//! In-process implementation of [`ObjectStore`].
//!
//! Backs every test in this crate and lets embedders run the core without a
//! real cluster. Objects live in a map keyed by (type, namespace, name);
//! merge patches follow RFC 7386.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::meta::{GroupVersionKind, ObjectKey};

use super::{Object, ObjectStore, StoreError};

type StoreMap = HashMap<ObjectKey, Value>;

/// Map-backed store with uid assignment and merge-patch support.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<StoreMap>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutating calls (create/update/patch) accepted so far.
    /// Lets tests assert that an idempotent pass issued no writes.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &ObjectKey) -> Result<Object, StoreError> {
        let objects = self.objects.read().await;
        objects
            .get(key)
            .cloned()
            .map(Object)
            .ok_or(StoreError::NotFound)
    }

    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<Object>, StoreError> {
        let objects = self.objects.read().await;
        let mut items: Vec<(&ObjectKey, &Value)> = objects
            .iter()
            .filter(|(key, _)| {
                key.gvk == *gvk
                    && namespace.map_or(true, |wanted| key.namespace.as_deref() == Some(wanted))
            })
            .collect();
        // deterministic order for callers that scan
        items.sort_by(|(a, _), (b, _)| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        Ok(items
            .into_iter()
            .map(|(_, value)| Object(value.clone()))
            .collect())
    }

    async fn create(&self, mut object: Object) -> Result<Object, StoreError> {
        let key = object.key();
        let mut objects = self.objects.write().await;
        if objects.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }
        if object.uid().is_none() {
            object.set_meta_field("uid", Value::String(Uuid::new_v4().to_string()));
        }
        if object
            .value()
            .pointer("/metadata/creationTimestamp")
            .is_none()
        {
            object.set_meta_field(
                "creationTimestamp",
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        objects.insert(key, object.value().clone());
        self.record_write();
        Ok(object)
    }

    async fn update(&self, object: Object) -> Result<Object, StoreError> {
        let key = object.key();
        let mut objects = self.objects.write().await;
        match objects.get_mut(&key) {
            Some(stored) => {
                *stored = object.value().clone();
                self.record_write();
                Ok(object)
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn merge_patch(&self, key: &ObjectKey, patch: Value) -> Result<(), StoreError> {
        let mut objects = self.objects.write().await;
        match objects.get_mut(key) {
            Some(stored) => {
                json_merge_patch(stored, &patch);
                self.record_write();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn status_patch(&self, key: &ObjectKey, patch: Value) -> Result<(), StoreError> {
        // status is not a separate document here; same merge semantics
        self.merge_patch(key, patch).await
    }
}

/// RFC 7386 JSON merge patch.
fn json_merge_patch(target: &mut Value, patch: &Value) {
    match patch {
        Value::Object(entries) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(map) = target {
                for (field, value) in entries {
                    if value.is_null() {
                        map.remove(field);
                    } else {
                        json_merge_patch(
                            map.entry(field.clone()).or_insert(Value::Null),
                            value,
                        );
                    }
                }
            }
        }
        other => *target = other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::meta::ObjectMeta;
    use crate::api::{Resource, TaskDefinition, TaskState};
    use serde_json::json;

    fn definition(name: &str) -> Object {
        Object::from_resource(&TaskDefinition {
            metadata: ObjectMeta::named("default", name),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn create_assigns_uid_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let created = store.create(definition("task1")).await.unwrap();
        assert!(created.uid().is_some());
        assert!(matches!(
            store.create(definition("task1")).await,
            Err(StoreError::AlreadyExists)
        ));
    }

    #[tokio::test]
    async fn get_and_list_by_namespace() {
        let store = MemoryStore::new();
        store.create(definition("task1")).await.unwrap();
        store.create(definition("task2")).await.unwrap();

        let key = TaskDefinition::key("default", "task1");
        assert_eq!(store.get(&key).await.unwrap().name(), "task1");

        let listed = store
            .list(&TaskDefinition::gvk(), Some("default"))
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert!(store
            .list(&TaskDefinition::gvk(), Some("other"))
            .await
            .unwrap()
            .is_empty());
        // unknown type: empty, not an error
        assert!(store
            .list(&GroupVersionKind::core("v1", "Namespace"), None)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn status_patch_uses_exact_wire_shape() {
        let store = MemoryStore::new();
        store.create(definition("task1")).await.unwrap();
        let key = TaskDefinition::key("default", "task1");

        store
            .status_patch(&key, json!({"status": {"state": "pending"}}))
            .await
            .unwrap();
        let typed: TaskDefinition = store.get(&key).await.unwrap().to_typed().unwrap();
        assert_eq!(typed.state(), Some(TaskState::Pending));
    }

    #[tokio::test]
    async fn merge_patch_replaces_and_removes() {
        let store = MemoryStore::new();
        store.create(definition("task1")).await.unwrap();
        let key = TaskDefinition::key("default", "task1");

        store
            .merge_patch(
                &key,
                json!({"metadata": {"annotations": {"a": "1", "b": "2"}}}),
            )
            .await
            .unwrap();
        store
            .merge_patch(&key, json!({"metadata": {"annotations": {"a": null}}}))
            .await
            .unwrap();

        let stored = store.get(&key).await.unwrap();
        let annotations = stored
            .value()
            .pointer("/metadata/annotations")
            .and_then(Value::as_object)
            .unwrap()
            .clone();
        assert!(!annotations.contains_key("a"));
        assert_eq!(annotations.get("b"), Some(&json!("2")));
    }

    #[tokio::test]
    async fn patch_of_missing_object_is_not_found() {
        let store = MemoryStore::new();
        let key = TaskDefinition::key("default", "ghost");
        assert!(matches!(
            store.merge_patch(&key, json!({})).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn write_counter_tracks_mutations() {
        let store = MemoryStore::new();
        assert_eq!(store.write_count(), 0);
        store.create(definition("task1")).await.unwrap();
        assert_eq!(store.write_count(), 1);
        let key = TaskDefinition::key("default", "task1");
        store.get(&key).await.unwrap();
        assert_eq!(store.write_count(), 1);
    }
}
