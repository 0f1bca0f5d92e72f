//! The injected resource-store capability.
//!
//! The core never talks to a real cluster directly; everything goes through
//! [`ObjectStore`]. Objects cross this boundary in their generic, schema-less
//! JSON form ([`Object`]) so the condition engine can match arbitrary types
//! without compiled-in knowledge of them.

pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::meta::{GroupVersionKind, ObjectKey};
use crate::api::Resource;

pub use memory::MemoryStore;

/// Store failures the core distinguishes.
///
/// `NotFound` is usually data, not a fault: the condition engine and the
/// reconcilers treat it as a normal negative result. `Conflict` is the
/// store's optimistic-concurrency signal; callers retry via requeue.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,

    #[error("object already exists")]
    AlreadyExists,

    #[error("write conflict, retry")]
    Conflict,

    #[error("invalid object: {0}")]
    Invalid(String),

    #[error("store failure: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether a caller should treat this error as retryable rather than
    /// fatal for the current pass.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict | StoreError::Internal(_))
    }
}

/// A generic object document: `apiVersion`, `kind`, `metadata`, payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Object(Value);

impl Object {
    /// Wrap a raw document. It must be a JSON object carrying `apiVersion`,
    /// `kind`, and `metadata.name`.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        let object = Object(value);
        if object.api_version().is_empty() || object.kind().is_empty() {
            return Err(StoreError::Invalid(
                "document needs apiVersion and kind".to_string(),
            ));
        }
        if object.name().is_empty() {
            return Err(StoreError::Invalid(
                "document needs metadata.name".to_string(),
            ));
        }
        Ok(object)
    }

    /// Serialize a typed resource into its generic form.
    pub fn from_resource<T: Resource>(resource: &T) -> Result<Self, StoreError> {
        let mut value = serde_json::to_value(resource)
            .map_err(|err| StoreError::Invalid(err.to_string()))?;
        if let Value::Object(map) = &mut value {
            map.insert("apiVersion".to_string(), T::API_VERSION.into());
            map.insert("kind".to_string(), T::KIND.into());
        }
        Self::from_value(value)
    }

    /// Deserialize back into a typed resource. Fails on malformed documents,
    /// including unknown lifecycle state strings.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.0.clone())
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn api_version(&self) -> &str {
        self.0
            .get("apiVersion")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn kind(&self) -> &str {
        self.0.get("kind").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::from_api_version(self.api_version(), self.kind())
    }

    pub fn name(&self) -> &str {
        self.meta_str("name").unwrap_or_default()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.meta_str("namespace")
    }

    pub fn uid(&self) -> Option<&str> {
        self.meta_str("uid")
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(
            self.gvk(),
            self.namespace().map(str::to_string),
            self.name(),
        )
    }

    fn meta_str(&self, field: &str) -> Option<&str> {
        self.0.get("metadata")?.get(field)?.as_str()
    }

    pub(crate) fn set_meta_field(&mut self, field: &str, value: Value) {
        if let Value::Object(map) = &mut self.0 {
            let metadata = map
                .entry("metadata")
                .or_insert_with(|| Value::Object(Default::default()));
            if let Value::Object(meta) = metadata {
                meta.insert(field.to_string(), value);
            }
        }
    }
}

/// Get/list/create/update/patch primitives the surrounding framework
/// provides. All patches are RFC 7386 merge patches.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &ObjectKey) -> Result<Object, StoreError>;

    /// All objects of a type, optionally narrowed to one namespace.
    /// Unknown types yield an empty list, not an error.
    async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
    ) -> Result<Vec<Object>, StoreError>;

    async fn create(&self, object: Object) -> Result<Object, StoreError>;

    async fn update(&self, object: Object) -> Result<Object, StoreError>;

    /// Merge-patch anywhere in the object.
    async fn merge_patch(&self, key: &ObjectKey, patch: Value) -> Result<(), StoreError>;

    /// Merge-patch scoped to the status subresource. State transitions go
    /// through here with the exact wire shape `{"status":{"state":"…"}}`.
    async fn status_patch(&self, key: &ObjectKey, patch: Value) -> Result<(), StoreError>;
}
