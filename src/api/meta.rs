//! Object identity: metadata, ownership, and type/key addressing.
//!
//! These types mirror the generic metadata carried by every object in the
//! backing store. Wire names are camelCase to stay compatible with documents
//! produced by other tooling.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard metadata present on every stored object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Store-assigned unique id. Absent until the object is first created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,

    /// A set deletion timestamp means the object is being finalized and must
    /// not be reconciled further.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,
}

impl ObjectMeta {
    /// Metadata for a fresh namespaced object.
    pub fn named(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            ..Self::default()
        }
    }

    /// Whether any owner reference points at the given uid.
    pub fn owned_by_uid(&self, uid: &str) -> bool {
        self.owner_references
            .iter()
            .any(|reference| reference.uid == uid)
    }
}

/// Reference to the owning object, used for cascade deletion and for
/// locating derived objects by owner uid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: String,
}

/// Fully qualified object type: API group, version, and kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Type in the core group (empty group string).
    pub fn core(version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new("", version, kind)
    }

    /// Split a combined `group/version` (or bare `version`) string.
    pub fn from_api_version(api_version: &str, kind: impl Into<String>) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::core(api_version, kind),
        }
    }

    /// Combined `group/version` form, or the bare version for core types.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version(), self.kind)
    }
}

/// Addresses exactly one object in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub gvk: GroupVersionKind,
    /// `None` for cluster-scoped objects.
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectKey {
    pub fn new(gvk: GroupVersionKind, namespace: Option<String>, name: impl Into<String>) -> Self {
        Self {
            gvk,
            namespace,
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{} {}/{}", self.gvk, namespace, self.name),
            None => write!(f, "{} {}", self.gvk, self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_version_round_trip() {
        let core = GroupVersionKind::from_api_version("v1", "Namespace");
        assert_eq!(core.group, "");
        assert_eq!(core.api_version(), "v1");

        let grouped = GroupVersionKind::from_api_version("apps/v1", "Deployment");
        assert_eq!(grouped.group, "apps");
        assert_eq!(grouped.version, "v1");
        assert_eq!(grouped.api_version(), "apps/v1");
    }

    #[test]
    fn metadata_owner_lookup() {
        let mut meta = ObjectMeta::named("default", "demo");
        assert!(!meta.owned_by_uid("abc"));
        meta.owner_references.push(OwnerReference {
            api_version: "taskteach.dev/v1alpha1".into(),
            kind: "TaskDefinition".into(),
            name: "demo".into(),
            uid: "abc".into(),
        });
        assert!(meta.owned_by_uid("abc"));
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let mut meta = ObjectMeta::named("default", "demo");
        meta.owner_references.push(OwnerReference::default());
        let value = serde_json::to_value(&meta).unwrap();
        assert!(value.get("ownerReferences").is_some());
        assert!(value.get("owner_references").is_none());
    }
}
