//! Wire types for the three resources the core owns, plus the shared
//! metadata vocabulary.

pub mod exercise_set;
pub mod meta;
pub mod state;
pub mod task;
pub mod task_definition;

use serde::de::DeserializeOwned;
use serde::Serialize;

use meta::{GroupVersionKind, ObjectKey, ObjectMeta, OwnerReference};

/// API group/version all taskteach resources live in.
pub const API_VERSION: &str = "taskteach.dev/v1alpha1";

/// A typed resource that can be addressed in the store.
pub trait Resource: Serialize + DeserializeOwned {
    const API_VERSION: &'static str;
    const KIND: &'static str;

    fn metadata(&self) -> &ObjectMeta;

    fn gvk() -> GroupVersionKind {
        GroupVersionKind::from_api_version(Self::API_VERSION, Self::KIND)
    }

    /// Key for a named object of this type.
    fn key(namespace: &str, name: &str) -> ObjectKey {
        ObjectKey::new(Self::gvk(), Some(namespace.to_string()), name)
    }

    /// Key of this instance, from its own metadata.
    fn object_key(&self) -> ObjectKey {
        ObjectKey::new(
            Self::gvk(),
            self.metadata().namespace.clone(),
            self.metadata().name.clone(),
        )
    }

    /// Owner reference pointing at this instance. The uid must already be
    /// assigned by the store.
    fn owner_reference(&self) -> OwnerReference {
        OwnerReference {
            api_version: Self::API_VERSION.to_string(),
            kind: Self::KIND.to_string(),
            name: self.metadata().name.clone(),
            uid: self.metadata().uid.clone().unwrap_or_default(),
        }
    }
}

pub use exercise_set::{ExerciseSet, ExerciseSetMember, ExerciseSetSpec, ExerciseSetStatus};
pub use state::{StateParseError, TaskState};
pub use task::{Task, TaskSpec, TaskStatus};
pub use task_definition::{
    ResourceCondition, TaskCondition, TaskDefinition, TaskDefinitionSpec, TaskDefinitionStatus,
};
