//! The authoritative `TaskDefinition` resource and its condition types.

use serde::{Deserialize, Serialize};

use super::meta::{GroupVersionKind, ObjectMeta};
use super::state::TaskState;
use super::task::TaskSpec;
use super::Resource;

/// One object selector with the predicates that must hold against it.
///
/// `apiVersion` and `kind` are required for the condition to be evaluable.
/// An empty `name` selects the whole collection of that type, in which case
/// `matchAll` decides between every-item-must-match and any-item-matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskCondition {
    pub api_version: String,
    pub kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_group: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Empty for cluster-scoped targets.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// If true the condition holds iff the named object is absent;
    /// `resourceCondition` is ignored.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub not_exists: bool,
    /// Collection policy: every item must satisfy all predicates (true) or
    /// one satisfying item suffices (false).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub match_all: bool,
    /// All predicates must hold (logical AND). Empty means existence alone
    /// satisfies the condition.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_condition: Vec<ResourceCondition>,
}

impl TaskCondition {
    /// Target type of this condition. `apiGroup` takes precedence; otherwise
    /// a `group/version` apiVersion is split.
    pub fn gvk(&self) -> GroupVersionKind {
        if self.api_group.is_empty() {
            GroupVersionKind::from_api_version(&self.api_version, &self.kind)
        } else {
            GroupVersionKind::new(&self.api_group, &self.api_version, &self.kind)
        }
    }
}

/// One field predicate against the serialized form of an object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceCondition {
    /// Dotted path into the serialized object, e.g. `metadata.name`.
    /// A trailing `#` yields the length of the array at that path.
    pub field: String,
    /// One of `eq`, `neq`, `lt`, `gt`, `contains`, `nil`, `notnil`.
    /// Carried as a string on the wire; validated at evaluation time.
    pub operator: String,
    /// Comparison payload. Must be a base-10 integer for `lt`/`gt`;
    /// ignored for `nil`/`notnil`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskDefinitionSpec {
    pub task_spec: TaskSpec,
    /// All conditions must succeed for the task to complete (logical AND).
    #[serde(rename = "taskConditions", skip_serializing_if = "Vec::is_empty")]
    pub task_conditions: Vec<TaskCondition>,
    /// Name of a TaskDefinition that must be successful before this one may
    /// become active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_task_name: Option<String>,
    /// Points awarded when the task completes; counted by the owning
    /// exercise set. Zero or absent means "no points defined".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskDefinitionStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskState>,
}

/// Authoritative spec+status record for one learning step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskDefinition {
    pub metadata: ObjectMeta,
    pub spec: TaskDefinitionSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskDefinitionStatus>,
}

impl TaskDefinition {
    /// Current lifecycle state, if the status has been written yet.
    pub fn state(&self) -> Option<TaskState> {
        self.status.as_ref().and_then(|status| status.state)
    }
}

impl Resource for TaskDefinition {
    const API_VERSION: &'static str = super::API_VERSION;
    const KIND: &'static str = "TaskDefinition";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_gvk_variants() {
        let core = TaskCondition {
            api_version: "v1".into(),
            kind: "Namespace".into(),
            ..Default::default()
        };
        assert_eq!(core.gvk(), GroupVersionKind::core("v1", "Namespace"));

        let grouped = TaskCondition {
            api_version: "v1".into(),
            api_group: "apps".into(),
            kind: "Deployment".into(),
            ..Default::default()
        };
        assert_eq!(
            grouped.gvk(),
            GroupVersionKind::new("apps", "v1", "Deployment")
        );

        let combined = TaskCondition {
            api_version: "apps/v1".into(),
            kind: "Deployment".into(),
            ..Default::default()
        };
        assert_eq!(
            combined.gvk(),
            GroupVersionKind::new("apps", "v1", "Deployment")
        );
    }

    #[test]
    fn wire_names_match_the_crd() {
        let definition = TaskDefinition {
            metadata: ObjectMeta::named("default", "task1"),
            spec: TaskDefinitionSpec {
                task_conditions: vec![TaskCondition {
                    api_version: "v1".into(),
                    kind: "Namespace".into(),
                    not_exists: true,
                    ..Default::default()
                }],
                required_task_name: Some("task0".into()),
                ..Default::default()
            },
            status: None,
        };
        let value = serde_json::to_value(&definition).unwrap();
        assert!(value["spec"].get("taskConditions").is_some());
        assert!(value["spec"].get("requiredTaskName").is_some());
        assert_eq!(value["spec"]["taskConditions"][0]["notExists"], true);
    }
}
