//! The display-facing `Task` resource.
//!
//! A Task is a one-to-one mirror of a TaskDefinition, owned by it through an
//! owner reference. Consumers that only need "what to show the learner" read
//! Tasks and never touch TaskDefinitions.

use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;
use super::state::TaskState;
use super::Resource;

/// What to present to the learner for one task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskSpec {
    pub title: String,
    pub description: String,
    /// Optional long-form description shown on the task detail view.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub long_description: String,
    /// Optional link that helps solving the task.
    #[serde(skip_serializing_if = "String::is_empty", rename = "helpURL")]
    pub help_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskState>,
}

/// Mirror object for a TaskDefinition; spec and state are copies kept in
/// sync by the lifecycle reconciler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub metadata: ObjectMeta,
    pub spec: TaskSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl Task {
    pub fn state(&self) -> Option<TaskState> {
        self.status.as_ref().and_then(|status| status.state)
    }
}

impl Resource for Task {
    const API_VERSION: &'static str = super::API_VERSION;
    const KIND: &'static str = "Task";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
