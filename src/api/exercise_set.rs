//! The `ExerciseSet` resource: an ordered collection of TaskDefinitions
//! with aggregate progress counters.

use serde::{Deserialize, Serialize};

use super::meta::ObjectMeta;
use super::task_definition::TaskDefinitionSpec;
use super::Resource;

/// One member of an exercise set: the TaskDefinition to generate under the
/// given name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseSetMember {
    pub name: String,
    pub task_definition_spec: TaskDefinitionSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseSetSpec {
    #[serde(rename = "taskDefinitions", skip_serializing_if = "Vec::is_empty")]
    pub task_definitions: Vec<ExerciseSetMember>,
}

/// Rollup counters over the member TaskDefinitions. Recomputed in full on
/// every aggregator pass; "unknown" means the member exists but has no
/// status yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseSetStatus {
    pub number_of_tasks: u32,
    pub number_of_active_tasks: u32,
    pub number_of_pending_tasks: u32,
    pub number_of_successful_tasks: u32,
    pub number_of_unknown_tasks: u32,
    pub number_of_tasks_without_points: u32,
    pub points_total: u32,
    pub points_achieved: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExerciseSet {
    pub metadata: ObjectMeta,
    pub spec: ExerciseSetSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ExerciseSetStatus>,
}

impl Resource for ExerciseSet {
    const API_VERSION: &'static str = super::API_VERSION;
    const KIND: &'static str = "ExerciseSet";

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
