//! Aggregator for one ExerciseSet.
//!
//! Ensures every member TaskDefinition exists with the declared spec and an
//! owner reference back to the set, then recomputes the rollup counters from
//! the members' live status. Holds no private state: the rollup is rebuilt
//! from scratch on every pass and written only when it changed.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::api::meta::ObjectMeta;
use crate::api::{ExerciseSet, ExerciseSetStatus, Resource, TaskDefinition, TaskState};
use crate::store::{Object, ObjectStore, StoreError};

use super::{Outcome, ReconcileError, DEFAULT_REQUEUE_AFTER};

pub struct ExerciseSetReconciler {
    store: Arc<dyn ObjectStore>,
    requeue_after: Duration,
}

impl ExerciseSetReconciler {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            requeue_after: DEFAULT_REQUEUE_AFTER,
        }
    }

    /// Interval for the periodic rollup recompute.
    pub fn with_requeue_after(mut self, requeue_after: Duration) -> Self {
        self.requeue_after = requeue_after;
        self
    }

    pub async fn reconcile(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Outcome, ReconcileError> {
        let key = ExerciseSet::key(namespace, name);
        let object = match self.store.get(&key).await {
            Ok(object) => object,
            Err(StoreError::NotFound) => return Ok(Outcome::Done),
            Err(err) => return Err(err.into()),
        };
        let set: ExerciseSet = object.to_typed()?;

        let mut rollup = ExerciseSetStatus::default();
        for member in &set.spec.task_definitions {
            let definition = self.ensure_member(namespace, &set, member).await?;

            rollup.number_of_tasks += 1;
            match definition.state() {
                Some(TaskState::Active) => rollup.number_of_active_tasks += 1,
                Some(TaskState::Pending) => rollup.number_of_pending_tasks += 1,
                Some(TaskState::Successful) => rollup.number_of_successful_tasks += 1,
                None => rollup.number_of_unknown_tasks += 1,
            }

            let points = member.task_definition_spec.points.unwrap_or(0);
            rollup.points_total += points;
            if points == 0 {
                rollup.number_of_tasks_without_points += 1;
            }
            if definition.state() == Some(TaskState::Successful) {
                rollup.points_achieved += points;
            }
        }

        if set.status.clone().unwrap_or_default() != rollup {
            tracing::debug!(%key, successful = rollup.number_of_successful_tasks, "rollup changed");
            self.store
                .status_patch(&key, json!({"status": serde_json::to_value(&rollup)?}))
                .await?;
        }

        Ok(Outcome::RequeueAfter(self.requeue_after))
    }

    /// Create the member TaskDefinition if absent; otherwise repair spec
    /// drift and externally-cleared owner references.
    async fn ensure_member(
        &self,
        namespace: &str,
        set: &ExerciseSet,
        member: &crate::api::ExerciseSetMember,
    ) -> Result<TaskDefinition, ReconcileError> {
        let member_key = TaskDefinition::key(namespace, &member.name);
        let mut definition: TaskDefinition = match self.store.get(&member_key).await {
            Ok(object) => object.to_typed()?,
            Err(StoreError::NotFound) => {
                let definition = TaskDefinition {
                    metadata: ObjectMeta {
                        name: member.name.clone(),
                        namespace: Some(namespace.to_string()),
                        owner_references: vec![set.owner_reference()],
                        ..Default::default()
                    },
                    spec: member.task_definition_spec.clone(),
                    status: None,
                };
                let created = self
                    .store
                    .create(Object::from_resource(&definition)?)
                    .await?;
                return Ok(created.to_typed()?);
            }
            Err(err) => return Err(err.into()),
        };

        if definition.spec != member.task_definition_spec {
            definition.spec = member.task_definition_spec.clone();
            self.store
                .update(Object::from_resource(&definition)?)
                .await?;
        }

        let wanted_owners = vec![set.owner_reference()];
        if definition.metadata.owner_references != wanted_owners {
            definition.metadata.owner_references = wanted_owners;
            self.store
                .update(Object::from_resource(&definition)?)
                .await?;
        }

        Ok(definition)
    }
}
