//! Lifecycle reconciler for one TaskDefinition.
//!
//! Drives `pending → active → successful`, mirrors the definition into its
//! display-facing Task, and pokes the owning ExerciseSet on every state
//! change. Every transition is a merge patch of the exact shape
//! `{"status":{"state":"…"}}` — other tooling depends on that wire form.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use crate::api::meta::ObjectKey;
use crate::api::{ExerciseSet, Resource, Task, TaskDefinition, TaskState, TaskStatus};
use crate::condition::ConditionChecker;
use crate::events::{EventRecord, EventSink};
use crate::store::{Object, ObjectStore, StoreError};

use super::{Outcome, ReconcileError, DEFAULT_REQUEUE_AFTER};

/// Annotation patched onto the owning ExerciseSet to trigger its own
/// reconcile. Pure wake-up signal; the value is a nanosecond timestamp.
pub const TRIGGER_ANNOTATION: &str = "taskteach.dev/trigger";

pub struct TaskDefinitionReconciler {
    store: Arc<dyn ObjectStore>,
    events: Arc<dyn EventSink>,
    requeue_after: Duration,
}

impl TaskDefinitionReconciler {
    pub fn new(store: Arc<dyn ObjectStore>, events: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            events,
            requeue_after: DEFAULT_REQUEUE_AFTER,
        }
    }

    /// Delay before re-checking unsatisfied conditions or an unfinished
    /// required task.
    pub fn with_requeue_after(mut self, requeue_after: Duration) -> Self {
        self.requeue_after = requeue_after;
        self
    }

    /// One pass for the TaskDefinition under `namespace`/`name`.
    ///
    /// At most one state transition happens per pass; the returned
    /// [`Outcome`] tells the work queue whether to come back.
    pub async fn reconcile(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Outcome, ReconcileError> {
        let key = TaskDefinition::key(namespace, name);
        let object = match self.store.get(&key).await {
            Ok(object) => object,
            Err(StoreError::NotFound) => return Ok(Outcome::Done),
            Err(err) => return Err(err.into()),
        };
        let definition: TaskDefinition = object.to_typed()?;

        // being deleted: leave it alone
        if definition.metadata.deletion_timestamp.is_some() {
            return Ok(Outcome::Done);
        }

        let Some(state) = definition.state() else {
            self.set_state(TaskState::Pending, &[&key]).await?;
            self.notify_exercise_set(&definition).await?;
            return Ok(Outcome::Requeue);
        };

        if state == TaskState::Successful {
            return Ok(Outcome::Done);
        }

        let task = self.create_or_update_task(&definition).await?;
        let task_key = Task::key(namespace, &task.metadata.name);

        if state == TaskState::Pending {
            return self.check_pending(&key, &task_key, &definition).await;
        }

        // active: ask the condition engine
        let checker = ConditionChecker::new(Arc::clone(&self.store));
        match checker
            .apply_checks(&definition.spec.task_conditions)
            .await
        {
            Err(err) => {
                self.events
                    .publish(EventRecord::warning(
                        key.clone(),
                        "Error",
                        format!("conditions apply failed: {err}"),
                    ))
                    .await;
                Err(err.into())
            }
            Ok(false) => Ok(Outcome::RequeueAfter(self.requeue_after)),
            Ok(true) => {
                self.set_state(TaskState::Successful, &[&key, &task_key])
                    .await?;
                self.notify_exercise_set(&definition).await?;
                self.events
                    .publish(EventRecord::normal(
                        task_key,
                        "Successful",
                        "Task is successfully completed",
                    ))
                    .await;
                tracing::debug!(%key, "task successful");
                Ok(Outcome::Done)
            }
        }
    }

    /// Pending gate: wait for the required task, or activate right away.
    async fn check_pending(
        &self,
        key: &ObjectKey,
        task_key: &ObjectKey,
        definition: &TaskDefinition,
    ) -> Result<Outcome, ReconcileError> {
        if let Some(required_name) = &definition.spec.required_task_name {
            let namespace = key.namespace.as_deref().unwrap_or_default();
            let required_key = TaskDefinition::key(namespace, required_name);
            let required: TaskDefinition = match self.store.get(&required_key).await {
                Ok(object) => object.to_typed()?,
                Err(StoreError::NotFound) => {
                    return Ok(Outcome::RequeueAfter(self.requeue_after))
                }
                Err(err) => return Err(err.into()),
            };
            if required.state() != Some(TaskState::Successful) {
                return Ok(Outcome::RequeueAfter(self.requeue_after));
            }
            self.events
                .publish(EventRecord::normal(
                    task_key.clone(),
                    "Active",
                    "Required task is successful, task is now active",
                ))
                .await;
        } else {
            self.events
                .publish(EventRecord::normal(
                    task_key.clone(),
                    "Active",
                    "Task has no required task, task is now active",
                ))
                .await;
        }
        self.set_state(TaskState::Active, &[key, task_key]).await?;
        self.notify_exercise_set(definition).await?;
        Ok(Outcome::Requeue)
    }

    /// Locate the mirrored Task by owner uid (linear scan — the Task
    /// population is small and namespace-scoped), create it if absent, and
    /// sync spec and state. No diff means no write.
    async fn create_or_update_task(
        &self,
        definition: &TaskDefinition,
    ) -> Result<Task, ReconcileError> {
        let namespace = definition.metadata.namespace.as_deref().unwrap_or_default();
        let definition_key = definition.object_key();
        let uid = definition.metadata.uid.as_deref().unwrap_or_default();

        let tasks = self.store.list(&Task::gvk(), Some(namespace)).await?;
        let mut existing: Option<Task> = None;
        for candidate in &tasks {
            let task: Task = candidate.to_typed()?;
            if task.metadata.owned_by_uid(uid) {
                existing = Some(task);
                break;
            }
        }

        let Some(mut task) = existing else {
            let task = Task {
                metadata: crate::api::meta::ObjectMeta {
                    name: definition.metadata.name.clone(),
                    namespace: definition.metadata.namespace.clone(),
                    owner_references: vec![definition.owner_reference()],
                    ..Default::default()
                },
                spec: definition.spec.task_spec.clone(),
                status: Some(TaskStatus {
                    state: definition.state(),
                }),
            };
            self.store.create(Object::from_resource(&task)?).await?;
            self.events
                .publish(EventRecord::normal(
                    definition_key,
                    "Created",
                    "Task created",
                ))
                .await;
            return Ok(task);
        };

        if task.spec != definition.spec.task_spec {
            task.spec = definition.spec.task_spec.clone();
            self.store.update(Object::from_resource(&task)?).await?;
            self.events
                .publish(EventRecord::normal(
                    definition_key.clone(),
                    "Update",
                    "Task updated",
                ))
                .await;
        }

        if let Some(state) = definition.state() {
            if task.state() != Some(state) {
                let task_key = Task::key(namespace, &task.metadata.name);
                self.set_state(state, &[&task_key]).await?;
                task.status = Some(TaskStatus { state: Some(state) });
                self.events
                    .publish(EventRecord::normal(
                        definition_key,
                        "Update",
                        "Task status updated",
                    ))
                    .await;
            }
        }
        Ok(task)
    }

    /// The compatibility surface: state transitions are merge patches of
    /// exactly `{"status":{"state":"<value>"}}`.
    async fn set_state(
        &self,
        state: TaskState,
        keys: &[&ObjectKey],
    ) -> Result<(), ReconcileError> {
        for key in keys {
            self.store
                .status_patch(key, json!({"status": {"state": state.as_str()}}))
                .await?;
        }
        Ok(())
    }

    /// Dirty-signal to the owning set: patch a fresh nanosecond timestamp
    /// into one annotation so the aggregator wakes up.
    async fn notify_exercise_set(
        &self,
        definition: &TaskDefinition,
    ) -> Result<(), ReconcileError> {
        for owner in &definition.metadata.owner_references {
            if owner.kind != ExerciseSet::KIND || owner.name.is_empty() {
                continue;
            }
            let namespace = definition.metadata.namespace.as_deref().unwrap_or_default();
            let set_key = ExerciseSet::key(namespace, &owner.name);
            self.store.get(&set_key).await?;
            let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
            self.store
                .merge_patch(
                    &set_key,
                    json!({"metadata": {"annotations": {(TRIGGER_ANNOTATION): stamp.to_string()}}}),
                )
                .await?;
        }
        Ok(())
    }
}
