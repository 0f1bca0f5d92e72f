//! Reconcilers for the task lifecycle and the exercise-set rollup.
//!
//! Each reconciler is invoked with one object key per pass, performs at most
//! one state transition, and reports how the surrounding work queue should
//! proceed via [`Outcome`]. Passes are idempotent: re-running with no
//! external change issues no further writes.

pub mod exercise_set;
pub mod task_definition;

use std::time::Duration;

use crate::condition::ConditionError;
use crate::store::StoreError;

pub use exercise_set::ExerciseSetReconciler;
pub use task_definition::TaskDefinitionReconciler;

/// Requeue interval used when none is configured.
pub const DEFAULT_REQUEUE_AFTER: Duration = Duration::from_secs(5);

/// What the caller's work queue should do after a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing left to do for this key until the next watch event.
    Done,
    /// Re-run immediately; the pass made a transition that enables the next.
    Requeue,
    /// Re-run after the given delay; the pass is waiting on external change.
    RequeueAfter(Duration),
}

/// Errors surfaced to the caller's scheduler. The scheduler owns backoff
/// and retry timing; nothing in here sleeps or loops.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// A stored document failed to decode into its typed form, e.g. an
    /// unknown lifecycle state string.
    #[error("malformed stored object: {0}")]
    Data(#[from] serde_json::Error),
}
