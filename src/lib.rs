//! # taskteach
//!
//! Condition-driven task lifecycle engine for cluster-style learning
//! exercises.
//!
//! This library provides:
//! - A generic condition engine that matches arbitrary stored objects
//!   against declared field predicates
//! - The reconciler that drives each TaskDefinition through
//!   `pending → active → successful` and mirrors it into a display Task
//! - The ExerciseSet aggregator that rolls member progress up into counters
//!
//! ## Task Flow
//! 1. A watch event delivers a TaskDefinition key to the reconciler
//! 2. The reconciler performs at most one state transition per pass
//! 3. In `active`, the condition engine checks live objects in the store
//! 4. State changes are mirrored to the Task and signalled to the owning set
//!
//! The resource store and the event sink are injected capabilities
//! ([`store::ObjectStore`], [`events::EventSink`]); the surrounding
//! framework owns watches, queues, and backoff. [`store::MemoryStore`]
//! backs the tests and embedded use.
//!
//! ## Modules
//! - `api`: wire types for TaskDefinition, Task, and ExerciseSet
//! - `condition`: predicate evaluation incl. the field-path mini-language
//! - `reconcile`: the lifecycle state machine and the rollup aggregator
//! - `store`: the store seam and the in-memory implementation
//! - `events`: severity-tagged event records

pub mod api;
pub mod condition;
pub mod events;
pub mod reconcile;
pub mod store;

pub use api::{
    ExerciseSet, ExerciseSetMember, ExerciseSetSpec, ExerciseSetStatus, Resource,
    ResourceCondition, Task, TaskCondition, TaskDefinition, TaskDefinitionSpec,
    TaskDefinitionStatus, TaskSpec, TaskState, TaskStatus,
};
pub use condition::{ConditionChecker, ConditionError};
pub use events::{EventRecord, EventSeverity, EventSink, MemoryEventSink, NullEventSink};
pub use reconcile::{
    ExerciseSetReconciler, Outcome, ReconcileError, TaskDefinitionReconciler,
};
pub use store::{MemoryStore, Object, ObjectStore, StoreError};
