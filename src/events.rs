//! Event sink: human-readable, severity-tagged records attached to an
//! involved object. The reconcilers publish through this seam; process
//! wiring decides where the records actually go.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::api::meta::ObjectKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSeverity {
    Normal,
    Warning,
}

#[derive(Debug, Clone)]
pub struct EventRecord {
    /// The object this event is about.
    pub object: ObjectKey,
    pub severity: EventSeverity,
    /// Short machine-ish reason, e.g. `Created`, `Active`, `Successful`.
    pub reason: String,
    pub message: String,
}

impl EventRecord {
    pub fn normal(
        object: ObjectKey,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            object,
            severity: EventSeverity::Normal,
            reason: reason.into(),
            message: message.into(),
        }
    }

    pub fn warning(
        object: ObjectKey,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            object,
            severity: EventSeverity::Warning,
            reason: reason.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, event: EventRecord);
}

/// Discards everything. For embedders that do not surface events.
pub struct NullEventSink;

#[async_trait]
impl EventSink for NullEventSink {
    async fn publish(&self, _event: EventRecord) {}
}

/// Collects events in memory; tests assert against the recorded stream.
#[derive(Default)]
pub struct MemoryEventSink {
    records: Mutex<Vec<EventRecord>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<EventRecord> {
        self.records.lock().await.clone()
    }

    /// Drain all recorded events.
    pub async fn take(&self) -> Vec<EventRecord> {
        std::mem::take(&mut *self.records.lock().await)
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn publish(&self, event: EventRecord) {
        self.records.lock().await.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Resource, TaskDefinition};

    #[tokio::test]
    async fn memory_sink_records_and_drains() {
        let sink = MemoryEventSink::new();
        let key = TaskDefinition::key("default", "task1");
        sink.publish(EventRecord::normal(key.clone(), "Created", "Task created"))
            .await;
        sink.publish(EventRecord::warning(key, "Error", "check failed"))
            .await;

        let records = sink.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].severity, EventSeverity::Normal);
        assert_eq!(records[1].severity, EventSeverity::Warning);

        assert_eq!(sink.take().await.len(), 2);
        assert!(sink.records().await.is_empty());
    }
}
