//! Append notifications for external observers and indexers.
//!
//! A ledger invokes every registered [`AppendObserver`] once per successful
//! append, after the record is readable and before the next append for the
//! same submitter is admitted. Observers run inline and must not block.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::obs;
use crate::record::{DecisionRecord, RecordDigest};

/// Notification published for each appended record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAppended {
    pub record: DecisionRecord,
    pub digest: RecordDigest,
    pub appended_at: DateTime<Utc>,
}

impl RecordAppended {
    pub fn new(record: DecisionRecord) -> Self {
        let digest = record.digest();
        Self {
            record,
            digest,
            appended_at: Utc::now(),
        }
    }
}

/// Callback hook invoked after a successful append.
pub trait AppendObserver: Send + Sync {
    fn on_append(&self, event: &RecordAppended);
}

/// Registered observers, called in registration order.
#[derive(Clone, Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn AppendObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, observer: Arc<dyn AppendObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub(crate) fn notify(&self, record: &DecisionRecord) {
        if self.observers.is_empty() {
            return;
        }
        let event = RecordAppended::new(record.clone());
        for observer in &self.observers {
            observer.on_append(&event);
        }
    }
}

impl std::fmt::Debug for ObserverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSet")
            .field("observers", &self.observers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// BroadcastObserver
// ---------------------------------------------------------------------------

/// Fans notifications out over a tokio broadcast channel.
///
/// Sending never blocks; a receiver that falls more than `capacity` events
/// behind observes `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct BroadcastObserver {
    tx: broadcast::Sender<RecordAppended>,
}

impl BroadcastObserver {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecordAppended> {
        self.tx.subscribe()
    }
}

impl AppendObserver for BroadcastObserver {
    fn on_append(&self, event: &RecordAppended) {
        // Err only means nobody is subscribed right now.
        let _ = self.tx.send(event.clone());
    }
}

// ---------------------------------------------------------------------------
// TracingObserver
// ---------------------------------------------------------------------------

/// Writes one structured log line per appended record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AppendObserver for TracingObserver {
    fn on_append(&self, event: &RecordAppended) {
        let r = &event.record;
        obs::emit_record_appended(r.submitter.as_str(), r.index, r.participant_id, &r.decision);
    }
}
