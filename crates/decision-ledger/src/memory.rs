//! In-memory decision ledger
//!
//! State lives for the lifetime of the value. Each submitter's sequence sits
//! behind its own mutex so appends for one submitter are strictly ordered
//! while appends and reads for other submitters proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::obs::{self, SubmitterSpan};
use crate::observer::{AppendObserver, ObserverSet};
use crate::record::{DecisionDraft, DecisionFields, DecisionRecord, Submitter};
use crate::storage_traits::{out_of_range, DecisionLedger, LedgerResult};

type Sequence = Arc<Mutex<Vec<DecisionRecord>>>;

/// Lock a submitter's sequence, recovering from poison.
///
/// The only code that runs under this lock after a push is observer
/// notification, so a poisoned sequence still holds only committed records.
fn lock_sequence(seq: &Mutex<Vec<DecisionRecord>>) -> MutexGuard<'_, Vec<DecisionRecord>> {
    seq.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory ledger backed by a `HashMap<Submitter, Vec<DecisionRecord>>`.
#[derive(Debug, Default)]
pub struct MemoryDecisionLedger {
    sequences: RwLock<HashMap<Submitter, Sequence>>,
    observers: ObserverSet,
}

impl MemoryDecisionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer notified after every successful append.
    pub fn with_observer(mut self, observer: Arc<dyn AppendObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    fn sequence(&self, submitter: &Submitter) -> LedgerResult<Option<Sequence>> {
        let sequences = self.sequences.read()?;
        Ok(sequences.get(submitter).cloned())
    }

    fn sequence_or_insert(&self, submitter: &Submitter) -> LedgerResult<Sequence> {
        if let Some(seq) = self.sequence(submitter)? {
            return Ok(seq);
        }
        let mut sequences = self.sequences.write()?;
        Ok(sequences.entry(submitter.clone()).or_default().clone())
    }
}

/// Validation shared by every backend.
pub(crate) fn validate_append(
    submitter: &Submitter,
    draft: DecisionDraft,
) -> LedgerResult<DecisionFields> {
    let checked = submitter.ensure_present().and_then(|()| draft.validate());
    checked.map_err(|e| {
        obs::emit_append_rejected(submitter.as_str(), &e);
        LedgerError::from(e)
    })
}

#[async_trait]
impl DecisionLedger for MemoryDecisionLedger {
    async fn store_decision(
        &self,
        submitter: &Submitter,
        draft: DecisionDraft,
    ) -> LedgerResult<u64> {
        let _span = SubmitterSpan::enter(submitter.as_str());
        let fields = validate_append(submitter, draft)?;

        let seq = self.sequence_or_insert(submitter)?;
        let mut records = lock_sequence(&seq);
        let index = records.len() as u64;
        records.push(fields.into_record(submitter.clone(), index));

        // Still holding the submitter's lock: notification order == index order.
        if let Some(record) = records.last() {
            self.observers.notify(record);
        }
        Ok(index)
    }

    async fn get_record(&self, submitter: &Submitter, index: u64) -> LedgerResult<DecisionRecord> {
        let Some(seq) = self.sequence(submitter)? else {
            return Err(out_of_range(submitter, index, 0));
        };
        let records = lock_sequence(&seq);
        usize::try_from(index)
            .ok()
            .and_then(|i| records.get(i))
            .cloned()
            .ok_or_else(|| out_of_range(submitter, index, records.len() as u64))
    }

    async fn record_count(&self, submitter: &Submitter) -> LedgerResult<u64> {
        match self.sequence(submitter)? {
            Some(seq) => Ok(lock_sequence(&seq).len() as u64),
            None => Ok(0),
        }
    }

    async fn list_records(&self, submitter: &Submitter) -> LedgerResult<Vec<DecisionRecord>> {
        match self.sequence(submitter)? {
            Some(seq) => Ok(lock_sequence(&seq).clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn submitters(&self) -> LedgerResult<Vec<Submitter>> {
        let sequences = self.sequences.read()?;
        let mut out = Vec::with_capacity(sequences.len());
        for (submitter, seq) in sequences.iter() {
            if !lock_sequence(seq).is_empty() {
                out.push(submitter.clone());
            }
        }
        out.sort();
        Ok(out)
    }
}
