//! Storage trait for the decision ledger
//!
//! `DecisionLedger` is async and backend-agnostic. Two implementations ship
//! with the crate:
//! - [`crate::MemoryDecisionLedger`]: process-lifetime state
//! - [`crate::SurrealDecisionLedger`]: SurrealDB-backed, durable

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::record::{DecisionDraft, DecisionRecord, Submitter};

/// Result type for ledger operations
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

/// Append-only, per-submitter-indexed store of decision records.
///
/// Guarantees:
/// - For a fixed submitter, indices returned by `store_decision` are
///   `0, 1, 2, …` in append order, with no gaps and no reuse.
/// - A stored record is returned verbatim by `get_record` forever after.
/// - A rejected append has no effect on any sequence.
/// - Appends for different submitters never affect each other's numbering.
#[async_trait]
pub trait DecisionLedger: Send + Sync {
    /// Validate `draft`, append it to `submitter`'s sequence and return the
    /// assigned index. Fails only with `LedgerError::Validation` (or a
    /// backend error for durable stores).
    async fn store_decision(
        &self,
        submitter: &Submitter,
        draft: DecisionDraft,
    ) -> LedgerResult<u64>;

    /// Return the record at `index` in `submitter`'s sequence, or
    /// `LedgerError::OutOfRange` if `index >= record_count(submitter)`.
    async fn get_record(&self, submitter: &Submitter, index: u64) -> LedgerResult<DecisionRecord>;

    /// Number of records appended by `submitter` (0 if none).
    async fn record_count(&self, submitter: &Submitter) -> LedgerResult<u64>;

    /// The whole sequence for `submitter`, in index order.
    async fn list_records(&self, submitter: &Submitter) -> LedgerResult<Vec<DecisionRecord>>;

    /// Every submitter with at least one record, sorted.
    async fn submitters(&self) -> LedgerResult<Vec<Submitter>>;
}

/// Build the `OutOfRange` error for a lookup.
pub(crate) fn out_of_range(submitter: &Submitter, index: u64, count: u64) -> LedgerError {
    crate::obs::emit_lookup_out_of_range(submitter.as_str(), index, count);
    LedgerError::OutOfRange {
        submitter: submitter.to_string(),
        index,
        count,
    }
}
