//! Structured tracing hooks for ledger operations.
//!
//! Events are emitted at `info!` (appends), `debug!` (lookups) and `warn!`
//! (rejections). Filter with `RUST_LOG=decision_ledger=debug`.

use tracing::{debug, info, warn};

/// RAII guard that enters a submitter-scoped span.
///
/// ```ignore
/// let _span = SubmitterSpan::enter(&submitter);
/// // tracing calls below carry submitter = ...
/// ```
pub struct SubmitterSpan {
    _span: tracing::span::EnteredSpan,
}

impl SubmitterSpan {
    pub fn enter(submitter: &str) -> Self {
        let span = tracing::info_span!("ledger.submitter", submitter = %submitter);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: record appended at `index` for `submitter`.
pub fn emit_record_appended(submitter: &str, index: u64, participant_id: u64, decision: &str) {
    info!(
        event = "record.appended",
        submitter = %submitter,
        index = index,
        participant_id = participant_id,
        decision = %decision,
    );
}

/// Emit event: append rejected by validation (warning level).
pub fn emit_append_rejected(submitter: &str, error: &dyn std::fmt::Display) {
    warn!(event = "record.rejected", submitter = %submitter, error = %error);
}

/// Emit event: lookup past the end of a submitter's sequence.
pub fn emit_lookup_out_of_range(submitter: &str, index: u64, count: u64) {
    debug!(
        event = "record.out_of_range",
        submitter = %submitter,
        index = index,
        count = count,
    );
}
