//! Decision Ledger: append-only registry of eligibility decisions
//!
//! Each record attributes one eligibility decision to the identity that
//! submitted it and points at off-chain evidence by content identifier
//! (database snapshot CID, explanation CID). The ledger stores CIDs verbatim
//! and never resolves them.
//!
//! ## Key Components
//!
//! - `DecisionLedger`: the async store trait (`store_decision` / `get_record`)
//! - `MemoryDecisionLedger`: process-lifetime implementation
//! - `SurrealDecisionLedger`: durable implementation on SurrealDB
//! - `AppendObserver`: notification hook invoked after each append

mod config;
mod error;
mod memory;
pub mod migrations;
pub mod obs;
pub mod observer;
mod record;
pub mod storage_traits;
pub mod surreal_ledger;

pub use config::{CloudConfig, LedgerConfig};
pub use error::{LedgerError, ValidationError};
pub use memory::MemoryDecisionLedger;
pub use observer::{AppendObserver, BroadcastObserver, ObserverSet, RecordAppended, TracingObserver};
pub use record::{
    parse_participant_id, DecisionDraft, DecisionFields, DecisionRecord, RecordDigest, Submitter,
};
pub use storage_traits::{DecisionLedger, LedgerResult};
pub use surreal_ledger::SurrealDecisionLedger;
