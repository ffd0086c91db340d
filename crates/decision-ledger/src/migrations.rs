//! SurrealDB schema initialization
//!
//! Defines the `decision_records` table with the constraints that make the
//! stored sequences append-only.

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::storage_traits::LedgerResult;

/// Table holding every appended record.
pub const RECORDS_TABLE: &str = "decision_records";

/// Initialize all ledger tables in SurrealDB.
///
/// Safe to call multiple times (idempotent). This is the "deploy" step:
/// afterwards the ledger is empty and ready to accept appends.
pub async fn init_schema(db: &Surreal<Any>) -> LedgerResult<()> {
    info!("Initializing decision ledger schema");
    init_decision_records_table(db).await?;
    info!("Decision ledger schema initialization complete");
    Ok(())
}

/// Initialize `decision_records`
///
/// Schema:
/// ```text
/// TABLE decision_records {
///   submitter:        STRING (partition key)
///   record_index:     INT    (0-based position within submitter)
///   database_cid:     STRING
///   explanation_cid:  STRING
///   decision:         STRING
///   participant_id:   STRING (decimal u64)
/// }
/// ```
///
/// Constraints:
/// - `(submitter, record_index)` is unique: no two records share a position
/// - every field is READONLY and the `append_only` event throws on UPDATE and
///   DELETE, so rows cannot change even for root sessions (table PERMISSIONS
///   only bind record-level users)
/// - gap-free numbering is enforced by the ledger at append time
async fn init_decision_records_table(db: &Surreal<Any>) -> LedgerResult<()> {
    debug!("Initializing decision_records table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS decision_records SCHEMALESS
            PERMISSIONS
                FOR select, create FULL
                FOR update, delete NONE;

        DEFINE FIELD IF NOT EXISTS submitter ON TABLE decision_records TYPE string READONLY;
        DEFINE FIELD IF NOT EXISTS record_index ON TABLE decision_records TYPE int READONLY;
        DEFINE FIELD IF NOT EXISTS database_cid ON TABLE decision_records TYPE string READONLY;
        DEFINE FIELD IF NOT EXISTS explanation_cid ON TABLE decision_records TYPE string READONLY;
        DEFINE FIELD IF NOT EXISTS decision ON TABLE decision_records TYPE string READONLY;
        DEFINE FIELD IF NOT EXISTS participant_id ON TABLE decision_records TYPE string READONLY;

        DEFINE EVENT IF NOT EXISTS append_only ON TABLE decision_records
            WHEN $event = "UPDATE" OR $event = "DELETE"
            THEN {
                THROW "decision_records is append-only";
            };

        DEFINE INDEX IF NOT EXISTS idx_submitter_index ON TABLE decision_records COLUMNS submitter, record_index UNIQUE;

        DEFINE INDEX IF NOT EXISTS idx_submitter ON TABLE decision_records COLUMNS submitter;

        DEFINE INDEX IF NOT EXISTS idx_participant_id ON TABLE decision_records COLUMNS participant_id;
    "#;

    db.query(sql).await?.check()?;
    info!("✓ decision_records table initialized");
    Ok(())
}
