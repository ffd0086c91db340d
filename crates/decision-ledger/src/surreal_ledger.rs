//! SurrealDB-backed DecisionLedger implementation
//!
//! Records are stored one row per append in `decision_records`, keyed by
//! `(submitter, record_index)`. Appends for a submitter are serialized by an
//! in-process async lock; the unique index rejects any duplicate position
//! that slips past it (e.g. a second writer process).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{debug, info, instrument};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::memory::validate_append;
use crate::migrations;
use crate::observer::{AppendObserver, ObserverSet};
use crate::record::{DecisionDraft, DecisionRecord, Submitter};
use crate::storage_traits::{out_of_range, DecisionLedger, LedgerResult};

/// Row shape of `decision_records`.
///
/// `participant_id` is stored as decimal text: SurrealDB integers are signed
/// 64-bit and would not hold the upper half of the `u64` range.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DbRecord {
    submitter: String,
    record_index: u64,
    database_cid: String,
    explanation_cid: String,
    decision: String,
    participant_id: String,
}

impl From<&DecisionRecord> for DbRecord {
    fn from(r: &DecisionRecord) -> Self {
        DbRecord {
            submitter: r.submitter.as_str().to_string(),
            record_index: r.index,
            database_cid: r.database_cid.clone(),
            explanation_cid: r.explanation_cid.clone(),
            decision: r.decision.clone(),
            participant_id: r.participant_id.to_string(),
        }
    }
}

impl TryFrom<DbRecord> for DecisionRecord {
    type Error = LedgerError;

    fn try_from(row: DbRecord) -> Result<Self, Self::Error> {
        let participant_id = row.participant_id.parse::<u64>().map_err(|_| {
            LedgerError::Backend(format!(
                "stored participant id is not a u64: {}",
                row.participant_id
            ))
        })?;
        Ok(DecisionRecord {
            submitter: Submitter::new(row.submitter),
            index: row.record_index,
            database_cid: row.database_cid,
            explanation_cid: row.explanation_cid,
            decision: row.decision,
            participant_id,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct SubmitterRow {
    submitter: String,
}

/// SurrealDB-backed implementation of [`DecisionLedger`].
pub struct SurrealDecisionLedger {
    db: Surreal<Any>,
    append_locks: Mutex<HashMap<Submitter, Arc<tokio::sync::Mutex<()>>>>,
    observers: ObserverSet,
}

impl SurrealDecisionLedger {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://` and runs `init_schema`.
    pub async fn in_memory() -> LedgerResult<Self> {
        Self::connect(&LedgerConfig::InMemory).await
    }

    /// Create from environment variables (see [`LedgerConfig::from_env`]).
    pub async fn from_env() -> LedgerResult<Self> {
        Self::connect(&LedgerConfig::from_env()).await
    }

    /// Connect, authenticate if configured, select namespace/database and
    /// initialize the schema.
    pub async fn connect(config: &LedgerConfig) -> LedgerResult<Self> {
        if let LedgerConfig::Local { path, .. } = config {
            std::fs::create_dir_all(path).map_err(|e| {
                LedgerError::Connection(format!(
                    "Failed to create database directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        let endpoint = config.endpoint();
        let db = surrealdb::engine::any::connect(&endpoint)
            .await
            .map_err(|e| {
                LedgerError::Connection(format!("Failed to connect to {}: {}", endpoint, e))
            })?;

        if let LedgerConfig::Cloud(cloud) = config {
            if cloud.is_root {
                db.signin(Root {
                    username: &cloud.username,
                    password: &cloud.password,
                })
                .await
                .map_err(|e| LedgerError::Connection(format!("Root auth failed: {e}")))?;
            } else {
                db.signin(Database {
                    namespace: &cloud.namespace,
                    database: &cloud.database,
                    username: &cloud.username,
                    password: &cloud.password,
                })
                .await
                .map_err(|e| LedgerError::Connection(format!("DB auth failed: {e}")))?;
            }
        }

        db.use_ns(config.namespace())
            .use_db(config.database())
            .await
            .map_err(|e| LedgerError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;

        info!(handle = %config.handle(), "SurrealDecisionLedger connected");
        Ok(Self {
            db,
            append_locks: Mutex::new(HashMap::new()),
            observers: ObserverSet::new(),
        })
    }

    /// Register an observer notified after every successful append.
    pub fn with_observer(mut self, observer: Arc<dyn AppendObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Re-run schema initialization. Existing records are untouched.
    pub async fn deploy(&self) -> LedgerResult<()> {
        migrations::init_schema(&self.db).await
    }

    // -- private helpers -----------------------------------------------------

    fn append_lock(&self, submitter: &Submitter) -> LedgerResult<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self.append_locks.lock()?;
        Ok(locks.entry(submitter.clone()).or_default().clone())
    }

    async fn count(&self, submitter: &Submitter) -> LedgerResult<u64> {
        let mut res = self
            .db
            .query(
                "SELECT count() AS total FROM decision_records WHERE submitter = $s GROUP ALL",
            )
            .bind(("s", submitter.as_str().to_string()))
            .await?;

        let rows: Vec<CountRow> = res.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}

#[async_trait]
impl DecisionLedger for SurrealDecisionLedger {
    #[instrument(skip(self, submitter, draft), fields(submitter = %submitter))]
    async fn store_decision(
        &self,
        submitter: &Submitter,
        draft: DecisionDraft,
    ) -> LedgerResult<u64> {
        let fields = validate_append(submitter, draft)?;

        let lock = self.append_lock(submitter)?;
        let _guard = lock.lock_owned().await;

        let index = self.count(submitter).await?;
        let record = fields.into_record(submitter.clone(), index);

        self.db
            .query("CREATE decision_records CONTENT $row")
            .bind(("row", DbRecord::from(&record)))
            .await?
            .check()?;

        debug!(index, "record persisted");
        self.observers.notify(&record);
        Ok(index)
    }

    async fn get_record(&self, submitter: &Submitter, index: u64) -> LedgerResult<DecisionRecord> {
        let count = self.count(submitter).await?;
        if index >= count {
            return Err(out_of_range(submitter, index, count));
        }

        let mut res = self
            .db
            .query(
                "SELECT * FROM decision_records WHERE submitter = $s AND record_index = $i LIMIT 1",
            )
            .bind(("s", submitter.as_str().to_string()))
            .bind(("i", index))
            .await?;

        let rows: Vec<DbRecord> = res.take(0)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| out_of_range(submitter, index, count))?;
        DecisionRecord::try_from(row)
    }

    async fn record_count(&self, submitter: &Submitter) -> LedgerResult<u64> {
        self.count(submitter).await
    }

    async fn list_records(&self, submitter: &Submitter) -> LedgerResult<Vec<DecisionRecord>> {
        let mut res = self
            .db
            .query("SELECT * FROM decision_records WHERE submitter = $s ORDER BY record_index ASC")
            .bind(("s", submitter.as_str().to_string()))
            .await?;

        let rows: Vec<DbRecord> = res.take(0)?;
        rows.into_iter().map(DecisionRecord::try_from).collect()
    }

    async fn submitters(&self) -> LedgerResult<Vec<Submitter>> {
        let mut res = self
            .db
            .query("SELECT submitter FROM decision_records GROUP BY submitter")
            .await?;

        let rows: Vec<SubmitterRow> = res.take(0)?;
        let mut out: Vec<Submitter> = rows.into_iter().map(|r| Submitter::new(r.submitter)).collect();
        out.sort();
        Ok(out)
    }
}
