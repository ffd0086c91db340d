//! Decision Ledger CLI
//!
//! The `decision-ledger` command is the caller harness for the ledger: it
//! deploys the store, appends decisions on behalf of a submitter and reads
//! them back.
//!
//! ## Commands
//!
//! - `deploy`: initialize ledger state and print its handle
//! - `store`: append a decision, printing the assigned index
//! - `get`: read one record by (submitter, index)
//! - `list`: read a submitter's whole sequence
//! - `submitters`: list identities that have appended records
//! - `interact`: store a mock decision and read it back

mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use decision_ledger::{
    parse_participant_id, DecisionDraft, DecisionLedger, DecisionRecord, LedgerConfig,
    MemoryDecisionLedger, Submitter, SurrealDecisionLedger, TracingObserver,
};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "decision-ledger")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Append-only registry of eligibility decisions", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use a volatile in-process ledger instead of SurrealDB.
    ///
    /// State is discarded when the process exits, so `get`, `list` and
    /// `submitters` only ever see an empty ledger; useful with `interact`
    /// and `deploy`.
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize ledger state and print the handle it is reachable at
    Deploy,

    /// Append a decision record
    Store {
        /// Submitting identity
        #[arg(long, env = "LEDGER_SUBMITTER")]
        submitter: String,

        /// CID of the database snapshot the decision was made against
        #[arg(long)]
        database_cid: String,

        /// CID of the explanation artifact
        #[arg(long)]
        explanation_cid: String,

        /// Decision label (e.g. "Eligible")
        #[arg(long)]
        decision: String,

        /// Participant id (unsigned 64-bit)
        #[arg(long, allow_hyphen_values = true)]
        participant_id: String,
    },

    /// Read one record
    Get {
        /// Submitting identity
        #[arg(long, env = "LEDGER_SUBMITTER")]
        submitter: String,

        /// Zero-based record index
        #[arg(long)]
        index: u64,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read every record of a submitter
    List {
        /// Submitting identity
        #[arg(long, env = "LEDGER_SUBMITTER")]
        submitter: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List identities that have appended at least one record
    Submitters,

    /// Store a mock decision and read it back
    Interact {
        /// Submitting identity
        #[arg(long, env = "LEDGER_SUBMITTER", default_value = DEFAULT_SUBMITTER)]
        submitter: String,
    },
}

/// First account of a local development chain, used when no identity is given.
const DEFAULT_SUBMITTER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

/// An opened ledger plus the handle it was reached at.
struct Deployment {
    ledger: Arc<dyn DecisionLedger>,
    handle: String,
}

async fn open_ledger(in_memory: bool) -> Result<Deployment> {
    if in_memory {
        let ledger = MemoryDecisionLedger::new().with_observer(Arc::new(TracingObserver));
        return Ok(Deployment {
            ledger: Arc::new(ledger),
            handle: "memory://process".to_string(),
        });
    }

    open_durable(&LedgerConfig::from_env()).await
}

async fn open_durable(config: &LedgerConfig) -> Result<Deployment> {
    let ledger = SurrealDecisionLedger::connect(config)
        .await
        .with_context(|| format!("Failed to open decision ledger at {}", config.handle()))?
        .with_observer(Arc::new(TracingObserver));
    Ok(Deployment {
        ledger: Arc::new(ledger),
        handle: config.handle(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    telemetry::init_tracing(cli.json_logs, level);

    let deployment = open_ledger(cli.in_memory).await?;
    let ledger = deployment.ledger.as_ref();

    match cli.command {
        Commands::Deploy => cmd_deploy(&deployment.handle),
        Commands::Store {
            submitter,
            database_cid,
            explanation_cid,
            decision,
            participant_id,
        } => {
            let draft = build_draft(database_cid, explanation_cid, decision, &participant_id)?;
            let index = cmd_store(ledger, &Submitter::new(submitter), draft).await?;
            println!("{}", index);
            Ok(())
        }
        Commands::Get {
            submitter,
            index,
            json,
        } => {
            let record = cmd_get(ledger, &Submitter::new(submitter), index).await?;
            println!("{}", render_record(&record, json)?);
            Ok(())
        }
        Commands::List { submitter, json } => {
            cmd_list(ledger, &Submitter::new(submitter), json).await
        }
        Commands::Submitters => cmd_submitters(ledger).await,
        Commands::Interact { submitter } => {
            cmd_interact(ledger, &Submitter::new(submitter)).await
        }
    }
}

fn cmd_deploy(handle: &str) -> Result<()> {
    info!(handle = %handle, "ledger deployed");
    println!("Decision ledger deployed at: {}", handle);
    Ok(())
}

fn build_draft(
    database_cid: String,
    explanation_cid: String,
    decision: String,
    participant_id: &str,
) -> Result<DecisionDraft> {
    let participant_id =
        parse_participant_id(participant_id).context("invalid --participant-id")?;
    Ok(DecisionDraft::new(
        database_cid,
        explanation_cid,
        decision,
        participant_id,
    ))
}

async fn cmd_store(
    ledger: &dyn DecisionLedger,
    submitter: &Submitter,
    draft: DecisionDraft,
) -> Result<u64> {
    let index = ledger
        .store_decision(submitter, draft)
        .await
        .context("store_decision failed")?;
    Ok(index)
}

async fn cmd_get(
    ledger: &dyn DecisionLedger,
    submitter: &Submitter,
    index: u64,
) -> Result<DecisionRecord> {
    let record = ledger
        .get_record(submitter, index)
        .await
        .context("get_record failed")?;
    Ok(record)
}

async fn cmd_list(ledger: &dyn DecisionLedger, submitter: &Submitter, json: bool) -> Result<()> {
    let records = ledger.list_records(submitter).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No records for {}", submitter);
        return Ok(());
    }
    for record in &records {
        println!("{}", render_record(record, false)?);
    }
    Ok(())
}

async fn cmd_submitters(ledger: &dyn DecisionLedger) -> Result<()> {
    let submitters = ledger.submitters().await?;
    if submitters.is_empty() {
        println!("No submitters yet");
    }
    for submitter in submitters {
        let count = ledger.record_count(&submitter).await?;
        println!("{} {}", submitter, count);
    }
    Ok(())
}

/// Mirror of the original interaction script: one mock append, one read-back.
async fn cmd_interact(ledger: &dyn DecisionLedger, submitter: &Submitter) -> Result<()> {
    let draft = DecisionDraft::new("QmFakeDatabaseCID", "QmFakeExplanationCID", "Eligible", 42);
    let index = cmd_store(ledger, submitter, draft).await?;
    println!("Decision stored at index {}", index);

    let record = cmd_get(ledger, submitter, index).await?;
    println!("Retrieved Record:");
    println!("{}", render_record(&record, false)?);
    Ok(())
}

fn render_record(record: &DecisionRecord, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(record)?);
    }
    Ok(format!(
        "[{}] submitter: {}\n  Database CID: {}\n  Explanation CID: {}\n  Decision: {}\n  Participant ID: {}\n  Digest: {}",
        record.index,
        record.submitter,
        record.database_cid,
        record.explanation_cid,
        record.decision,
        record.participant_id,
        record.digest().short(),
    ))
}
