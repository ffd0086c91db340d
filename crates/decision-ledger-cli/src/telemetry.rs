//! Tracing subscriber setup for the CLI.
//!
//! `RUST_LOG` takes precedence over the level chosen by `--verbose`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directives used when `RUST_LOG` is unset.
///
/// The binary and the library share the `decision_ledger` target, so one
/// directive covers both. Everything else (the SurrealDB engine included)
/// stays at `warn`.
fn default_directives(level: Level) -> String {
    format!("warn,decision_ledger={}", level.as_str().to_lowercase())
}

fn build_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// Install the global subscriber. Plain text by default, one JSON object per
/// line when `json` is set. A second call is a no-op.
pub fn init_tracing(json: bool, level: Level) {
    let filter = build_filter(level);
    let verbose = level >= Level::DEBUG;

    let installed = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(verbose))
            .try_init()
    };
    installed.ok();
}
