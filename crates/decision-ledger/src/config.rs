//! Connection configuration for the durable ledger
//!
//! Resolution order used by [`LedgerConfig::from_env`]:
//! 1. SurrealDB Cloud / remote server credentials (`SURREALDB_ENDPOINT`, ...)
//! 2. A plain connection URL (`SURREALDB_URL`)
//! 3. Local persistence under `.decision-ledger/db`

use std::path::PathBuf;

/// Default namespace for ledger tables
pub const DEFAULT_NAMESPACE: &str = "decision_ledger";
/// Default database name
pub const DEFAULT_DATABASE: &str = "main";
/// Default on-disk location when nothing else is configured
pub const DEFAULT_LOCAL_PATH: &str = ".decision-ledger/db";

/// Credentials for an authenticated SurrealDB server
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// WebSocket endpoint URL (e.g., "wss://xxx.aws-use1.surrealdb.cloud")
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub namespace: String,
    pub database: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

impl CloudConfig {
    /// Create a new configuration for a database user
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            is_root: false,
        }
    }

    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - SURREALDB_ENDPOINT (required)
    /// - SURREALDB_USERNAME (required)
    /// - SURREALDB_PASSWORD (required)
    /// - SURREALDB_NAMESPACE (optional, default: "decision_ledger")
    /// - SURREALDB_DATABASE (optional, default: "main")
    /// - SURREALDB_ROOT (optional, default: "false")
    pub fn from_env() -> std::result::Result<Self, String> {
        let endpoint =
            std::env::var("SURREALDB_ENDPOINT").map_err(|_| "SURREALDB_ENDPOINT not set")?;
        let username =
            std::env::var("SURREALDB_USERNAME").map_err(|_| "SURREALDB_USERNAME not set")?;
        let password =
            std::env::var("SURREALDB_PASSWORD").map_err(|_| "SURREALDB_PASSWORD not set")?;
        let is_root = std::env::var("SURREALDB_ROOT")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self::new(endpoint, username, password)
            .with_namespace(namespace_from_env())
            .with_database(database_from_env())
            .with_root(is_root))
    }
}

fn namespace_from_env() -> String {
    std::env::var("SURREALDB_NAMESPACE").unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string())
}

fn database_from_env() -> String {
    std::env::var("SURREALDB_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string())
}

/// Where a [`crate::SurrealDecisionLedger`] keeps its state
#[derive(Debug, Clone)]
pub enum LedgerConfig {
    /// Volatile `mem://` engine
    InMemory,
    /// Embedded `surrealkv://` store at the given directory
    Local {
        path: PathBuf,
        namespace: String,
        database: String,
    },
    /// Unauthenticated connection URL (`ws://`, `mem://`, `surrealkv://`, ...)
    Url {
        url: String,
        namespace: String,
        database: String,
    },
    /// Authenticated server
    Cloud(CloudConfig),
}

impl LedgerConfig {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        LedgerConfig::Local {
            path: path.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        LedgerConfig::Url {
            url: url.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    /// Resolve from environment variables (see module docs for the order).
    pub fn from_env() -> Self {
        if let Ok(cloud) = CloudConfig::from_env() {
            return LedgerConfig::Cloud(cloud);
        }
        if let Ok(url) = std::env::var("SURREALDB_URL") {
            return LedgerConfig::Url {
                url,
                namespace: namespace_from_env(),
                database: database_from_env(),
            };
        }
        LedgerConfig::Local {
            path: PathBuf::from(DEFAULT_LOCAL_PATH),
            namespace: namespace_from_env(),
            database: database_from_env(),
        }
    }

    /// Connection string handed to `surrealdb::engine::any::connect`.
    pub fn endpoint(&self) -> String {
        match self {
            LedgerConfig::InMemory => "mem://".to_string(),
            LedgerConfig::Local { path, .. } => format!("surrealkv://{}", path.display()),
            LedgerConfig::Url { url, .. } => url.clone(),
            LedgerConfig::Cloud(cloud) => cloud.endpoint.clone(),
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            LedgerConfig::InMemory => DEFAULT_NAMESPACE,
            LedgerConfig::Local { namespace, .. } | LedgerConfig::Url { namespace, .. } => {
                namespace
            }
            LedgerConfig::Cloud(cloud) => &cloud.namespace,
        }
    }

    pub fn database(&self) -> &str {
        match self {
            LedgerConfig::InMemory => DEFAULT_DATABASE,
            LedgerConfig::Local { database, .. } | LedgerConfig::Url { database, .. } => database,
            LedgerConfig::Cloud(cloud) => &cloud.database,
        }
    }

    /// Stable address of the deployed ledger: `<endpoint>/<namespace>/<database>`.
    pub fn handle(&self) -> String {
        format!("{}/{}/{}", self.endpoint(), self.namespace(), self.database())
    }
}
