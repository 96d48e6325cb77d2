//! Neo4j connection management and transaction helpers.

use std::sync::Arc;

use cookbook_core::{IdAllocator, NodeLabel, UuidAllocator};
use neo4rs::{query, BoltNull, BoltType, ConfigBuilder, Graph, Query, Row, Txn};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(neo4rs::Error),

    #[error("{label} not found: {id}")]
    NotFound { label: NodeLabel, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GraphError {
    pub fn not_found(label: NodeLabel, id: impl Into<String>) -> Self {
        Self::NotFound {
            label,
            id: id.into(),
        }
    }
}

/// Server status code for a write rejected by a uniqueness constraint.
const CONSTRAINT_VIOLATION: &str = "Neo.ClientError.Schema.ConstraintValidationFailed";

pub(crate) fn is_constraint_violation(code: &str) -> bool {
    code == CONSTRAINT_VIOLATION
}

/// Writes rejected by a uniqueness constraint surface as `Conflict`.
impl From<neo4rs::Error> for GraphError {
    fn from(err: neo4rs::Error) -> Self {
        match &err {
            neo4rs::Error::Neo4j(server) if is_constraint_violation(server.code()) => {
                tracing::debug!(detail = %server.message(), "Uniqueness constraint rejected write");
                Self::Conflict("A node with the same unique value already exists".to_string())
            }
            _ => Self::Query(err),
        }
    }
}

/// Configuration for connecting to Neo4j.
///
/// Loaded from the `[neo4j]` section of `cookbook.toml` or
/// `COOKBOOK__NEO4J__*` environment variables.
#[derive(Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: String::new(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl std::fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}

/// Thread-safe Neo4j client with connection pooling.
///
/// Holds no per-operation state: each operation checks a connection out of
/// the pool, runs one transaction, and returns it. Clone is cheap.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    ids: Arc<dyn IdAllocator>,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self {
            graph,
            ids: Arc::new(UuidAllocator),
        })
    }

    /// Replace the identity allocator.
    pub fn with_allocator(mut self, ids: Arc<dyn IdAllocator>) -> Self {
        self.ids = ids;
        self
    }

    pub(crate) fn ids(&self) -> &dyn IdAllocator {
        self.ids.as_ref()
    }

    /// Round-trip a trivial statement to prove the server is reachable.
    pub async fn ping(&self) -> Result<(), GraphError> {
        let mut stream = self.graph.execute(query("RETURN 1 AS ok")).await?;
        stream.next().await?;
        Ok(())
    }

    /// Create the uniqueness constraints the graph relies on.
    ///
    /// Idempotent. The name constraints back the upsert-by-name check against
    /// concurrent creators; the email constraint backs registration.
    pub async fn ensure_constraints(&self) -> Result<(), GraphError> {
        let constraints = [
            (NodeLabel::Recipe, "id"),
            (NodeLabel::Ingredient, "id"),
            (NodeLabel::Category, "id"),
            (NodeLabel::User, "id"),
            (NodeLabel::Ingredient, "name"),
            (NodeLabel::Category, "name"),
            (NodeLabel::User, "email"),
        ];

        for (label, property) in constraints {
            let name = format!("{}_{}_unique", label.as_str().to_lowercase(), property);
            let cypher = format!(
                "CREATE CONSTRAINT {name} IF NOT EXISTS
                 FOR (n:{label}) REQUIRE n.{property} IS UNIQUE"
            );
            self.graph.run(query(&cypher)).await?;
            tracing::debug!(constraint = %name, "Constraint ensured");
        }

        tracing::info!(count = constraints.len(), "Graph constraints in place");
        Ok(())
    }

    /// Begin a transaction.
    pub(crate) async fn start_txn(&self) -> Result<Txn, GraphError> {
        Ok(self.graph.start_txn().await?)
    }
}

// ── Transaction Helpers ──────────────────────────────────────────

/// Commit on success, roll back on failure.
///
/// Every operation ends here, so a transaction is released on all paths.
pub(crate) async fn finish<T>(txn: Txn, result: Result<T, GraphError>) -> Result<T, GraphError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = txn.rollback().await {
                tracing::warn!(error = %rollback, "Transaction rollback failed");
            }
            Err(e)
        }
    }
}

/// Run a statement inside the transaction and collect every row.
pub(crate) async fn fetch_all(txn: &mut Txn, q: Query) -> Result<Vec<Row>, GraphError> {
    let mut stream = txn.execute(q).await?;
    let mut rows = Vec::new();
    while let Some(row) = stream.next(txn.handle()).await? {
        rows.push(row);
    }
    Ok(rows)
}

/// Run a statement inside the transaction and return its first row.
pub(crate) async fn fetch_one(txn: &mut Txn, q: Query) -> Result<Option<Row>, GraphError> {
    Ok(fetch_all(txn, q).await?.into_iter().next())
}

/// Deserialize one column of a row into a typed projection.
pub(crate) fn column<T: DeserializeOwned>(row: &Row, key: &str) -> Result<T, GraphError> {
    row.get::<T>(key)
        .map_err(|e| GraphError::Serialization(format!("Failed to decode column {key}: {e}")))
}

/// Bolt value for an optional parameter; `None` becomes `null`.
pub(crate) fn nullable<T: Into<BoltType>>(value: Option<T>) -> BoltType {
    match value {
        Some(v) => v.into(),
        None => BoltType::Null(BoltNull),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.uri, "bolt://localhost:7687");
        assert_eq!(config.user, "neo4j");
        assert_eq!(config.max_connections, 16);
        assert_eq!(config.fetch_size, 256);
    }

    #[test]
    fn test_config_debug_redacts_password() {
        let config = GraphConfig {
            password: "s3cret".to_string(),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[test]
    fn test_not_found_message() {
        let err = GraphError::not_found(NodeLabel::Recipe, "abc");
        assert_eq!(err.to_string(), "Recipe not found: abc");
    }

    #[test]
    fn test_constraint_violation_code() {
        assert!(is_constraint_violation(
            "Neo.ClientError.Schema.ConstraintValidationFailed"
        ));
        assert!(!is_constraint_violation("Neo.ClientError.Statement.SyntaxError"));
        assert!(!is_constraint_violation(
            "Neo.TransientError.Transaction.DeadlockDetected"
        ));
    }

    #[test]
    fn test_transport_errors_stay_query_errors() {
        let err = GraphError::from(neo4rs::Error::ConnectionError);
        assert!(matches!(err, GraphError::Query(_)));
    }

    #[test]
    fn test_nullable_param() {
        assert!(matches!(nullable::<String>(None), BoltType::Null(_)));
        assert!(matches!(nullable(Some("x")), BoltType::String(_)));
    }
}
