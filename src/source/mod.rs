//! Relational source abstraction.
//!
//! The pipelines only need one capability from the relational side: execute a
//! SQL string and get back column names plus rows of scalar values. The
//! ClickHouse backend lives in [`clickhouse_client`]; tests script their own
//! implementations.

pub mod clickhouse_client;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use clickhouse_client::ClickHouseSource;

/// A query result row set, column names zipped against row cells on demand.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// A row as an ordered column → value mapping. Ephemeral: produced per query
/// result, consumed by the materializer.
pub type ObjectRecord = serde_json::Map<String, Value>;

impl QueryResult {
    /// Zip every row against the column names.
    pub fn records(&self) -> Vec<ObjectRecord> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Query failed: {0}")]
    Query(#[from] clickhouse::error::Error),

    #[error("I/O while reading query result: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed result row: {error}")]
    Decode { error: String },
}

#[async_trait]
pub trait RelationalSource: Send + Sync {
    /// Execute a SQL query and collect the full result.
    async fn execute(&self, sql: &str) -> Result<QueryResult, SourceError>;
}
