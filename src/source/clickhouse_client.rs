//! ClickHouse-backed relational source.

use async_trait::async_trait;
use clickhouse::Client;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;

use super::{QueryResult, RelationalSource, SourceError};
use crate::config::ClickHouseConfig;

pub fn build_client(config: &ClickHouseConfig) -> Client {
    Client::default()
        .with_url(&config.url)
        .with_user(&config.user)
        .with_password(&config.password)
        .with_database(&config.database)
        // Return NULL for unmatched LEFT JOIN columns
        .with_option("join_use_nulls", "1")
}

pub struct ClickHouseSource {
    client: Client,
}

impl ClickHouseSource {
    pub fn new(config: &ClickHouseConfig) -> Self {
        Self {
            client: build_client(config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RelationalSource for ClickHouseSource {
    async fn execute(&self, sql: &str) -> Result<QueryResult, SourceError> {
        // First line carries the column names, each following line one row.
        let mut lines = self
            .client
            .clone()
            .query(sql)
            .fetch_bytes("JSONCompactEachRowWithNames")
            .map_err(|e| {
                log::error!("ClickHouse query failed. SQL was:\n{}\nError: {}", sql, e);
                SourceError::Query(e)
            })?
            .lines();

        let columns: Vec<String> = match lines.next_line().await? {
            Some(header) => serde_json::from_str(&header).map_err(|e| SourceError::Decode {
                error: format!("bad header line: {e}"),
            })?,
            None => return Ok(QueryResult::default()),
        };

        let mut rows: Vec<Vec<Value>> = Vec::new();
        while let Some(line) = lines.next_line().await? {
            if line.is_empty() {
                continue;
            }
            let mut cells: Vec<Value> =
                serde_json::from_str(&line).map_err(|e| SourceError::Decode {
                    error: format!("bad row line: {e}"),
                })?;
            if cells.len() != columns.len() {
                return Err(SourceError::Decode {
                    error: format!(
                        "row has {} cells, expected {}",
                        cells.len(),
                        columns.len()
                    ),
                });
            }
            for cell in &mut cells {
                normalize_newlines(cell);
            }
            rows.push(cells);
        }

        Ok(QueryResult { columns, rows })
    }
}

/// Windows line endings in text columns become plain LF, matching what the
/// downstream graph properties should carry.
fn normalize_newlines(value: &mut Value) {
    if let Value::String(s) = value {
        if s.contains("\r\n") {
            *value = Value::String(s.replace("\r\n", "\n"));
        }
    }
}
