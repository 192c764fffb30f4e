// SPDX-License-Identifier: Apache-2.0

//! SQL runner over a Postgres-wire connection pool
//!
//! Statements go through the simple query protocol, so the server returns
//! every value in text form, matching the `RunSqlResponse` cell format.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions, PgRow, PgValueFormat};
use sqlx::{Column, Executor, Row, ValueRef};

use crate::config::ConsoleConfig;
use crate::datasource::error::{DataSourceError, DataSourceResult};
use crate::datasource::traits::SqlRunner;
use crate::datasource::types::{RunSqlRequest, RunSqlResponse};

pub struct PgSqlRunner {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PgSqlRunner {
    pub fn new(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    /// Connects to `config.database_url` with the configured pool limits
    pub async fn connect(config: &ConsoleConfig) -> DataSourceResult<Self> {
        let url = config
            .database_url
            .as_ref()
            .ok_or_else(|| DataSourceError::validation("DBCONSOLE_DATABASE_URL is not set"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_max_connections.max(1))
            .acquire_timeout(config.acquire_timeout())
            .connect(url.expose())
            .await
            .map_err(|e| DataSourceError::connection_failed(e.to_string()))?;

        tracing::info!(
            url = %url.redacted_url(),
            max_connections = config.pool_max_connections,
            "Connected SQL runner pool"
        );
        Ok(Self::new(pool, config.statement_timeout()))
    }

    async fn execute(&self, request: &RunSqlRequest) -> DataSourceResult<Vec<PgRow>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DataSourceError::connection_failed(e.to_string()))?;

        if request.read_only {
            sqlx::query("SET TRANSACTION READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(|e| DataSourceError::execution_error(e.to_string()))?;
        }

        let conn: &mut PgConnection = &mut tx;
        let rows = conn
            .fetch_all(sqlx::raw_sql(&request.sql))
            .await
            .map_err(|e| DataSourceError::execution_error(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| DataSourceError::execution_error(e.to_string()))?;
        Ok(rows)
    }

    /// Column names of a statement that returned no rows
    ///
    /// Described on its own pool connection, outside the statement's
    /// transaction. Statements that cannot be prepared (e.g. several
    /// statements in one string) report no columns.
    async fn describe_columns(&self, sql: &str) -> Vec<String> {
        match (&self.pool).describe(sql).await {
            Ok(describe) => describe
                .columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect(),
            Err(e) => {
                tracing::debug!(error = %e, "Could not describe statement columns");
                Vec::new()
            }
        }
    }
}

/// Text cells of every row
fn rows_to_cells(rows: &[PgRow]) -> DataSourceResult<Vec<Vec<Option<String>>>> {
    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = Vec::with_capacity(row.len());
        for idx in 0..row.len() {
            let raw = row
                .try_get_raw(idx)
                .map_err(|e| DataSourceError::unexpected_result(e.to_string()))?;
            if raw.is_null() {
                cells.push(None);
                continue;
            }
            match raw.format() {
                PgValueFormat::Text => {
                    let text = raw
                        .as_str()
                        .map_err(|e| DataSourceError::unexpected_result(e.to_string()))?;
                    cells.push(Some(text.to_string()));
                }
                PgValueFormat::Binary => {
                    return Err(DataSourceError::unexpected_result(format!(
                        "column {} returned a binary value",
                        idx
                    )))
                }
            }
        }
        result.push(cells);
    }
    Ok(result)
}

/// `TuplesOk` with a header row whenever the statement has columns, even
/// with no data rows; `CommandOk` otherwise
fn build_response(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> RunSqlResponse {
    if columns.is_empty() {
        return RunSqlResponse {
            result_type: RunSqlResponse::COMMAND_OK.to_string(),
            result: None,
        };
    }

    let mut result = Vec::with_capacity(rows.len() + 1);
    result.push(columns.into_iter().map(Some).collect());
    result.extend(rows);
    RunSqlResponse::tuples(result)
}

#[async_trait]
impl SqlRunner for PgSqlRunner {
    async fn run_sql(&self, request: RunSqlRequest) -> DataSourceResult<RunSqlResponse> {
        let start = Instant::now();
        let rows = tokio::time::timeout(self.statement_timeout, self.execute(&request))
            .await
            .map_err(|_| {
                DataSourceError::execution_error(format!(
                    "statement timed out after {}ms",
                    self.statement_timeout.as_millis()
                ))
            })??;

        let columns = match rows.first() {
            Some(first) => first
                .columns()
                .iter()
                .map(|column| column.name().to_string())
                .collect(),
            None => self.describe_columns(&request.sql).await,
        };
        let response = build_response(columns, rows_to_cells(&rows)?);

        tracing::info!(
            source = %request.source.name,
            kind = %request.source.kind,
            read_only = request.read_only,
            rows = rows.len(),
            result_type = %response.result_type,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Ran SQL"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_without_rows_keeps_its_header() {
        let response = build_response(vec!["id".into(), "email".into()], Vec::new());

        assert_eq!(response.result_type, RunSqlResponse::TUPLES_OK);
        assert_eq!(
            response.result,
            Some(vec![vec![Some("id".to_string()), Some("email".to_string())]])
        );
        assert!(response.rows().is_empty());
    }

    #[test]
    fn rows_follow_the_header() {
        let response = build_response(
            vec!["id".into()],
            vec![vec![Some("1".into())], vec![None]],
        );

        assert_eq!(response.rows(), &[vec![Some("1".to_string())], vec![None]]);
    }

    #[test]
    fn statement_without_columns_is_command_ok() {
        let response = build_response(Vec::new(), Vec::new());

        assert_eq!(response.result_type, RunSqlResponse::COMMAND_OK);
        assert_eq!(response.result, None);
    }
}
