// SPDX-License-Identifier: Apache-2.0

//! Helpers shared by SQL-backed data sources

use dbconsole_metadata::Table;

use crate::datasource::error::{DataSourceError, DataSourceResult};
use crate::datasource::types::{
    cell, DriverCapabilities, IntrospectedTable, MutationCapabilities, RunSqlResponse,
};

/// Capabilities of Postgres-compatible backends
pub fn postgres_capabilities() -> DriverCapabilities {
    DriverCapabilities {
        queries: true,
        mutations: MutationCapabilities {
            insert: true,
            update: true,
            delete: true,
        },
        relationships: true,
        data_schema: true,
        subscriptions: true,
        explain: true,
    }
}

/// Adapts `(table_name, table_schema, table_type)` rows into trackable tables
pub fn adapt_introspected_tables(response: &RunSqlResponse) -> Vec<IntrospectedTable> {
    response
        .rows()
        .iter()
        .filter_map(|row| {
            let name = cell(row, 0)?;
            let schema = cell(row, 1)?;
            Some(IntrospectedTable {
                name: format!("{}.{}", schema, name),
                table: Table::qualified(schema, name),
                table_type: cell(row, 2).unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Splits a table identity into `(schema, name)` for Postgres-family SQL
pub fn schema_and_name(table: &Table) -> DataSourceResult<(&str, &str)> {
    match table {
        Table::Qualified { name, schema } => Ok((schema.as_str(), name.as_str())),
        Table::Name(name) => Ok(("public", name.as_str())),
        other => Err(DataSourceError::validation(format!(
            "Table {} is not a schema-qualified table",
            other
        ))),
    }
}

/// Quotes a value as a SQL string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Postgres text encoding of booleans
pub fn parse_bool(value: Option<&str>) -> bool {
    matches!(value, Some("t" | "true" | "TRUE" | "YES" | "yes"))
}
