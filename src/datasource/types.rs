// SPDX-License-Identifier: Apache-2.0

//! Data types exchanged with data source adapters and SQL clients

use serde::{Deserialize, Serialize};

use dbconsole_metadata::Table;

/// Release stage of a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseType {
    #[serde(rename = "GA")]
    Ga,
    Beta,
    Alpha,
    Disabled,
}

/// Driver metadata exposed to the console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverInfo {
    pub name: String,
    pub display_name: String,
    pub release: ReleaseType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MutationCapabilities {
    pub insert: bool,
    pub update: bool,
    pub delete: bool,
}

/// Reported capabilities for a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DriverCapabilities {
    pub queries: bool,
    pub mutations: MutationCapabilities,
    pub relationships: bool,
    pub data_schema: bool,
    pub subscriptions: bool,
    pub explain: bool,
}

/// A table the source could start tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectedTable {
    /// Display name, `schema.table`
    pub name: String,
    pub table: Table,
    /// `BASE TABLE`, `VIEW`, ...
    #[serde(rename = "type")]
    pub table_type: String,
}

/// Column metadata for a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub default_value: Option<String>,
    pub is_primary_key: bool,
}

/// One side of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyEnd {
    pub table: Table,
    #[serde(alias = "column")]
    pub columns: Vec<String>,
}

/// Foreign key between two tables of a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRelationship {
    pub from: ForeignKeyEnd,
    pub to: ForeignKeyEnd,
    pub constraint_name: Option<String>,
}

/// The source a SQL statement is run against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub name: String,
    pub kind: String,
}

impl SourceRef {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSqlRequest {
    pub source: SourceRef,
    pub sql: String,
    pub read_only: bool,
}

impl RunSqlRequest {
    pub fn read_only(source: SourceRef, sql: impl Into<String>) -> Self {
        Self {
            source,
            sql: sql.into(),
            read_only: true,
        }
    }
}

/// Tabular SQL result: the first row is the header, every cell is text
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSqlResponse {
    pub result_type: String,
    pub result: Option<Vec<Vec<Option<String>>>>,
}

impl RunSqlResponse {
    pub const TUPLES_OK: &'static str = "TuplesOk";
    pub const COMMAND_OK: &'static str = "CommandOk";

    pub fn tuples(result: Vec<Vec<Option<String>>>) -> Self {
        Self {
            result_type: Self::TUPLES_OK.to_string(),
            result: Some(result),
        }
    }

    /// Data rows, without the header
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        match &self.result {
            Some(rows) if !rows.is_empty() => &rows[1..],
            _ => &[],
        }
    }
}

/// Text of a cell, `None` for SQL NULL or a missing column
pub fn cell(row: &[Option<String>], idx: usize) -> Option<&str> {
    row.get(idx).and_then(|value| value.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn rows_skip_the_header() {
        let response = RunSqlResponse::tuples(vec![text(&["version"]), text(&["CockroachDB v23.1"])]);
        assert_eq!(response.rows().len(), 1);
        assert_eq!(cell(&response.rows()[0], 0), Some("CockroachDB v23.1"));
        assert_eq!(cell(&response.rows()[0], 3), None);
    }

    #[test]
    fn empty_or_missing_result_has_no_rows() {
        assert!(RunSqlResponse::default().rows().is_empty());
        assert!(RunSqlResponse::tuples(vec![]).rows().is_empty());
    }

    #[test]
    fn driver_info_serializes_release_as_ga() {
        let info = DriverInfo {
            name: "cockroach".into(),
            display_name: "CockroachDB".into(),
            release: ReleaseType::Ga,
        };
        assert_eq!(
            serde_json::to_value(&info).expect("should serialize"),
            serde_json::json!({"name": "cockroach", "displayName": "CockroachDB", "release": "GA"})
        );
    }
}
