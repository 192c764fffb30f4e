// SPDX-License-Identifier: Apache-2.0

//! Table identities and per-table metadata records

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MetadataError, MetadataResult};
use crate::relationships::{ArrayRelationship, ObjectRelationship, RemoteRelationship};

/// Backend-specific table identity
///
/// Each backend addresses tables differently, so the identity is kept in the
/// shape the metadata stores it in and compared structurally.
// Sequence shapes come first: untagged struct variants also accept sequences.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Table {
    /// Data connectors address tables by path, e.g. `["Chinook", "Album"]`
    Path(Vec<String>),
    /// Bare table name
    Name(String),
    /// Postgres family: `{ "name": "users", "schema": "public" }`
    Qualified { name: String, schema: String },
    /// BigQuery: `{ "name": "users", "dataset": "analytics" }`
    Dataset { name: String, dataset: String },
}

impl Table {
    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Qualified {
            name: name.into(),
            schema: schema.into(),
        }
    }

    /// The unqualified table name, if the identity has one
    pub fn name(&self) -> Option<&str> {
        match self {
            Table::Qualified { name, .. } | Table::Dataset { name, .. } | Table::Name(name) => {
                Some(name)
            }
            Table::Path(path) => path.last().map(String::as_str),
        }
    }

    /// The schema (or dataset) the table lives in
    pub fn schema(&self) -> Option<&str> {
        match self {
            Table::Qualified { schema, .. } => Some(schema),
            Table::Dataset { dataset, .. } => Some(dataset),
            Table::Path(path) if path.len() > 1 => path.first().map(String::as_str),
            Table::Path(_) | Table::Name(_) => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Qualified { name, schema } => write!(f, "{}.{}", schema, name),
            Table::Dataset { name, dataset } => write!(f, "{}.{}", dataset, name),
            Table::Path(path) => write!(f, "{}", path.join(".")),
            Table::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Metadata stored for one tracked table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataTable {
    pub table: Table,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub array_relationships: Vec<ArrayRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_relationships: Vec<ObjectRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remote_relationships: Vec<RemoteRelationship>,
}

impl MetadataTable {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            array_relationships: Vec::new(),
            object_relationships: Vec::new(),
            remote_relationships: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> MetadataResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parses a table record, naming the table in the error when it fails
    pub fn from_value(value: Value) -> MetadataResult<Self> {
        let table = value
            .get("table")
            .map(Value::to_string)
            .unwrap_or_else(|| "<unknown>".to_string());
        serde_json::from_value(value).map_err(|e| MetadataError::invalid_table(table, e))
    }

    /// Total number of relationship entries across all three collections
    pub fn relationship_count(&self) -> usize {
        self.array_relationships.len()
            + self.object_relationships.len()
            + self.remote_relationships.len()
    }
}

/// Metadata for one data source and its tracked tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataSource {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub tables: Vec<MetadataTable>,
}

#[derive(Deserialize)]
struct SourceHeader {
    name: String,
    kind: String,
}

impl MetadataSource {
    pub fn from_json(json: &str) -> MetadataResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parses a source record table by table so a bad entry names its table
    pub fn from_value(mut value: Value) -> MetadataResult<Self> {
        let source_name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();
        let tables = value.as_object_mut().and_then(|obj| obj.remove("tables"));

        let header: SourceHeader = serde_json::from_value(value)
            .map_err(|e| MetadataError::invalid_source(&source_name, e))?;

        let tables = match tables {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(MetadataTable::from_value)
                .collect::<MetadataResult<Vec<_>>>()?,
            Some(_) => {
                return Err(MetadataError::invalid_source(
                    source_name,
                    <serde_json::Error as serde::de::Error>::custom("`tables` must be an array"),
                ))
            }
        };

        Ok(Self {
            name: header.name,
            kind: header.kind,
            tables,
        })
    }

    /// Looks up a tracked table; untracked tables yield `None`
    pub fn find_table(&self, table: &Table) -> Option<&MetadataTable> {
        self.tables.iter().find(|t| &t.table == table)
    }
}
