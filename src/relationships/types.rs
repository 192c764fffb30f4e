// SPDX-License-Identifier: Apache-2.0

//! Normalized relationship descriptors
//!
//! Whatever shape a relationship has in metadata, the console lists and edits
//! it through one of these variants.

use serde::{Deserialize, Serialize};

use dbconsole_metadata::{ColumnMapping, RelationshipKind, RemoteField, Table};

/// Cardinality as shown by the console (`"Object"`, `"Array"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipType {
    Object,
    Array,
}

impl From<RelationshipKind> for RelationshipType {
    fn from(kind: RelationshipKind) -> Self {
        match kind {
            RelationshipKind::Object => RelationshipType::Object,
            RelationshipKind::Array => RelationshipType::Array,
        }
    }
}

/// How a local relationship is configured in metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipOrigin {
    Manual,
    ForeignKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Relationship {
    LocalRelationship(LocalRelationship),
    RemoteSchemaRelationship(RemoteSchemaRelationship),
    RemoteDatabaseRelationship(RemoteDatabaseRelationship),
}

impl Relationship {
    pub fn name(&self) -> &str {
        match self {
            Relationship::LocalRelationship(r) => &r.name,
            Relationship::RemoteSchemaRelationship(r) => &r.name,
            Relationship::RemoteDatabaseRelationship(r) => &r.name,
        }
    }

    pub fn from_source(&self) -> &str {
        match self {
            Relationship::LocalRelationship(r) => &r.from_source,
            Relationship::RemoteSchemaRelationship(r) => &r.from_source,
            Relationship::RemoteDatabaseRelationship(r) => &r.from_source,
        }
    }

    pub fn from_table(&self) -> &Table {
        match self {
            Relationship::LocalRelationship(r) => &r.from_table,
            Relationship::RemoteSchemaRelationship(r) => &r.from_table,
            Relationship::RemoteDatabaseRelationship(r) => &r.from_table,
        }
    }

    pub fn as_local(&self) -> Option<&LocalRelationship> {
        match self {
            Relationship::LocalRelationship(r) => Some(r),
            _ => None,
        }
    }
}

/// Relationship between two tables of the same source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalRelationship {
    pub name: String,
    pub from_source: String,
    pub from_table: Table,
    pub relationship_type: RelationshipType,
    pub origin: RelationshipOrigin,
    pub definition: LocalRelationshipDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalRelationshipDefinition {
    /// Unknown when a same-table constraint has no matching suggestion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_table: Option<Table>,
    pub mapping: ColumnMapping,
}

/// Relationship from a table to a field of a remote GraphQL schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSchemaRelationship {
    pub name: String,
    pub from_source: String,
    pub from_table: Table,
    pub definition: RemoteSchemaRelationshipDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteSchemaRelationshipDefinition {
    pub to_remote_schema: String,
    #[serde(rename = "lhs_fields")]
    pub lhs_fields: Vec<String>,
    #[serde(rename = "remote_field")]
    pub remote_field: RemoteField,
}

/// Relationship from a table to a table of another source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDatabaseRelationship {
    pub name: String,
    pub from_source: String,
    pub from_table: Table,
    /// Absent when the stored definition does not say
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<RelationshipType>,
    pub definition: RemoteDatabaseRelationshipDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDatabaseRelationshipDefinition {
    pub to_source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_table: Option<Table>,
    pub mapping: ColumnMapping,
}

/// Candidate relationship inferred from a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedRelationship {
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub from: SuggestedRelationshipEnd,
    pub to: SuggestedRelationshipEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedRelationshipEnd {
    pub table: Table,
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
}

impl SuggestedRelationship {
    /// Pairs `from.columns` with `to.columns` positionally
    pub fn mapping(&self) -> ColumnMapping {
        self.from
            .columns
            .iter()
            .cloned()
            .zip(self.to.columns.iter().cloned())
            .collect()
    }
}
