// SPDX-License-Identifier: Apache-2.0

//! Relationship entries as stored in table metadata
//!
//! Local relationships are configured either by a foreign-key constraint or
//! by a manual column mapping. Remote relationships come in three shapes:
//! the current remote-schema form, the legacy remote-schema form, and the
//! cross-source form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::table::Table;

/// Column on the source table -> column on the target table
pub type ColumnMapping = BTreeMap<String, String>;

/// Object or array cardinality, as written in metadata (`"object"`, `"array"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Object,
    Array,
}

/// When related rows are inserted relative to the parent row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionOrder {
    BeforeParent,
    AfterParent,
}

/// Hand-written column mapping to another table of the same source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualConfiguration {
    pub remote_table: Table,
    pub column_mapping: ColumnMapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insertion_order: Option<InsertionOrder>,
}

/// Foreign-key constraint declared on the remote table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteTableConstraint {
    Columns { table: Table, columns: Vec<String> },
    /// Single-column form kept by older metadata
    Column { table: Table, column: String },
}

impl RemoteTableConstraint {
    pub fn table(&self) -> &Table {
        match self {
            RemoteTableConstraint::Columns { table, .. }
            | RemoteTableConstraint::Column { table, .. } => table,
        }
    }

    pub fn columns(&self) -> &[String] {
        match self {
            RemoteTableConstraint::Columns { columns, .. } => columns,
            RemoteTableConstraint::Column { column, .. } => std::slice::from_ref(column),
        }
    }
}

/// Foreign-key constraint backing an object relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectConstraint {
    /// Constraint column on the table itself
    Column(String),
    /// Composite constraint on the table itself
    Columns(Vec<String>),
    /// Constraint on the remote table pointing back at this one
    RemoteTable(RemoteTableConstraint),
}

/// How an array relationship is configured
///
/// Anything without a readable `manual_configuration` is a foreign-key
/// relationship; a constraint that cannot be read is kept as `Unresolved`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrayRelationshipUsing {
    ManualConfiguration {
        manual_configuration: ManualConfiguration,
    },
    ForeignKeyConstraintOn {
        foreign_key_constraint_on: RemoteTableConstraint,
    },
    Unresolved(Value),
}

impl Default for ArrayRelationshipUsing {
    fn default() -> Self {
        Self::Unresolved(Value::Null)
    }
}

/// How an object relationship is configured; same fallback as arrays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectRelationshipUsing {
    ManualConfiguration {
        manual_configuration: ManualConfiguration,
    },
    ForeignKeyConstraintOn {
        foreign_key_constraint_on: ObjectConstraint,
    },
    Unresolved(Value),
}

impl Default for ObjectRelationshipUsing {
    fn default() -> Self {
        Self::Unresolved(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayRelationship {
    pub name: String,
    #[serde(default)]
    pub using: ArrayRelationshipUsing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ArrayRelationship {
    pub fn manual(name: impl Into<String>, remote_table: Table, column_mapping: ColumnMapping) -> Self {
        Self {
            name: name.into(),
            using: ArrayRelationshipUsing::ManualConfiguration {
                manual_configuration: ManualConfiguration {
                    remote_table,
                    column_mapping,
                    insertion_order: None,
                },
            },
            comment: None,
        }
    }

    pub fn foreign_key(name: impl Into<String>, table: Table, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            using: ArrayRelationshipUsing::ForeignKeyConstraintOn {
                foreign_key_constraint_on: RemoteTableConstraint::Columns { table, columns },
            },
            comment: None,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.using, ArrayRelationshipUsing::ManualConfiguration { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRelationship {
    pub name: String,
    #[serde(default)]
    pub using: ObjectRelationshipUsing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ObjectRelationship {
    pub fn manual(name: impl Into<String>, remote_table: Table, column_mapping: ColumnMapping) -> Self {
        Self {
            name: name.into(),
            using: ObjectRelationshipUsing::ManualConfiguration {
                manual_configuration: ManualConfiguration {
                    remote_table,
                    column_mapping,
                    insertion_order: None,
                },
            },
            comment: None,
        }
    }

    pub fn foreign_key(name: impl Into<String>, constraint: ObjectConstraint) -> Self {
        Self {
            name: name.into(),
            using: ObjectRelationshipUsing::ForeignKeyConstraintOn {
                foreign_key_constraint_on: constraint,
            },
            comment: None,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.using, ObjectRelationshipUsing::ManualConfiguration { .. })
    }
}

/// Selection path into a remote schema: `field -> { arguments, field? }`
pub type RemoteField = BTreeMap<String, RemoteFieldArguments>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RemoteFieldArguments {
    #[serde(default)]
    pub arguments: serde_json::Map<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<RemoteField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToRemoteSchema {
    pub remote_schema: String,
    pub lhs_fields: Vec<String>,
    pub remote_field: RemoteField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyRemoteSchema {
    pub remote_schema: String,
    pub hasura_fields: Vec<String>,
    pub remote_field: RemoteField,
}

/// Cross-source target; keys missing from stored metadata stay empty
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToSource {
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_type: Option<RelationshipKind>,
    #[serde(default)]
    pub field_mapping: ColumnMapping,
}

/// Remote relationship definition
///
/// Variant order is the classification priority: a definition carrying
/// `to_remote_schema` is the current form even if legacy keys are present.
/// A definition matching neither remote-schema form is read as a cross-source
/// relationship; `Unrecognized` keeps the raw value when even that fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteRelationshipDefinition {
    RemoteSchema { to_remote_schema: ToRemoteSchema },
    LegacyRemoteSchema(LegacyRemoteSchema),
    RemoteSource { to_source: ToSource },
    Unrecognized(Value),
}

impl RemoteRelationshipDefinition {
    /// The cross-source target this definition falls back to
    ///
    /// `None` for the remote-schema forms. An unrecognized definition yields
    /// whatever its `to_source` key carries, or an empty target.
    pub fn to_source(&self) -> Option<ToSource> {
        match self {
            Self::RemoteSchema { .. } | Self::LegacyRemoteSchema(_) => None,
            Self::RemoteSource { to_source } => Some(to_source.clone()),
            Self::Unrecognized(value) => Some(
                value
                    .get("to_source")
                    .cloned()
                    .and_then(|to_source| serde_json::from_value(to_source).ok())
                    .unwrap_or_default(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRelationship {
    pub name: String,
    #[serde(default = "unrecognized_definition")]
    pub definition: RemoteRelationshipDefinition,
}

fn unrecognized_definition() -> RemoteRelationshipDefinition {
    RemoteRelationshipDefinition::Unrecognized(Value::Null)
}

impl RemoteRelationship {
    pub fn is_remote_schema(&self) -> bool {
        matches!(self.definition, RemoteRelationshipDefinition::RemoteSchema { .. })
    }

    pub fn is_legacy_remote_schema(&self) -> bool {
        matches!(self.definition, RemoteRelationshipDefinition::LegacyRemoteSchema(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> serde_json::Value {
        json!({"name": "users", "schema": "public"})
    }

    #[test]
    fn array_relationship_using_is_externally_tagged() {
        let manual: ArrayRelationship = serde_json::from_value(json!({
            "name": "orders",
            "using": {"manual_configuration": {
                "remote_table": {"name": "orders", "schema": "public"},
                "column_mapping": {"id": "user_id"}
            }}
        }))
        .expect("should parse");
        assert!(manual.is_manual());

        let fk: ArrayRelationship = serde_json::from_value(json!({
            "name": "orders",
            "using": {"foreign_key_constraint_on": {
                "table": {"name": "orders", "schema": "public"},
                "column": "user_id"
            }}
        }))
        .expect("should parse");
        assert!(!fk.is_manual());
        match fk.using {
            ArrayRelationshipUsing::ForeignKeyConstraintOn {
                foreign_key_constraint_on: constraint,
            } => {
                assert_eq!(constraint.columns(), ["user_id".to_string()]);
                assert_eq!(constraint.table(), &Table::qualified("public", "orders"));
            }
            other => panic!("unexpected using: {other:?}"),
        }
    }

    #[test]
    fn object_constraint_accepts_all_shapes() {
        let single: ObjectConstraint = serde_json::from_value(json!("user_id")).expect("should parse");
        assert_eq!(single, ObjectConstraint::Column("user_id".into()));

        let composite: ObjectConstraint =
            serde_json::from_value(json!(["a", "b"])).expect("should parse");
        assert_eq!(composite, ObjectConstraint::Columns(vec!["a".into(), "b".into()]));

        let remote: ObjectConstraint =
            serde_json::from_value(json!({"table": users(), "columns": ["profile_id"]}))
                .expect("should parse");
        assert!(matches!(remote, ObjectConstraint::RemoteTable(_)));
    }

    #[test]
    fn current_remote_schema_form_wins_over_legacy_keys() {
        let relationship: RemoteRelationship = serde_json::from_value(json!({
            "name": "profile",
            "definition": {
                "to_remote_schema": {
                    "remote_schema": "accounts",
                    "lhs_fields": ["id"],
                    "remote_field": {"user": {"arguments": {"id": "$id"}}}
                },
                "remote_schema": "accounts_old",
                "hasura_fields": ["id"],
                "remote_field": {"user": {"arguments": {}}}
            }
        }))
        .expect("should parse");

        assert!(relationship.is_remote_schema());
        assert!(!relationship.is_legacy_remote_schema());
    }

    #[test]
    fn legacy_and_remote_source_forms_parse() {
        let legacy: RemoteRelationship = serde_json::from_value(json!({
            "name": "profile",
            "definition": {
                "remote_schema": "accounts",
                "hasura_fields": ["id"],
                "remote_field": {"user": {"arguments": {}, "field": {"avatar": {"arguments": {}}}}}
            }
        }))
        .expect("should parse");
        assert!(legacy.is_legacy_remote_schema());

        let remote_source: RemoteRelationship = serde_json::from_value(json!({
            "name": "invoices",
            "definition": {"to_source": {
                "source": "billing",
                "table": {"name": "invoices", "schema": "public"},
                "relationship_type": "array",
                "field_mapping": {"id": "customer_id"}
            }}
        }))
        .expect("should parse");
        match remote_source.definition {
            RemoteRelationshipDefinition::RemoteSource { to_source } => {
                assert_eq!(to_source.relationship_type, Some(RelationshipKind::Array));
                assert_eq!(to_source.source, "billing");
            }
            other => panic!("unexpected definition: {other:?}"),
        }
    }

    #[test]
    fn unknown_remote_definition_falls_back_to_cross_source() {
        let relationship: RemoteRelationship = serde_json::from_value(json!({
            "name": "mystery",
            "definition": {"to_somewhere": {}}
        }))
        .expect("should parse");

        assert!(matches!(
            relationship.definition,
            RemoteRelationshipDefinition::Unrecognized(_)
        ));
        assert_eq!(relationship.definition.to_source(), Some(ToSource::default()));
    }

    #[test]
    fn partial_to_source_keeps_known_keys() {
        let relationship: RemoteRelationship = serde_json::from_value(json!({
            "name": "invoices",
            "definition": {"to_source": {"source": "billing"}}
        }))
        .expect("should parse");

        let to_source = relationship.definition.to_source().expect("cross-source");
        assert_eq!(to_source.source, "billing");
        assert_eq!(to_source.table, None);
        assert!(to_source.field_mapping.is_empty());
    }

    #[test]
    fn unreadable_using_is_kept_as_unresolved() {
        let array: ArrayRelationship = serde_json::from_value(json!({
            "name": "orders",
            "using": {"foreign_key_constraint_on": 42}
        }))
        .expect("should parse");
        assert!(!array.is_manual());
        assert!(matches!(array.using, ArrayRelationshipUsing::Unresolved(_)));

        let object: ObjectRelationship =
            serde_json::from_value(json!({"name": "owner"})).expect("should parse");
        assert_eq!(object.using, ObjectRelationshipUsing::Unresolved(Value::Null));
    }
}
