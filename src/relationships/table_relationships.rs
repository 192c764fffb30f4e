// SPDX-License-Identifier: Apache-2.0

//! Normalization of a table's relationships into one ordered list

use dbconsole_metadata::{
    ArrayRelationshipUsing, MetadataTable, ObjectRelationshipUsing, RemoteRelationshipDefinition,
};

use super::adapt::{
    adapt_fk_array_relationship, adapt_fk_object_relationship,
    adapt_legacy_remote_schema_relationship, adapt_manual_array_relationship,
    adapt_manual_object_relationship, adapt_remote_database_relationship,
    adapt_remote_schema_relationship, adapt_unresolved_fk_relationship, RelationshipSource,
};
use super::types::{Relationship, RelationshipType, SuggestedRelationship};

/// Lists every relationship defined on `metadata_table`
///
/// Array relationships come first, then object relationships, then remote
/// relationships, each group in metadata order. An untracked table (`None`)
/// has no relationships. Foreign-key backed entries resolve their columns
/// against `suggested`. Entries are never dropped: a local entry that is not
/// manual is a foreign-key relationship, and a remote entry of neither
/// remote-schema form is a cross-source relationship.
pub fn table_relationships(
    metadata_table: Option<&MetadataTable>,
    data_source_name: &str,
    suggested: &[SuggestedRelationship],
) -> Vec<Relationship> {
    let Some(metadata_table) = metadata_table else {
        return Vec::new();
    };
    let source = RelationshipSource::new(&metadata_table.table, data_source_name);

    let local_array = metadata_table
        .array_relationships
        .iter()
        .map(|relationship| match &relationship.using {
            ArrayRelationshipUsing::ManualConfiguration {
                manual_configuration,
            } => adapt_manual_array_relationship(&source, &relationship.name, manual_configuration),
            ArrayRelationshipUsing::ForeignKeyConstraintOn {
                foreign_key_constraint_on,
            } => adapt_fk_array_relationship(
                &source,
                &relationship.name,
                foreign_key_constraint_on,
                suggested,
            ),
            ArrayRelationshipUsing::Unresolved(_) => {
                adapt_unresolved_fk_relationship(&source, &relationship.name, RelationshipType::Array)
            }
        })
        .map(Relationship::LocalRelationship);

    let local_object = metadata_table
        .object_relationships
        .iter()
        .map(|relationship| match &relationship.using {
            ObjectRelationshipUsing::ManualConfiguration {
                manual_configuration,
            } => adapt_manual_object_relationship(&source, &relationship.name, manual_configuration),
            ObjectRelationshipUsing::ForeignKeyConstraintOn {
                foreign_key_constraint_on,
            } => adapt_fk_object_relationship(
                &source,
                &relationship.name,
                foreign_key_constraint_on,
                suggested,
            ),
            ObjectRelationshipUsing::Unresolved(_) => {
                adapt_unresolved_fk_relationship(&source, &relationship.name, RelationshipType::Object)
            }
        })
        .map(Relationship::LocalRelationship);

    let remote = metadata_table
        .remote_relationships
        .iter()
        .map(|relationship| match &relationship.definition {
            RemoteRelationshipDefinition::RemoteSchema { to_remote_schema } => {
                Relationship::RemoteSchemaRelationship(adapt_remote_schema_relationship(
                    &source,
                    &relationship.name,
                    to_remote_schema,
                ))
            }
            RemoteRelationshipDefinition::LegacyRemoteSchema(legacy) => {
                Relationship::RemoteSchemaRelationship(adapt_legacy_remote_schema_relationship(
                    &source,
                    &relationship.name,
                    legacy,
                ))
            }
            RemoteRelationshipDefinition::RemoteSource { to_source } => {
                Relationship::RemoteDatabaseRelationship(adapt_remote_database_relationship(
                    &source,
                    &relationship.name,
                    to_source,
                ))
            }
            RemoteRelationshipDefinition::Unrecognized(_) => {
                tracing::warn!(
                    relationship = %relationship.name,
                    table = %metadata_table.table,
                    "Unrecognized remote relationship, reading it as cross-source"
                );
                let to_source = relationship.definition.to_source().unwrap_or_default();
                Relationship::RemoteDatabaseRelationship(adapt_remote_database_relationship(
                    &source,
                    &relationship.name,
                    &to_source,
                ))
            }
        });

    let relationships: Vec<Relationship> = local_array.chain(local_object).chain(remote).collect();
    tracing::debug!(
        table = %metadata_table.table,
        source = data_source_name,
        count = relationships.len(),
        "Normalized table relationships"
    );
    relationships
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::types::{RelationshipOrigin, RelationshipType};
    use dbconsole_metadata::{ArrayRelationship, ObjectConstraint, ObjectRelationship, Table};

    fn users() -> MetadataTable {
        MetadataTable::new(Table::qualified("public", "users"))
    }

    fn mapping(pairs: &[(&str, &str)]) -> dbconsole_metadata::ColumnMapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn absent_table_yields_no_relationships() {
        assert!(table_relationships(None, "default", &[]).is_empty());
    }

    #[test]
    fn array_relationships_keep_input_order() {
        let mut table = users();
        for name in ["c", "a", "b"] {
            table.array_relationships.push(ArrayRelationship::manual(
                name,
                Table::qualified("public", name),
                mapping(&[("id", "user_id")]),
            ));
        }

        let relationships = table_relationships(Some(&table), "default", &[]);

        let names: Vec<&str> = relationships.iter().map(Relationship::name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn manual_and_fk_entries_route_to_their_adapters() {
        let mut table = users();
        table.array_relationships.push(ArrayRelationship::manual(
            "manual_orders",
            Table::qualified("public", "orders"),
            mapping(&[("id", "user_id")]),
        ));
        table.array_relationships.push(ArrayRelationship::foreign_key(
            "fk_orders",
            Table::qualified("public", "orders"),
            vec!["user_id".into()],
        ));
        table.object_relationships.push(ObjectRelationship::foreign_key(
            "org",
            ObjectConstraint::Column("org_id".into()),
        ));

        let relationships = table_relationships(Some(&table), "default", &[]);

        let origins: Vec<(RelationshipType, RelationshipOrigin)> = relationships
            .iter()
            .filter_map(Relationship::as_local)
            .map(|r| (r.relationship_type, r.origin))
            .collect();
        assert_eq!(
            origins,
            vec![
                (RelationshipType::Array, RelationshipOrigin::Manual),
                (RelationshipType::Array, RelationshipOrigin::ForeignKey),
                (RelationshipType::Object, RelationshipOrigin::ForeignKey),
            ]
        );
    }

    #[test]
    fn normalizing_twice_gives_equal_output() {
        let mut table = users();
        table.object_relationships.push(ObjectRelationship::manual(
            "profile",
            Table::qualified("public", "profiles"),
            mapping(&[("id", "user_id")]),
        ));

        let first = table_relationships(Some(&table), "default", &[]);
        let second = table_relationships(Some(&table), "default", &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn unreadable_entries_fall_back_instead_of_disappearing() {
        let table = MetadataTable::from_value(serde_json::json!({
            "table": {"name": "users", "schema": "public"},
            "array_relationships": [{"name": "orders", "using": {"foreign_key_constraint_on": 42}}],
            "object_relationships": [{"name": "owner", "using": {}}],
            "remote_relationships": [{"name": "lambda", "definition": {"to_lambda": {}}}]
        }))
        .expect("should parse");

        let relationships = table_relationships(Some(&table), "default", &[]);

        assert_eq!(relationships.len(), 3);
        let local: Vec<(RelationshipType, RelationshipOrigin)> = relationships
            .iter()
            .filter_map(Relationship::as_local)
            .map(|r| (r.relationship_type, r.origin))
            .collect();
        assert_eq!(
            local,
            vec![
                (RelationshipType::Array, RelationshipOrigin::ForeignKey),
                (RelationshipType::Object, RelationshipOrigin::ForeignKey),
            ]
        );
        match &relationships[2] {
            Relationship::RemoteDatabaseRelationship(r) => {
                assert_eq!(r.name, "lambda");
                assert_eq!(r.definition.to_source, "");
                assert!(r.definition.mapping.is_empty());
            }
            other => panic!("unexpected relationship: {other:?}"),
        }
    }
}
