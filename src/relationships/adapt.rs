// SPDX-License-Identifier: Apache-2.0

//! Adapters from metadata relationship entries to normalized descriptors
//!
//! One adapter per metadata shape. Foreign-key adapters resolve their join
//! columns against the suggested relationships, since the metadata entry
//! only names the constraint columns of one side.

use dbconsole_metadata::{
    ColumnMapping, LegacyRemoteSchema, ManualConfiguration, ObjectConstraint, RelationshipKind,
    RemoteTableConstraint, Table, ToRemoteSchema, ToSource,
};

use super::types::{
    LocalRelationship, LocalRelationshipDefinition, RelationshipOrigin, RelationshipType,
    RemoteDatabaseRelationship, RemoteDatabaseRelationshipDefinition, RemoteSchemaRelationship,
    RemoteSchemaRelationshipDefinition, SuggestedRelationship,
};

/// The table a relationship is defined on and the source it belongs to
#[derive(Debug, Clone, Copy)]
pub struct RelationshipSource<'a> {
    pub table: &'a Table,
    pub data_source_name: &'a str,
}

impl<'a> RelationshipSource<'a> {
    pub fn new(table: &'a Table, data_source_name: &'a str) -> Self {
        Self {
            table,
            data_source_name,
        }
    }

    fn local(
        &self,
        name: &str,
        relationship_type: RelationshipType,
        origin: RelationshipOrigin,
        to_table: Option<Table>,
        mapping: ColumnMapping,
    ) -> LocalRelationship {
        LocalRelationship {
            name: name.to_string(),
            from_source: self.data_source_name.to_string(),
            from_table: self.table.clone(),
            relationship_type,
            origin,
            definition: LocalRelationshipDefinition { to_table, mapping },
        }
    }
}

pub fn adapt_manual_array_relationship(
    source: &RelationshipSource<'_>,
    name: &str,
    config: &ManualConfiguration,
) -> LocalRelationship {
    source.local(
        name,
        RelationshipType::Array,
        RelationshipOrigin::Manual,
        Some(config.remote_table.clone()),
        config.column_mapping.clone(),
    )
}

pub fn adapt_manual_object_relationship(
    source: &RelationshipSource<'_>,
    name: &str,
    config: &ManualConfiguration,
) -> LocalRelationship {
    source.local(
        name,
        RelationshipType::Object,
        RelationshipOrigin::Manual,
        Some(config.remote_table.clone()),
        config.column_mapping.clone(),
    )
}

/// Array relationship backed by a constraint on the remote table
///
/// The mapping comes from the first array suggestion leaving this table for
/// the constraint table whose target columns are the constraint columns. It
/// is empty when no suggestion matches.
pub fn adapt_fk_array_relationship(
    source: &RelationshipSource<'_>,
    name: &str,
    constraint: &RemoteTableConstraint,
    suggested: &[SuggestedRelationship],
) -> LocalRelationship {
    let matching = find_remote_table_suggestion(
        source.table,
        RelationshipKind::Array,
        constraint,
        suggested,
    );
    if matching.is_none() {
        tracing::debug!(
            relationship = name,
            table = %source.table,
            "No suggested relationship matches array foreign key"
        );
    }

    source.local(
        name,
        RelationshipType::Array,
        RelationshipOrigin::ForeignKey,
        Some(constraint.table().clone()),
        matching.map(SuggestedRelationship::mapping).unwrap_or_default(),
    )
}

/// Object relationship backed by a foreign-key constraint
///
/// For a constraint on this table's own columns the target table is only
/// known through the matching suggestion.
pub fn adapt_fk_object_relationship(
    source: &RelationshipSource<'_>,
    name: &str,
    constraint: &ObjectConstraint,
    suggested: &[SuggestedRelationship],
) -> LocalRelationship {
    let (to_table, matching) = match constraint {
        ObjectConstraint::Column(column) => {
            let matching = find_local_column_suggestion(
                source.table,
                std::slice::from_ref(column),
                suggested,
            );
            (matching.map(|s| s.to.table.clone()), matching)
        }
        ObjectConstraint::Columns(columns) => {
            let matching = find_local_column_suggestion(source.table, columns, suggested);
            (matching.map(|s| s.to.table.clone()), matching)
        }
        // Introspection suggests the referenced side of such a key as an
        // array; its columns are the same join read from this table.
        ObjectConstraint::RemoteTable(remote) => (
            Some(remote.table().clone()),
            find_remote_table_suggestion(source.table, RelationshipKind::Object, remote, suggested)
                .or_else(|| {
                    find_remote_table_suggestion(
                        source.table,
                        RelationshipKind::Array,
                        remote,
                        suggested,
                    )
                }),
        ),
    };
    if matching.is_none() {
        tracing::debug!(
            relationship = name,
            table = %source.table,
            "No suggested relationship matches object foreign key"
        );
    }

    source.local(
        name,
        RelationshipType::Object,
        RelationshipOrigin::ForeignKey,
        to_table,
        matching.map(SuggestedRelationship::mapping).unwrap_or_default(),
    )
}

/// Foreign-key relationship whose constraint could not be read
///
/// Target and mapping stay empty; the entry is still listed so the console
/// can show it.
pub fn adapt_unresolved_fk_relationship(
    source: &RelationshipSource<'_>,
    name: &str,
    relationship_type: RelationshipType,
) -> LocalRelationship {
    tracing::warn!(
        relationship = name,
        table = %source.table,
        "Foreign-key relationship has an unreadable constraint"
    );
    source.local(
        name,
        relationship_type,
        RelationshipOrigin::ForeignKey,
        None,
        ColumnMapping::new(),
    )
}

pub fn adapt_remote_schema_relationship(
    source: &RelationshipSource<'_>,
    name: &str,
    definition: &ToRemoteSchema,
) -> RemoteSchemaRelationship {
    RemoteSchemaRelationship {
        name: name.to_string(),
        from_source: source.data_source_name.to_string(),
        from_table: source.table.clone(),
        definition: RemoteSchemaRelationshipDefinition {
            to_remote_schema: definition.remote_schema.clone(),
            lhs_fields: definition.lhs_fields.clone(),
            remote_field: definition.remote_field.clone(),
        },
    }
}

/// Legacy definitions name their join fields `hasura_fields`
pub fn adapt_legacy_remote_schema_relationship(
    source: &RelationshipSource<'_>,
    name: &str,
    definition: &LegacyRemoteSchema,
) -> RemoteSchemaRelationship {
    RemoteSchemaRelationship {
        name: name.to_string(),
        from_source: source.data_source_name.to_string(),
        from_table: source.table.clone(),
        definition: RemoteSchemaRelationshipDefinition {
            to_remote_schema: definition.remote_schema.clone(),
            lhs_fields: definition.hasura_fields.clone(),
            remote_field: definition.remote_field.clone(),
        },
    }
}

pub fn adapt_remote_database_relationship(
    source: &RelationshipSource<'_>,
    name: &str,
    definition: &ToSource,
) -> RemoteDatabaseRelationship {
    RemoteDatabaseRelationship {
        name: name.to_string(),
        from_source: source.data_source_name.to_string(),
        from_table: source.table.clone(),
        relationship_type: definition.relationship_type.map(RelationshipType::from),
        definition: RemoteDatabaseRelationshipDefinition {
            to_source: definition.source.clone(),
            to_table: definition.table.clone(),
            mapping: definition.field_mapping.clone(),
        },
    }
}

fn find_remote_table_suggestion<'s>(
    from_table: &Table,
    kind: RelationshipKind,
    constraint: &RemoteTableConstraint,
    suggested: &'s [SuggestedRelationship],
) -> Option<&'s SuggestedRelationship> {
    suggested.iter().find(|s| {
        s.kind == kind
            && &s.from.table == from_table
            && &s.to.table == constraint.table()
            && s.to.columns == constraint.columns()
    })
}

fn find_local_column_suggestion<'s>(
    from_table: &Table,
    columns: &[String],
    suggested: &'s [SuggestedRelationship],
) -> Option<&'s SuggestedRelationship> {
    suggested.iter().find(|s| {
        s.kind == RelationshipKind::Object && &s.from.table == from_table && s.from.columns == columns
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::types::SuggestedRelationshipEnd;

    fn users() -> Table {
        Table::qualified("public", "users")
    }

    fn orders() -> Table {
        Table::qualified("public", "orders")
    }

    fn end(table: Table, columns: &[&str]) -> SuggestedRelationshipEnd {
        SuggestedRelationshipEnd {
            table,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            constraint_name: None,
        }
    }

    fn suggestion(
        kind: RelationshipKind,
        from: (Table, &[&str]),
        to: (Table, &[&str]),
    ) -> SuggestedRelationship {
        SuggestedRelationship {
            kind,
            from: end(from.0, from.1),
            to: end(to.0, to.1),
        }
    }

    #[test]
    fn fk_array_relationship_takes_mapping_from_matching_suggestion() {
        let table = users();
        let source = RelationshipSource::new(&table, "default");
        let constraint = RemoteTableConstraint::Column {
            table: orders(),
            column: "user_id".into(),
        };
        let suggested = vec![
            // wrong cardinality
            suggestion(RelationshipKind::Object, (users(), &["id"]), (orders(), &["user_id"])),
            suggestion(RelationshipKind::Array, (users(), &["id"]), (orders(), &["user_id"])),
        ];

        let adapted = adapt_fk_array_relationship(&source, "orders", &constraint, &suggested);

        assert_eq!(adapted.relationship_type, RelationshipType::Array);
        assert_eq!(adapted.origin, RelationshipOrigin::ForeignKey);
        assert_eq!(adapted.definition.to_table, Some(orders()));
        assert_eq!(
            adapted.definition.mapping.get("id").map(String::as_str),
            Some("user_id")
        );
    }

    #[test]
    fn fk_array_relationship_without_suggestion_has_empty_mapping() {
        let table = users();
        let source = RelationshipSource::new(&table, "default");
        let constraint = RemoteTableConstraint::Columns {
            table: orders(),
            columns: vec!["user_id".into()],
        };

        let adapted = adapt_fk_array_relationship(&source, "orders", &constraint, &[]);

        assert_eq!(adapted.definition.to_table, Some(orders()));
        assert!(adapted.definition.mapping.is_empty());
    }

    #[test]
    fn fk_object_relationship_resolves_target_from_suggestion() {
        let table = orders();
        let source = RelationshipSource::new(&table, "default");
        let suggested = vec![suggestion(
            RelationshipKind::Object,
            (orders(), &["user_id"]),
            (users(), &["id"]),
        )];

        let adapted = adapt_fk_object_relationship(
            &source,
            "user",
            &ObjectConstraint::Column("user_id".into()),
            &suggested,
        );

        assert_eq!(adapted.definition.to_table, Some(users()));
        assert_eq!(
            adapted.definition.mapping.get("user_id").map(String::as_str),
            Some("id")
        );
    }

    #[test]
    fn fk_object_relationship_without_suggestion_has_unknown_target() {
        let table = orders();
        let source = RelationshipSource::new(&table, "default");

        let adapted = adapt_fk_object_relationship(
            &source,
            "user",
            &ObjectConstraint::Columns(vec!["user_id".into()]),
            &[],
        );

        assert_eq!(adapted.definition.to_table, None);
        assert!(adapted.definition.mapping.is_empty());
    }

    #[test]
    fn fk_object_relationship_on_remote_table_uses_constraint_table() {
        let table = users();
        let source = RelationshipSource::new(&table, "default");
        let profiles = Table::qualified("public", "profiles");
        let suggested = vec![suggestion(
            RelationshipKind::Object,
            (users(), &["id"]),
            (profiles.clone(), &["user_id"]),
        )];
        let constraint = ObjectConstraint::RemoteTable(RemoteTableConstraint::Columns {
            table: profiles.clone(),
            columns: vec!["user_id".into()],
        });

        let adapted = adapt_fk_object_relationship(&source, "profile", &constraint, &suggested);

        assert_eq!(adapted.definition.to_table, Some(profiles));
        assert_eq!(
            adapted.definition.mapping.get("id").map(String::as_str),
            Some("user_id")
        );
    }

    #[test]
    fn fk_object_relationship_on_remote_table_falls_back_to_array_suggestion() {
        let table = users();
        let source = RelationshipSource::new(&table, "default");
        let profiles = Table::qualified("public", "profiles");
        let suggested = vec![suggestion(
            RelationshipKind::Array,
            (users(), &["id"]),
            (profiles.clone(), &["user_id"]),
        )];
        let constraint = ObjectConstraint::RemoteTable(RemoteTableConstraint::Column {
            table: profiles.clone(),
            column: "user_id".into(),
        });

        let adapted = adapt_fk_object_relationship(&source, "profile", &constraint, &suggested);

        assert_eq!(adapted.relationship_type, RelationshipType::Object);
        assert_eq!(adapted.definition.to_table, Some(profiles));
        assert_eq!(
            adapted.definition.mapping.get("id").map(String::as_str),
            Some("user_id")
        );
    }

    #[test]
    fn unresolved_fk_relationship_keeps_name_and_cardinality() {
        let table = users();
        let source = RelationshipSource::new(&table, "default");

        let adapted = adapt_unresolved_fk_relationship(&source, "orders", RelationshipType::Array);

        assert_eq!(adapted.name, "orders");
        assert_eq!(adapted.relationship_type, RelationshipType::Array);
        assert_eq!(adapted.origin, RelationshipOrigin::ForeignKey);
        assert_eq!(adapted.definition.to_table, None);
        assert!(adapted.definition.mapping.is_empty());
    }

    #[test]
    fn remote_database_relationship_tolerates_missing_keys() {
        let table = users();
        let source = RelationshipSource::new(&table, "default");

        let adapted = adapt_remote_database_relationship(&source, "mystery", &ToSource::default());

        assert_eq!(adapted.relationship_type, None);
        assert_eq!(adapted.definition.to_source, "");
        assert_eq!(adapted.definition.to_table, None);
    }

    #[test]
    fn legacy_remote_schema_maps_hasura_fields_to_lhs_fields() {
        let table = users();
        let source = RelationshipSource::new(&table, "default");
        let legacy = LegacyRemoteSchema {
            remote_schema: "accounts".into(),
            hasura_fields: vec!["id".into()],
            remote_field: Default::default(),
        };

        let adapted = adapt_legacy_remote_schema_relationship(&source, "account", &legacy);

        assert_eq!(adapted.definition.to_remote_schema, "accounts");
        assert_eq!(adapted.definition.lhs_fields, vec!["id".to_string()]);
        assert_eq!(adapted.from_source, "default");
    }
}
