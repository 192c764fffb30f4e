// SPDX-License-Identifier: Apache-2.0

//! Relationship suggestions derived from introspected foreign keys

use dbconsole_metadata::{RelationshipKind, Table};

use crate::datasource::types::{ForeignKeyEnd, ForeignKeyRelationship};

use super::types::{Relationship, RelationshipType, SuggestedRelationship, SuggestedRelationshipEnd};

/// Suggests relationships leaving `table`
///
/// Each foreign key `from -> to` yields an object relationship on the
/// referencing table and an array relationship on the referenced table.
/// A self-referencing key yields both for the same table.
pub fn suggest_relationships(
    table: &Table,
    foreign_keys: &[ForeignKeyRelationship],
) -> Vec<SuggestedRelationship> {
    let mut suggestions = Vec::new();
    for fk in foreign_keys {
        if &fk.from.table == table {
            suggestions.push(SuggestedRelationship {
                kind: RelationshipKind::Object,
                from: suggestion_end(&fk.from, fk.constraint_name.clone()),
                to: suggestion_end(&fk.to, None),
            });
        }
        if &fk.to.table == table {
            suggestions.push(SuggestedRelationship {
                kind: RelationshipKind::Array,
                from: suggestion_end(&fk.to, None),
                to: suggestion_end(&fk.from, fk.constraint_name.clone()),
            });
        }
    }
    suggestions
}

/// Whether a local relationship already covers `suggestion`
pub fn is_tracked(suggestion: &SuggestedRelationship, relationships: &[Relationship]) -> bool {
    let relationship_type = RelationshipType::from(suggestion.kind);
    let mapping = suggestion.mapping();
    relationships
        .iter()
        .filter_map(Relationship::as_local)
        .any(|local| {
            local.relationship_type == relationship_type
                && local.from_table == suggestion.from.table
                && local.definition.to_table.as_ref() == Some(&suggestion.to.table)
                && local.definition.mapping == mapping
        })
}

/// Suggestions not yet covered by any of `relationships`
pub fn untracked_suggestions(
    suggested: &[SuggestedRelationship],
    relationships: &[Relationship],
) -> Vec<SuggestedRelationship> {
    suggested
        .iter()
        .filter(|s| !is_tracked(s, relationships))
        .cloned()
        .collect()
}

fn suggestion_end(end: &ForeignKeyEnd, constraint_name: Option<String>) -> SuggestedRelationshipEnd {
    SuggestedRelationshipEnd {
        table: end.table.clone(),
        columns: end.columns.clone(),
        constraint_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationships::table_relationships;
    use dbconsole_metadata::{ArrayRelationship, MetadataTable};

    fn fk(from: &str, from_col: &str, to: &str, to_col: &str) -> ForeignKeyRelationship {
        ForeignKeyRelationship {
            constraint_name: Some(format!("{}_{}_fkey", from, from_col)),
            from: ForeignKeyEnd {
                table: Table::qualified("public", from),
                columns: vec![from_col.to_string()],
            },
            to: ForeignKeyEnd {
                table: Table::qualified("public", to),
                columns: vec![to_col.to_string()],
            },
        }
    }

    #[test]
    fn suggests_object_on_referencing_and_array_on_referenced_table() {
        let fks = vec![fk("orders", "user_id", "users", "id")];

        let on_orders = suggest_relationships(&Table::qualified("public", "orders"), &fks);
        assert_eq!(on_orders.len(), 1);
        assert_eq!(on_orders[0].kind, RelationshipKind::Object);
        assert_eq!(on_orders[0].from.constraint_name.as_deref(), Some("orders_user_id_fkey"));

        let on_users = suggest_relationships(&Table::qualified("public", "users"), &fks);
        assert_eq!(on_users.len(), 1);
        assert_eq!(on_users[0].kind, RelationshipKind::Array);
        assert_eq!(on_users[0].to.table, Table::qualified("public", "orders"));
        assert_eq!(on_users[0].mapping().get("id").map(String::as_str), Some("user_id"));
    }

    #[test]
    fn self_referencing_key_suggests_both_directions() {
        let fks = vec![fk("employees", "manager_id", "employees", "id")];
        let suggestions = suggest_relationships(&Table::qualified("public", "employees"), &fks);
        let kinds: Vec<RelationshipKind> = suggestions.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![RelationshipKind::Object, RelationshipKind::Array]);
    }

    #[test]
    fn tracked_fk_relationship_is_filtered_out() {
        let users = Table::qualified("public", "users");
        let fks = vec![
            fk("orders", "user_id", "users", "id"),
            fk("reviews", "author_id", "users", "id"),
        ];
        let suggested = suggest_relationships(&users, &fks);

        let mut table = MetadataTable::new(users);
        table.array_relationships.push(ArrayRelationship::foreign_key(
            "orders",
            Table::qualified("public", "orders"),
            vec!["user_id".into()],
        ));
        let relationships = table_relationships(Some(&table), "default", &suggested);

        let untracked = untracked_suggestions(&suggested, &relationships);
        assert_eq!(untracked.len(), 1);
        assert_eq!(untracked[0].to.table, Table::qualified("public", "reviews"));
    }
}
