// SPDX-License-Identifier: Apache-2.0

//! CockroachDB data source
//!
//! CockroachDB exposes Postgres-compatible catalogs, so introspection reads
//! `information_schema` through the injected SQL runner. Connection
//! configuration and schema listing are not offered for this backend.

use async_trait::async_trait;

use dbconsole_metadata::Table;

use crate::datasource::common::{
    adapt_introspected_tables, parse_bool, postgres_capabilities, quote_literal, schema_and_name,
};
use crate::datasource::error::DataSourceResult;
use crate::datasource::feature::Feature;
use crate::datasource::traits::{DataSource, IntrospectionContext};
use crate::datasource::types::{
    cell, DriverCapabilities, DriverInfo, ForeignKeyEnd, ForeignKeyRelationship,
    IntrospectedTable, ReleaseType, RunSqlRequest, RunSqlResponse, SourceRef, TableColumn,
};

pub const KIND: &str = "cockroach";

const TRACKABLE_TABLES_SQL: &str = r#"
      WITH partitions as (
        SELECT array(
          SELECT
          child.relname       AS partition
      FROM pg_inherits
          JOIN pg_class child             ON pg_inherits.inhrelid   = child.oid
          JOIN pg_namespace nmsp_child    ON nmsp_child.oid   = child.relnamespace
        ) as names
      )
      SELECT info_schema.table_name, info_schema.table_schema, info_schema.table_type
      FROM information_schema.tables as info_schema, partitions
      WHERE
        info_schema.table_schema NOT IN ('pg_catalog', 'crdb_internal', 'information_schema', 'columnar', 'guest', 'INFORMATION_SCHEMA', 'sys', 'db_owner', 'db_securityadmin', 'db_accessadmin', 'db_backupoperator', 'db_ddladmin', 'db_datawriter', 'db_datareader', 'db_denydatawriter', 'db_denydatareader', 'hdb_catalog', '_timescaledb_internal', 'pg_extension')
        AND NOT (info_schema.table_name = ANY (partitions.names));
      "#;

// Referenced columns are paired through position_in_unique_constraint so
// composite keys do not fan out.
const FK_RELATIONSHIPS_SQL: &str = r#"
      SELECT
        rc.constraint_name,
        kcu.table_schema,
        kcu.table_name,
        kcu.column_name,
        ref.table_schema,
        ref.table_name,
        ref.column_name
      FROM information_schema.referential_constraints AS rc
      JOIN information_schema.key_column_usage AS kcu
        ON kcu.constraint_schema = rc.constraint_schema
        AND kcu.constraint_name = rc.constraint_name
      JOIN information_schema.key_column_usage AS ref
        ON ref.constraint_schema = rc.unique_constraint_schema
        AND ref.constraint_name = rc.unique_constraint_name
        AND ref.ordinal_position = kcu.position_in_unique_constraint
      WHERE kcu.table_schema NOT IN ('pg_catalog', 'crdb_internal', 'information_schema', 'pg_extension', 'hdb_catalog')
      ORDER BY kcu.table_schema, kcu.table_name, rc.constraint_name, kcu.ordinal_position;
      "#;

/// CockroachDB data source implementation
#[derive(Debug, Default)]
pub struct CockroachDataSource;

impl CockroachDataSource {
    pub fn new() -> Self {
        Self
    }

    async fn run(ctx: IntrospectionContext<'_>, sql: String) -> DataSourceResult<RunSqlResponse> {
        let request = RunSqlRequest::read_only(SourceRef::new(ctx.data_source_name, KIND), sql);
        ctx.runner.run_sql(request).await
    }

    fn table_columns_sql(schema: &str, name: &str) -> String {
        format!(
            r#"
      SELECT
        c.column_name,
        c.data_type,
        c.is_nullable,
        c.column_default,
        EXISTS (
          SELECT 1
          FROM information_schema.table_constraints AS tc
          JOIN information_schema.key_column_usage AS kcu
            ON tc.constraint_schema = kcu.constraint_schema
            AND tc.constraint_name = kcu.constraint_name
          WHERE tc.constraint_type = 'PRIMARY KEY'
            AND tc.table_schema = c.table_schema
            AND tc.table_name = c.table_name
            AND kcu.column_name = c.column_name
        ) AS is_primary_key
      FROM information_schema.columns AS c
      WHERE c.table_schema = {} AND c.table_name = {}
      ORDER BY c.ordinal_position;
      "#,
            quote_literal(schema),
            quote_literal(name)
        )
    }

    fn is_table_view_sql(schema: &str, name: &str) -> String {
        format!(
            "SELECT table_type FROM information_schema.tables WHERE table_schema = {} AND table_name = {};",
            quote_literal(schema),
            quote_literal(name)
        )
    }
}

/// Folds per-column FK rows into one relationship per constraint
fn adapt_fk_relationships(response: &RunSqlResponse) -> Vec<ForeignKeyRelationship> {
    let mut relationships: Vec<ForeignKeyRelationship> = Vec::new();

    for row in response.rows() {
        let (Some(constraint), Some(from_schema), Some(from_table), Some(from_column)) =
            (cell(row, 0), cell(row, 1), cell(row, 2), cell(row, 3))
        else {
            continue;
        };
        let (Some(to_schema), Some(to_table), Some(to_column)) =
            (cell(row, 4), cell(row, 5), cell(row, 6))
        else {
            continue;
        };

        let from = Table::qualified(from_schema, from_table);
        match relationships.last_mut() {
            Some(last)
                if last.constraint_name.as_deref() == Some(constraint) && last.from.table == from =>
            {
                last.from.columns.push(from_column.to_string());
                last.to.columns.push(to_column.to_string());
            }
            _ => relationships.push(ForeignKeyRelationship {
                from: ForeignKeyEnd {
                    table: from,
                    columns: vec![from_column.to_string()],
                },
                to: ForeignKeyEnd {
                    table: Table::qualified(to_schema, to_table),
                    columns: vec![to_column.to_string()],
                },
                constraint_name: Some(constraint.to_string()),
            }),
        }
    }

    relationships
}

#[async_trait]
impl DataSource for CockroachDataSource {
    fn kind(&self) -> &'static str {
        KIND
    }

    async fn get_version(&self, ctx: IntrospectionContext<'_>) -> DataSourceResult<Feature<String>> {
        let response = Self::run(ctx, "SELECT VERSION()".to_string()).await?;
        tracing::debug!(source = ctx.data_source_name, ?response, "Fetched CockroachDB version");
        let version = response
            .rows()
            .first()
            .and_then(|row| cell(row, 0))
            .unwrap_or_default()
            .to_string();
        Ok(Feature::Available(version))
    }

    async fn get_driver_info(&self) -> DataSourceResult<Feature<DriverInfo>> {
        Ok(Feature::Available(DriverInfo {
            name: KIND.to_string(),
            display_name: "CockroachDB".to_string(),
            release: ReleaseType::Ga,
        }))
    }

    async fn get_driver_capabilities(&self) -> DataSourceResult<Feature<DriverCapabilities>> {
        Ok(Feature::Available(postgres_capabilities()))
    }

    async fn get_trackable_tables(
        &self,
        ctx: IntrospectionContext<'_>,
    ) -> DataSourceResult<Feature<Vec<IntrospectedTable>>> {
        let response = Self::run(ctx, TRACKABLE_TABLES_SQL.to_string()).await?;
        let tables = adapt_introspected_tables(&response);
        tracing::info!(source = ctx.data_source_name, count = tables.len(), "Listed trackable tables");
        Ok(Feature::Available(tables))
    }

    async fn get_database_hierarchy(&self) -> DataSourceResult<Feature<Vec<String>>> {
        Ok(Feature::Available(vec!["schema".to_string(), "name".to_string()]))
    }

    async fn get_table_columns(
        &self,
        ctx: IntrospectionContext<'_>,
        table: &Table,
    ) -> DataSourceResult<Feature<Vec<TableColumn>>> {
        let (schema, name) = schema_and_name(table)?;
        let response = Self::run(ctx, Self::table_columns_sql(schema, name)).await?;

        let columns = response
            .rows()
            .iter()
            .filter_map(|row| {
                Some(TableColumn {
                    name: cell(row, 0)?.to_string(),
                    data_type: cell(row, 1).unwrap_or_default().to_string(),
                    nullable: parse_bool(cell(row, 2)),
                    default_value: cell(row, 3).map(str::to_string),
                    is_primary_key: parse_bool(cell(row, 4)),
                })
            })
            .collect();
        Ok(Feature::Available(columns))
    }

    async fn get_fk_relationships(
        &self,
        ctx: IntrospectionContext<'_>,
    ) -> DataSourceResult<Feature<Vec<ForeignKeyRelationship>>> {
        let response = Self::run(ctx, FK_RELATIONSHIPS_SQL.to_string()).await?;
        Ok(Feature::Available(adapt_fk_relationships(&response)))
    }

    async fn get_is_table_view(
        &self,
        ctx: IntrospectionContext<'_>,
        table: &Table,
    ) -> DataSourceResult<Feature<bool>> {
        let (schema, name) = schema_and_name(table)?;
        let response = Self::run(ctx, Self::is_table_view_sql(schema, name)).await?;
        let is_view = response
            .rows()
            .first()
            .and_then(|row| cell(row, 0))
            .map(|table_type| table_type.eq_ignore_ascii_case("VIEW"))
            .unwrap_or(false);
        Ok(Feature::Available(is_view))
    }

    async fn get_default_query_root(&self, table: &Table) -> DataSourceResult<Feature<String>> {
        let (schema, name) = schema_and_name(table)?;
        let root = if schema == "public" {
            name.to_string()
        } else {
            format!("{}_{}", schema, name)
        };
        Ok(Feature::Available(root))
    }

    async fn get_supported_query_types(&self) -> DataSourceResult<Feature<Vec<String>>> {
        Ok(Feature::Available(
            ["select", "insert", "update", "delete"]
                .into_iter()
                .map(String::from)
                .collect(),
        ))
    }
}
