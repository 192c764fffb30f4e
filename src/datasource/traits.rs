// SPDX-License-Identifier: Apache-2.0

//! DataSource and SqlRunner trait definitions
//!
//! A `DataSource` is the console's view of one database backend. Its
//! operations run SQL through an injected `SqlRunner` and answer with a
//! value or `Feature::NotImplemented`. Every operation defaults to
//! `NotImplemented`, so a backend only overrides what it supports.

use async_trait::async_trait;

use dbconsole_metadata::Table;

use crate::datasource::error::DataSourceResult;
use crate::datasource::feature::Feature;
use crate::datasource::types::{
    DriverCapabilities, DriverInfo, ForeignKeyRelationship, IntrospectedTable, RunSqlRequest,
    RunSqlResponse, TableColumn,
};

/// Executes SQL against a named source
#[async_trait]
pub trait SqlRunner: Send + Sync {
    async fn run_sql(&self, request: RunSqlRequest) -> DataSourceResult<RunSqlResponse>;
}

/// Arguments shared by introspection operations
#[derive(Clone, Copy)]
pub struct IntrospectionContext<'a> {
    pub data_source_name: &'a str,
    pub runner: &'a dyn SqlRunner,
}

impl<'a> IntrospectionContext<'a> {
    pub fn new(data_source_name: &'a str, runner: &'a dyn SqlRunner) -> Self {
        Self {
            data_source_name,
            runner,
        }
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Returns the source kind this adapter serves (e.g., "cockroach")
    fn kind(&self) -> &'static str;

    // ==================== Introspection ====================

    async fn get_version(&self, _ctx: IntrospectionContext<'_>) -> DataSourceResult<Feature<String>> {
        Ok(Feature::NotImplemented)
    }

    async fn get_driver_info(&self) -> DataSourceResult<Feature<DriverInfo>> {
        Ok(Feature::NotImplemented)
    }

    /// Backend-specific connection configuration schema
    async fn get_database_configuration(&self) -> DataSourceResult<Feature<serde_json::Value>> {
        Ok(Feature::NotImplemented)
    }

    async fn get_driver_capabilities(&self) -> DataSourceResult<Feature<DriverCapabilities>> {
        Ok(Feature::NotImplemented)
    }

    async fn get_trackable_tables(
        &self,
        _ctx: IntrospectionContext<'_>,
    ) -> DataSourceResult<Feature<Vec<IntrospectedTable>>> {
        Ok(Feature::NotImplemented)
    }

    /// Keys of a table identity, outermost first
    async fn get_database_hierarchy(&self) -> DataSourceResult<Feature<Vec<String>>> {
        Ok(Feature::NotImplemented)
    }

    async fn get_table_columns(
        &self,
        _ctx: IntrospectionContext<'_>,
        _table: &Table,
    ) -> DataSourceResult<Feature<Vec<TableColumn>>> {
        Ok(Feature::NotImplemented)
    }

    async fn get_fk_relationships(
        &self,
        _ctx: IntrospectionContext<'_>,
    ) -> DataSourceResult<Feature<Vec<ForeignKeyRelationship>>> {
        Ok(Feature::NotImplemented)
    }

    async fn get_database_schemas(
        &self,
        _ctx: IntrospectionContext<'_>,
    ) -> DataSourceResult<Feature<Vec<String>>> {
        Ok(Feature::NotImplemented)
    }

    async fn get_is_table_view(
        &self,
        _ctx: IntrospectionContext<'_>,
        _table: &Table,
    ) -> DataSourceResult<Feature<bool>> {
        Ok(Feature::NotImplemented)
    }

    // ==================== Config ====================

    /// GraphQL root field name the console proposes for a table
    async fn get_default_query_root(&self, _table: &Table) -> DataSourceResult<Feature<String>> {
        Ok(Feature::NotImplemented)
    }

    async fn get_supported_query_types(&self) -> DataSourceResult<Feature<Vec<String>>> {
        Ok(Feature::NotImplemented)
    }
}
