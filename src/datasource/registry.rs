// SPDX-License-Identifier: Apache-2.0

//! Data Source Registry
//!
//! Central registry for all available data source adapters, keyed by the
//! source kind stored in metadata.

use std::collections::HashMap;
use std::sync::Arc;

use crate::datasource::cockroach::CockroachDataSource;
use crate::datasource::error::{DataSourceError, DataSourceResult};
use crate::datasource::traits::DataSource;

/// Registry that holds all available data source adapters
pub struct DataSourceRegistry {
    sources: HashMap<String, Arc<dyn DataSource>>,
}

impl DataSourceRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// Creates a registry with every built-in adapter
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CockroachDataSource::new()));
        registry
    }

    /// Registers an adapter under its `kind()`, replacing any previous one
    pub fn register(&mut self, source: Arc<dyn DataSource>) {
        let kind = source.kind().to_string();
        self.sources.insert(kind, source);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn DataSource>> {
        self.sources.get(kind).cloned()
    }

    /// Like [`get`](Self::get), but an unknown kind is an error
    pub fn require(&self, kind: &str) -> DataSourceResult<Arc<dyn DataSource>> {
        self.get(kind)
            .ok_or_else(|| DataSourceError::data_source_not_found(kind))
    }

    /// Lists all registered kinds, sorted
    pub fn list(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.sources.keys().map(|s| s.as_str()).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for DataSourceRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
