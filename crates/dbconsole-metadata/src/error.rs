// SPDX-License-Identifier: Apache-2.0

//! Metadata parsing errors

use thiserror::Error;

/// Error raised when a metadata document cannot be parsed
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid metadata for table {table}: {source}")]
    InvalidTable {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid metadata for source {source_name}: {source}")]
    InvalidSource {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl MetadataError {
    pub fn invalid_table(table: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidTable {
            table: table.into(),
            source,
        }
    }

    pub fn invalid_source(source_name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidSource {
            source_name: source_name.into(),
            source,
        }
    }
}

/// Result type alias for metadata parsing
pub type MetadataResult<T> = Result<T, MetadataError>;
