// SPDX-License-Identifier: Apache-2.0

//! Normalized error types for data source operations
//!
//! SQL client and adapter failures are mapped to these variants so the
//! console reports them consistently across backends. Capabilities a backend
//! does not offer are not errors; they are reported as
//! [`Feature::NotImplemented`](super::Feature::NotImplemented).

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Serialize, Deserialize)]
pub enum DataSourceError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("SQL execution error: {message}")]
    ExecutionError { message: String },

    #[error("Unexpected SQL result: {message}")]
    UnexpectedResult { message: String },

    #[error("Data source kind not registered: {kind}")]
    DataSourceNotFound { kind: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl DataSourceError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: msg.into() }
    }

    pub fn execution_error(msg: impl Into<String>) -> Self {
        Self::ExecutionError { message: msg.into() }
    }

    pub fn unexpected_result(msg: impl Into<String>) -> Self {
        Self::UnexpectedResult { message: msg.into() }
    }

    pub fn data_source_not_found(kind: impl Into<String>) -> Self {
        Self::DataSourceNotFound { kind: kind.into() }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError { message: msg.into() }
    }
}

/// Result type alias for data source operations
pub type DataSourceResult<T> = Result<T, DataSourceError>;
