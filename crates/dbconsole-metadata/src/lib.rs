// SPDX-License-Identifier: Apache-2.0

//! Stored metadata model for the database console
//!
//! These types mirror the metadata document a source keeps for each tracked
//! table. Every relationship entry shape is a serde enum, so an entry either
//! parses into a known variant or the whole table is rejected with a
//! [`MetadataError`].

pub mod error;
pub mod relationships;
pub mod table;

pub use error::{MetadataError, MetadataResult};
pub use relationships::*;
pub use table::{MetadataSource, MetadataTable, Table};
