// SPDX-License-Identifier: Apache-2.0

// Relationship normalization module

pub mod adapt;
pub mod suggested;
pub mod table_relationships;
pub mod types;

pub use suggested::{is_tracked, suggest_relationships, untracked_suggestions};
pub use table_relationships::table_relationships;
pub use types::*;
