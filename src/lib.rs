// dbconsole - database console backend
// Core library

pub mod config;
pub mod datasource;
pub mod observability;
pub mod relationships;

pub use config::{ConfigError, ConsoleConfig};
pub use datasource::{DataSource, DataSourceError, DataSourceRegistry, Feature, SqlRunner};
pub use dbconsole_metadata as metadata;
pub use relationships::{table_relationships, Relationship, SuggestedRelationship};
