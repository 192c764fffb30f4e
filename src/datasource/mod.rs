// Data Source Module
// Backend adapters used by the console for introspection and configuration

pub mod cockroach;
pub mod common;
pub mod error;
pub mod feature;
pub mod registry;
pub mod runner;
pub mod traits;
pub mod types;

pub use cockroach::CockroachDataSource;
pub use error::{DataSourceError, DataSourceResult};
pub use feature::Feature;
pub use registry::DataSourceRegistry;
pub use runner::PgSqlRunner;
pub use traits::{DataSource, IntrospectionContext, SqlRunner};
pub use types::*;
