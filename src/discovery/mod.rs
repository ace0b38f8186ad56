mod mysql;
mod postgres;

pub use mysql::*;
pub use postgres::*;

use crate::{ConnectionConfig, Dialect};
use async_trait::async_trait;
use halgen_codegen::{Schema, SchemaError};

/// One introspection pass over a live database
#[async_trait]
pub trait SchemaDiscovery {
    /// Columns of every table, in declared order, and the base table names
    async fn discover(&self) -> Result<Schema, SchemaError>;
}

/// Introspect the database `config` points to with the dialect it names
pub async fn discover_schema(config: &ConnectionConfig) -> Result<Schema, SchemaError> {
    match config.dialect {
        Dialect::MySql => MySqlDiscovery::new(config).discover().await,
        Dialect::Postgres => PostgresDiscovery::new(config).discover().await,
    }
}

/// Converts an [sqlx::Error] to a [SchemaError]
pub fn sqlx_error_to_schema_err(err: sqlx::Error) -> SchemaError {
    SchemaError::Database(err.to_string())
}
