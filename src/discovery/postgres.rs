use super::{SchemaDiscovery, sqlx_error_to_schema_err};
use crate::ConnectionConfig;
use async_trait::async_trait;
use halgen_codegen::{ColumnSchema, ForeignKeyEdge, ForeignRef, Schema, SchemaError};
use sqlx::{
    Pool, Postgres, Row,
    pool::PoolOptions,
    postgres::{PgConnectOptions, PgRow, PgSslMode},
};
use tracing::debug;

const COLUMNS_SQL: &str = "SELECT \
    table_name::text AS table_name, \
    column_name::text AS column_name, \
    is_nullable::text AS is_nullable, \
    data_type::text AS data_type, \
    character_maximum_length::int8 AS character_maximum_length, \
    numeric_precision::int8 AS numeric_precision, \
    numeric_scale::int8 AS numeric_scale \
    FROM information_schema.columns \
    WHERE table_schema = $1 \
    ORDER BY table_name, ordinal_position";

const TABLES_SQL: &str = "SELECT table_name::text AS table_name \
    FROM information_schema.tables \
    WHERE table_schema = $1 AND table_type = 'BASE TABLE' \
    ORDER BY table_name";

const FOREIGN_KEYS_SQL: &str = "SELECT \
    tc.constraint_name::text AS constraint_name, \
    kcu.table_name::text AS table_name, \
    kcu.column_name::text AS column_name, \
    ccu.table_name::text AS foreign_table_name, \
    ccu.column_name::text AS foreign_column_name \
    FROM information_schema.table_constraints AS tc \
    JOIN information_schema.key_column_usage AS kcu \
    ON tc.constraint_name = kcu.constraint_name \
    AND tc.table_schema = kcu.table_schema \
    JOIN information_schema.constraint_column_usage AS ccu \
    ON ccu.constraint_name = tc.constraint_name \
    AND ccu.table_schema = tc.table_schema \
    WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = $1 \
    ORDER BY tc.constraint_name, kcu.table_name, kcu.column_name";

const PRIMARY_KEYS_SQL: &str = "SELECT \
    kcu.table_name::text AS table_name, \
    kcu.column_name::text AS column_name \
    FROM information_schema.table_constraints AS tc \
    JOIN information_schema.key_column_usage AS kcu \
    ON tc.constraint_name = kcu.constraint_name \
    AND tc.table_schema = kcu.table_schema \
    AND tc.table_name = kcu.table_name \
    WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = $1 \
    ORDER BY kcu.table_name, kcu.ordinal_position";

/// Points every column named by an edge at the edge's foreign column. When
/// several constraints cover one column the last edge wins.
pub fn annotate_foreign_keys(columns: &mut [ColumnSchema], edges: &[ForeignKeyEdge]) {
    for edge in edges {
        for column in columns.iter_mut().filter(|col| {
            col.table_name == edge.table_name && col.column_name == edge.column_name
        }) {
            debug!(
                "{}: {}.{} references {}.{}",
                edge.constraint_name,
                edge.table_name,
                edge.column_name,
                edge.foreign_table_name,
                edge.foreign_column_name
            );
            column.foreign = Some(ForeignRef {
                table: edge.foreign_table_name.clone(),
                column: edge.foreign_column_name.clone(),
            });
        }
    }
}

/// Flags the `(table, column)` pairs as primary key segments
pub fn annotate_primary_keys(columns: &mut [ColumnSchema], keys: &[(String, String)]) {
    for column in columns.iter_mut() {
        if keys
            .iter()
            .any(|(table, name)| *table == column.table_name && *name == column.column_name)
        {
            column.primary_key = true;
        }
    }
}

fn column_from_row(row: &PgRow) -> Result<ColumnSchema, SchemaError> {
    let get_str = |name: &str| -> Result<String, SchemaError> {
        row.try_get(name).map_err(sqlx_error_to_schema_err)
    };
    let get_i64 = |name: &str| -> Result<Option<i64>, SchemaError> {
        row.try_get(name).map_err(sqlx_error_to_schema_err)
    };
    let is_nullable = get_str("is_nullable")? == "YES";
    Ok(ColumnSchema::new(
        get_str("table_name")?,
        get_str("column_name")?,
        get_str("data_type")?,
        is_nullable,
    )?
    .with_precision(
        get_i64("character_maximum_length")?,
        get_i64("numeric_precision")?,
        get_i64("numeric_scale")?,
    ))
}

fn edge_from_row(row: &PgRow) -> Result<ForeignKeyEdge, sqlx::Error> {
    Ok(ForeignKeyEdge {
        constraint_name: row.try_get("constraint_name")?,
        table_name: row.try_get("table_name")?,
        column_name: row.try_get("column_name")?,
        foreign_table_name: row.try_get("foreign_table_name")?,
        foreign_column_name: row.try_get("foreign_column_name")?,
    })
}

/// Four pass discovery: columns, base tables, foreign keys, then primary keys
pub struct PostgresDiscovery<'a> {
    config: &'a ConnectionConfig,
}

impl<'a> PostgresDiscovery<'a> {
    pub fn new(config: &'a ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .database(&self.config.name)
            .ssl_mode(PgSslMode::Disable)
    }

    async fn fetch(&self, pool: &Pool<Postgres>, sql: &str) -> Result<Vec<PgRow>, SchemaError> {
        debug!("{}", sql);
        sqlx::query(sql)
            .bind(&self.config.database_schema)
            .fetch_all(pool)
            .await
            .map_err(sqlx_error_to_schema_err)
    }
}

#[async_trait]
impl SchemaDiscovery for PostgresDiscovery<'_> {
    async fn discover(&self) -> Result<Schema, SchemaError> {
        let pool = PoolOptions::<Postgres>::new()
            .max_connections(1)
            .connect_with(self.connect_options())
            .await
            .map_err(sqlx_error_to_schema_err)?;

        let mut columns = self
            .fetch(&pool, COLUMNS_SQL)
            .await?
            .iter()
            .map(column_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let tables = self
            .fetch(&pool, TABLES_SQL)
            .await?
            .iter()
            .map(|row| row.try_get::<String, _>("table_name"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(sqlx_error_to_schema_err)?;

        let edges = self
            .fetch(&pool, FOREIGN_KEYS_SQL)
            .await?
            .iter()
            .map(edge_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(sqlx_error_to_schema_err)?;
        annotate_foreign_keys(&mut columns, &edges);

        let keys = self
            .fetch(&pool, PRIMARY_KEYS_SQL)
            .await?
            .iter()
            .map(|row| -> Result<(String, String), sqlx::Error> {
                Ok((
                    row.try_get::<String, _>("table_name")?,
                    row.try_get::<String, _>("column_name")?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(sqlx_error_to_schema_err)?;
        annotate_primary_keys(&mut columns, &keys);

        pool.close().await;

        Ok(Schema { columns, tables })
    }
}
