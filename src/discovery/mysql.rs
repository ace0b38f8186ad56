use super::{SchemaDiscovery, sqlx_error_to_schema_err};
use crate::ConnectionConfig;
use async_trait::async_trait;
use halgen_codegen::{ColumnSchema, ForeignRef, Schema, SchemaError};
use sqlx::{
    MySql, Row,
    mysql::{MySqlConnectOptions, MySqlRow},
    pool::PoolOptions,
};
use tracing::debug;

/// Metadata lives in `information_schema`, the introspected database is only
/// used to filter it
const INFORMATION_SCHEMA: &str = "information_schema";

const COLUMNS_SQL: &str = "SELECT \
    CAST(c.TABLE_NAME AS CHAR) AS table_name, \
    CAST(c.COLUMN_NAME AS CHAR) AS column_name, \
    CAST(c.IS_NULLABLE AS CHAR) AS is_nullable, \
    CAST(c.DATA_TYPE AS CHAR) AS data_type, \
    CAST(c.CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS character_maximum_length, \
    CAST(c.NUMERIC_PRECISION AS SIGNED) AS numeric_precision, \
    CAST(c.NUMERIC_SCALE AS SIGNED) AS numeric_scale, \
    CAST(c.COLUMN_TYPE AS CHAR) AS column_type, \
    CAST(c.COLUMN_KEY AS CHAR) AS column_key, \
    CAST(k.REFERENCED_TABLE_NAME AS CHAR) AS referenced_table_name, \
    CAST(k.REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column_name \
    FROM COLUMNS AS c \
    LEFT JOIN KEY_COLUMN_USAGE AS k \
    ON k.TABLE_SCHEMA = c.TABLE_SCHEMA \
    AND k.TABLE_NAME = c.TABLE_NAME \
    AND k.COLUMN_NAME = c.COLUMN_NAME \
    AND k.REFERENCED_TABLE_NAME IS NOT NULL \
    WHERE c.TABLE_SCHEMA = ? \
    ORDER BY c.TABLE_NAME, c.ORDINAL_POSITION, k.CONSTRAINT_NAME";

const TABLES_SQL: &str = "SELECT CAST(TABLE_NAME AS CHAR) AS table_name FROM TABLES \
    WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE' \
    ORDER BY TABLE_NAME";

/// One row of the columns query, a column may span several rows when more
/// than one foreign key constraint covers it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyUsageRow {
    pub table_name: String,
    pub column_name: String,
    pub is_nullable: String,
    pub data_type: String,
    pub character_maximum_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub numeric_scale: Option<i64>,
    pub column_type: Option<String>,
    pub column_key: Option<String>,
    pub foreign: Option<ForeignRef>,
}

impl KeyUsageRow {
    fn from_row(row: &MySqlRow) -> Result<Self, sqlx::Error> {
        let referenced_table: Option<String> = row.try_get("referenced_table_name")?;
        let referenced_column: Option<String> = row.try_get("referenced_column_name")?;
        Ok(Self {
            table_name: row.try_get("table_name")?,
            column_name: row.try_get("column_name")?,
            is_nullable: row.try_get("is_nullable")?,
            data_type: row.try_get("data_type")?,
            character_maximum_length: row.try_get("character_maximum_length")?,
            numeric_precision: row.try_get("numeric_precision")?,
            numeric_scale: row.try_get("numeric_scale")?,
            column_type: row.try_get("column_type")?,
            column_key: row.try_get("column_key")?,
            foreign: referenced_table
                .zip(referenced_column)
                .map(|(table, column)| ForeignRef { table, column }),
        })
    }
}

/// Folds repeated rows of one column into a single [`ColumnSchema`], the
/// last foreign key seen wins. Rows must be ordered by table and column.
pub fn fold_key_usage(rows: Vec<KeyUsageRow>) -> Result<Vec<ColumnSchema>, SchemaError> {
    let mut columns: Vec<ColumnSchema> = Vec::new();
    for row in rows {
        if let Some(last) = columns.last_mut() {
            if last.table_name == row.table_name && last.column_name == row.column_name {
                if let Some(foreign) = row.foreign {
                    debug!(
                        "Replacing foreign key of {}.{} with {}.{}",
                        last.table_name, last.column_name, foreign.table, foreign.column
                    );
                    last.foreign = Some(foreign);
                }
                continue;
            }
        }
        let mut column = ColumnSchema::new(
            row.table_name,
            row.column_name,
            row.data_type,
            row.is_nullable == "YES",
        )?
        .with_precision(
            row.character_maximum_length,
            row.numeric_precision,
            row.numeric_scale,
        )
        .with_column_key(row.column_type, row.column_key);
        column.foreign = row.foreign;
        columns.push(column);
    }
    Ok(columns)
}

/// Single pass discovery: column facts, primary key flags and foreign keys
/// come from one joined query
pub struct MySqlDiscovery<'a> {
    config: &'a ConnectionConfig,
}

impl<'a> MySqlDiscovery<'a> {
    pub fn new(config: &'a ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .password(&self.config.password)
            .database(INFORMATION_SCHEMA)
    }
}

#[async_trait]
impl SchemaDiscovery for MySqlDiscovery<'_> {
    async fn discover(&self) -> Result<Schema, SchemaError> {
        let pool = PoolOptions::<MySql>::new()
            .max_connections(1)
            .connect_with(self.connect_options())
            .await
            .map_err(sqlx_error_to_schema_err)?;

        debug!("{}", COLUMNS_SQL);
        let rows = sqlx::query(COLUMNS_SQL)
            .bind(&self.config.name)
            .fetch_all(&pool)
            .await
            .map_err(sqlx_error_to_schema_err)?;
        let rows = rows
            .iter()
            .map(KeyUsageRow::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(sqlx_error_to_schema_err)?;

        debug!("{}", TABLES_SQL);
        let tables = sqlx::query(TABLES_SQL)
            .bind(&self.config.name)
            .fetch_all(&pool)
            .await
            .map_err(sqlx_error_to_schema_err)?
            .iter()
            .map(|row| row.try_get::<String, _>("table_name"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(sqlx_error_to_schema_err)?;

        pool.close().await;

        Ok(Schema {
            columns: fold_key_usage(rows)?,
            tables,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dialect;
    use halgen_codegen::{Primitive, RsType};
    use pretty_assertions::assert_eq;

    fn row(table: &str, column: &str, data_type: &str, column_key: &str) -> KeyUsageRow {
        KeyUsageRow {
            table_name: table.to_owned(),
            column_name: column.to_owned(),
            is_nullable: "NO".to_owned(),
            data_type: data_type.to_owned(),
            character_maximum_length: None,
            numeric_precision: Some(10),
            numeric_scale: Some(0),
            column_type: Some(format!("{data_type}(11)")),
            column_key: Some(column_key.to_owned()),
            foreign: None,
        }
    }

    fn foreign(table: &str, column: &str) -> Option<ForeignRef> {
        Some(ForeignRef {
            table: table.to_owned(),
            column: column.to_owned(),
        })
    }

    #[test]
    fn test_fold_key_usage() {
        let mut servers_type = row("servers", "type", "int", "MUL");
        servers_type.foreign = foreign("type", "id");
        let mut repeated = servers_type.clone();
        repeated.foreign = foreign("types_v2", "id");
        let mut nullable = row("servers", "ilo_ip", "varchar", "");
        nullable.is_nullable = "YES".to_owned();

        let columns = fold_key_usage(vec![
            row("servers", "id", "int", "PRI"),
            servers_type,
            repeated,
            nullable,
        ])
        .unwrap();

        assert_eq!(
            columns
                .iter()
                .map(|col| col.column_name.as_str())
                .collect::<Vec<_>>(),
            vec!["id", "type", "ilo_ip"]
        );
        assert!(columns[0].primary_key);
        assert!(!columns[1].primary_key);
        assert_eq!(columns[1].foreign, foreign("types_v2", "id"));
        assert_eq!(columns[2].rs_type, RsType::Nullable(Primitive::String));
        assert_eq!(columns[0].column_type.as_deref(), Some("int(11)"));
    }

    #[test]
    fn test_fold_key_usage_keeps_same_column_of_other_tables() {
        let columns = fold_key_usage(vec![
            row("cachegroups", "id", "int", "PRI"),
            row("servers", "id", "int", "PRI"),
        ])
        .unwrap();
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_fold_key_usage_rejects_unsupported_type() {
        assert_eq!(
            fold_key_usage(vec![row("servers", "profile", "json", "")]),
            Err(SchemaError::UnsupportedColumnType {
                table: "servers".to_owned(),
                column: "profile".to_owned(),
                raw_type: "json".to_owned(),
            })
        );
    }

    #[test]
    fn test_connect_options() {
        let config = ConnectionConfig {
            dialect: Dialect::MySql,
            user: "to_user".to_owned(),
            password: "pw".to_owned(),
            name: "traffic_ops".to_owned(),
            host: "localhost".to_owned(),
            port: 3306,
            database_schema: "public".to_owned(),
        };
        let options = MySqlDiscovery::new(&config).connect_options();
        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_port(), 3306);
        assert_eq!(options.get_username(), "to_user");
        assert_eq!(options.get_database(), Some(INFORMATION_SCHEMA));
    }
}
