use thiserror::Error;

/// An error raised while discovering or synthesizing a table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Connecting to the database or running a metadata query failed
    #[error("Database error: {0}")]
    Database(String),
    /// The table declares no primary key column
    #[error("Table `{table}` without primary key")]
    MissingPrimaryKey { table: String },
    /// The column's SQL type has no counterpart in the generated code
    #[error("No compatible datatype ({raw_type}) for {table}.{column} found")]
    UnsupportedColumnType {
        table: String,
        column: String,
        raw_type: String,
    },
    /// Two key segments would be addressed through the same link field
    #[error("Table `{table}` has more than one key segment referencing `{foreign_table}`")]
    AmbiguousKeyLink {
        table: String,
        foreign_table: String,
    },
}
