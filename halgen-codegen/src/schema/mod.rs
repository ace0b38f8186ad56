mod type_mapper;

pub use type_mapper::*;

use crate::SchemaError;

/// The column referenced by a single column foreign key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignRef {
    pub table: String,
    pub column: String,
}

/// A foreign key constraint as reported by the database, only used while
/// annotating [`ColumnSchema`]s during discovery
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForeignKeyEdge {
    pub constraint_name: String,
    pub table_name: String,
    pub column_name: String,
    pub foreign_table_name: String,
    pub foreign_column_name: String,
}

/// Everything discovery learns about one column
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnSchema {
    pub table_name: String,
    pub column_name: String,
    pub is_nullable: bool,
    pub data_type: String,
    pub character_maximum_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub numeric_scale: Option<i64>,
    /// MySQL only, e.g. `varchar(255)`
    pub column_type: Option<String>,
    /// MySQL only, e.g. `PRI`
    pub column_key: Option<String>,
    pub primary_key: bool,
    pub foreign: Option<ForeignRef>,
    pub rs_type: RsType,
    pub required_import: Option<&'static str>,
}

impl ColumnSchema {
    /// Builds a column and resolves its Rust type, failing on unsupported SQL types
    pub fn new<T, C, D>(
        table_name: T,
        column_name: C,
        data_type: D,
        is_nullable: bool,
    ) -> Result<Self, SchemaError>
    where
        T: Into<String>,
        C: Into<String>,
        D: Into<String>,
    {
        let (table_name, column_name, data_type) =
            (table_name.into(), column_name.into(), data_type.into());
        let (rs_type, required_import) =
            map_column_type(&table_name, &column_name, &data_type, is_nullable)?;
        Ok(Self {
            table_name,
            column_name,
            is_nullable,
            data_type,
            character_maximum_length: None,
            numeric_precision: None,
            numeric_scale: None,
            column_type: None,
            column_key: None,
            primary_key: false,
            foreign: None,
            rs_type,
            required_import,
        })
    }

    pub fn with_precision(
        mut self,
        character_maximum_length: Option<i64>,
        numeric_precision: Option<i64>,
        numeric_scale: Option<i64>,
    ) -> Self {
        self.character_maximum_length = character_maximum_length;
        self.numeric_precision = numeric_precision;
        self.numeric_scale = numeric_scale;
        self
    }

    pub fn with_column_key(
        mut self,
        column_type: Option<String>,
        column_key: Option<String>,
    ) -> Self {
        self.primary_key = column_key.as_deref() == Some("PRI");
        self.column_type = column_type;
        self.column_key = column_key;
        self
    }

    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    pub fn with_foreign<T, C>(mut self, table: T, column: C) -> Self
    where
        T: Into<String>,
        C: Into<String>,
    {
        self.foreign = Some(ForeignRef {
            table: table.into(),
            column: column.into(),
        });
        self
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign.is_some()
    }

    pub fn get_info(&self) -> String {
        let mut info = format!("Column `{}`: {}", self.column_name, self.rs_type);
        if self.primary_key {
            info.push_str(", primary key");
        }
        if let Some(foreign) = &self.foreign {
            info.push_str(&format!(", references {}.{}", foreign.table, foreign.column));
        }
        info
    }
}

/// Result of one discovery pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    /// Every column of every table, grouped by table in declared column order
    pub columns: Vec<ColumnSchema>,
    /// Base table names, in discovery order
    pub tables: Vec<String>,
}

/// The columns of a single table
#[derive(Clone, Debug)]
pub struct TableSchema<'a> {
    pub name: &'a str,
    pub columns: Vec<&'a ColumnSchema>,
}

impl Schema {
    pub fn table<'a>(&'a self, name: &'a str) -> TableSchema<'a> {
        TableSchema {
            name,
            columns: self
                .columns
                .iter()
                .filter(|col| col.table_name == name)
                .collect(),
        }
    }

    /// Columns, in any table, holding a foreign key to `table`
    pub fn referencing<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a ColumnSchema> {
        self.columns.iter().filter(move |col| {
            col.foreign
                .as_ref()
                .is_some_and(|foreign| foreign.table == table)
        })
    }
}

impl TableSchema<'_> {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns
            .iter()
            .copied()
            .find(|col| col.column_name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}
