use crate::{RsType, SchemaError, TableSchema, link_name, rust_ident};
use std::collections::BTreeSet;

/// Where the value of a key segment is read from when it is bound to a
/// named statement parameter
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamAddress {
    /// The flat column, bound as `:column`
    Column(String),
    /// The `id` of the link to `foreign_table`, bound as `:links.<link>.id`
    Link { foreign_table: String },
}

impl ParamAddress {
    pub fn param_name(&self) -> String {
        match self {
            Self::Column(column) => column.clone(),
            Self::Link { foreign_table } => {
                format!("links.{}.id", rust_ident(&link_name(foreign_table)))
            }
        }
    }
}

/// One column of a table's primary key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeySegment {
    pub column: String,
    pub rs_type: RsType,
    pub required_import: Option<&'static str>,
    pub address: ParamAddress,
}

impl KeySegment {
    pub fn is_link(&self) -> bool {
        matches!(self.address, ParamAddress::Link { .. })
    }
}

/// Ordered primary key of `table`.
///
/// Segments backed by a foreign key are addressed through the link to the
/// referenced table, the value is both part of this row's key and the
/// reference to the linked row.
pub fn resolve_primary_key(table: &TableSchema<'_>) -> Result<Vec<KeySegment>, SchemaError> {
    let segments: Vec<KeySegment> = table
        .columns
        .iter()
        .filter(|col| col.primary_key)
        .map(|col| KeySegment {
            column: col.column_name.clone(),
            rs_type: col.rs_type,
            required_import: col.required_import,
            address: match &col.foreign {
                Some(foreign) => ParamAddress::Link {
                    foreign_table: foreign.table.clone(),
                },
                None => ParamAddress::Column(col.column_name.clone()),
            },
        })
        .collect();

    if segments.is_empty() {
        return Err(SchemaError::MissingPrimaryKey {
            table: table.name.to_owned(),
        });
    }

    let mut linked = BTreeSet::new();
    for segment in segments.iter() {
        if let ParamAddress::Link { foreign_table } = &segment.address {
            if !linked.insert(foreign_table.as_str()) {
                return Err(SchemaError::AmbiguousKeyLink {
                    table: table.name.to_owned(),
                    foreign_table: foreign_table.clone(),
                });
            }
        }
    }

    Ok(segments)
}
