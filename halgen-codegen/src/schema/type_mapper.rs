use crate::SchemaError;
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use std::fmt;
use strum::EnumString;

/// Import the generated code needs for timestamp columns
pub const CHRONO_IMPORT: &str = "chrono::NaiveDateTime";

/// SQL data types grouped by the Rust type they map to
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SqlTypeFamily {
    #[strum(
        serialize = "char",
        serialize = "varchar",
        serialize = "enum",
        serialize = "text",
        serialize = "longtext",
        serialize = "mediumtext",
        serialize = "tinytext",
        serialize = "character varying"
    )]
    Text,
    /// Catalog and network types without a richer mapping, rendered as text
    #[strum(
        serialize = "name",
        serialize = "regproc",
        serialize = "\"char\"",
        serialize = "oid",
        serialize = "pg_node_tree",
        serialize = "array",
        serialize = "timestamp with time zone",
        serialize = "xid",
        serialize = "bytea",
        serialize = "pg_lsn",
        serialize = "abstime",
        serialize = "anyarray",
        serialize = "interval",
        serialize = "inet"
    )]
    Opaque,
    #[strum(
        serialize = "blob",
        serialize = "mediumblob",
        serialize = "longblob",
        serialize = "varbinary",
        serialize = "binary"
    )]
    Binary,
    #[strum(
        serialize = "date",
        serialize = "time",
        serialize = "datetime",
        serialize = "timestamp",
        serialize = "tstamp",
        serialize = "timestamp without time zone"
    )]
    Temporal,
    #[strum(
        serialize = "tinyint",
        serialize = "smallint",
        serialize = "int",
        serialize = "mediumint",
        serialize = "bigint",
        serialize = "numeric",
        serialize = "integer"
    )]
    Integer,
    #[strum(
        serialize = "float",
        serialize = "decimal",
        serialize = "double",
        serialize = "double precision",
        serialize = "real"
    )]
    Float,
    #[strum(serialize = "boolean")]
    Boolean,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    I64,
    F64,
    Bool,
    NaiveDateTime,
}

/// Resolved Rust type of a column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RsType {
    Plain(Primitive),
    Nullable(Primitive),
    Bytes,
}

impl Primitive {
    fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::I64 => "i64",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::NaiveDateTime => "NaiveDateTime",
        }
    }
}

impl RsType {
    /// The same type, able to hold `NULL` where the mapping allows it
    pub fn to_nullable(self) -> Self {
        match self {
            Self::Plain(Primitive::NaiveDateTime) => self,
            Self::Plain(primitive) => Self::Nullable(primitive),
            _ => self,
        }
    }
}

impl ToTokens for Primitive {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Self::String => quote! { String },
            Self::I64 => quote! { i64 },
            Self::F64 => quote! { f64 },
            Self::Bool => quote! { bool },
            Self::NaiveDateTime => quote! { NaiveDateTime },
        });
    }
}

impl ToTokens for RsType {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Self::Plain(primitive) => quote! { #primitive },
            Self::Nullable(primitive) => quote! { Option<#primitive> },
            Self::Bytes => quote! { Vec<u8> },
        });
    }
}

impl fmt::Display for RsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(primitive) => write!(f, "{}", primitive.as_str()),
            Self::Nullable(primitive) => write!(f, "Option<{}>", primitive.as_str()),
            Self::Bytes => write!(f, "Vec<u8>"),
        }
    }
}

fn wrap(primitive: Primitive, is_nullable: bool) -> RsType {
    if is_nullable {
        RsType::Nullable(primitive)
    } else {
        RsType::Plain(primitive)
    }
}

/// Map a column's SQL type to its Rust type and the import that type needs.
///
/// Byte sequences and timestamps carry no null wrapper. Anything outside
/// [`SqlTypeFamily`] is rejected, there is no fallback type.
pub fn map_column_type(
    table: &str,
    column: &str,
    raw_type: &str,
    is_nullable: bool,
) -> Result<(RsType, Option<&'static str>), SchemaError> {
    let family = raw_type.trim().parse::<SqlTypeFamily>().map_err(|_| {
        SchemaError::UnsupportedColumnType {
            table: table.to_owned(),
            column: column.to_owned(),
            raw_type: raw_type.to_owned(),
        }
    })?;
    Ok(match family {
        SqlTypeFamily::Text | SqlTypeFamily::Opaque => (wrap(Primitive::String, is_nullable), None),
        SqlTypeFamily::Binary => (RsType::Bytes, None),
        SqlTypeFamily::Temporal => (RsType::Plain(Primitive::NaiveDateTime), Some(CHRONO_IMPORT)),
        SqlTypeFamily::Integer => (wrap(Primitive::I64, is_nullable), None),
        SqlTypeFamily::Float => (wrap(Primitive::F64, is_nullable), None),
        SqlTypeFamily::Boolean => (wrap(Primitive::Bool, is_nullable), None),
    })
}
