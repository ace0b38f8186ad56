use crate::{KeySegment, rust_ident};
use proc_macro2::TokenStream;
use quote::quote;
use std::fmt;

/// Method and path a generated handler serves, e.g. `GET /api/2.0/log/{id}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    pub method: &'static str,
    pub path: String,
}

impl Route {
    /// `<api_path><table>`
    pub fn collection(method: &'static str, api_path: &str, table: &str) -> Self {
        Self {
            method,
            path: format!("{api_path}{table}"),
        }
    }

    /// `<api_path><table>/{id}`, or `<api_path><table>/k1/{k1}/k2/{k2}` for a
    /// composite key, the same shape as the self reference
    pub fn item(
        method: &'static str,
        api_path: &str,
        table: &str,
        key_columns: &[String],
    ) -> Self {
        let path = if let [column] = key_columns {
            format!("{api_path}{table}/{{{column}}}")
        } else {
            let mut path = format!("{api_path}{table}");
            for column in key_columns.iter() {
                path.push_str(&format!("/{column}/{{{column}}}"));
            }
            path
        };
        Self { method, path }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// `concat(...) as self`, the path of a row below the API prefix
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelfReference {
    pub table: String,
    pub key_columns: Vec<String>,
}

/// `concat(...) as <alias>`, the path of the row a foreign key points to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedReference {
    pub foreign_table: String,
    pub column: String,
    pub alias: String,
}

/// Columns selected by both fetch operations
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    pub table: String,
    pub api_path: String,
    pub self_reference: SelfReference,
    pub related_references: Vec<RelatedReference>,
}

/// `WHERE` clause over the full primary key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predicate {
    pub segments: Vec<KeySegment>,
}

/// Where a written column takes its value from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueSource {
    /// A flat field of the decoded record
    Field,
    /// The `id` of the named link field of the decoded record
    Link(String),
    /// The current time, for the audit column
    Now,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnBinding {
    pub column: String,
    pub source: ValueSource,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchOne {
    pub name: String,
    pub route: Route,
    pub key: Vec<KeySegment>,
    pub projection: Projection,
    pub predicate: Predicate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchAll {
    pub name: String,
    pub route: Route,
    pub projection: Projection,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Create {
    pub name: String,
    pub route: Route,
    pub table: String,
    pub columns: Vec<ColumnBinding>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Update {
    pub name: String,
    pub route: Route,
    pub table: String,
    pub key: Vec<KeySegment>,
    pub assignments: Vec<ColumnBinding>,
    pub predicate: Predicate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delete {
    pub name: String,
    pub route: Route,
    pub table: String,
    pub key: Vec<KeySegment>,
    pub predicate: Predicate,
}

/// The five operations generated for every table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operations {
    pub fetch_one: FetchOne,
    pub fetch_all: FetchAll,
    pub create: Create,
    pub update: Update,
    pub delete: Delete,
}

impl SelfReference {
    pub fn to_sql(&self, api_path: &str) -> String {
        if let [column] = self.key_columns.as_slice() {
            return format!("concat('{api_path}{}/', {column}) as self", self.table);
        }
        let mut sql = format!("concat('{api_path}{}'", self.table);
        for column in self.key_columns.iter() {
            sql.push_str(&format!(", '/{column}/', {column}"));
        }
        sql.push_str(") as self");
        sql
    }
}

impl RelatedReference {
    pub fn to_sql(&self, api_path: &str) -> String {
        format!(
            "concat('{api_path}{}/', {}) as {}",
            self.foreign_table, self.column, self.alias
        )
    }
}

impl Projection {
    pub fn to_sql(&self) -> String {
        let mut sql = format!("select *, {}", self.self_reference.to_sql(&self.api_path));
        for related in self.related_references.iter() {
            sql.push_str(", ");
            sql.push_str(&related.to_sql(&self.api_path));
        }
        sql.push_str(" from ");
        sql.push_str(&self.table);
        sql
    }
}

impl Predicate {
    pub fn to_sql(&self) -> String {
        let conditions: Vec<String> = self
            .segments
            .iter()
            .map(|segment| format!("{}=:{}", segment.column, segment.address.param_name()))
            .collect();
        format!("WHERE {}", conditions.join(" AND "))
    }
}

impl ValueSource {
    /// Expression the generated code reads the value from, given the decoded record `v`
    pub fn value_tokens(&self, column: &str) -> TokenStream {
        match self {
            Self::Field => {
                let field = rust_ident(column);
                quote! { v.#field }
            }
            Self::Link(link) => {
                let link = rust_ident(link);
                quote! { v.links.#link.id }
            }
            Self::Now => {
                let column = rust_ident(column);
                quote! { #column }
            }
        }
    }
}

impl FetchOne {
    pub fn to_sql(&self) -> String {
        format!("{} {}", self.projection.to_sql(), self.predicate.to_sql())
    }
}

impl FetchAll {
    pub fn to_sql(&self) -> String {
        self.projection.to_sql()
    }
}

impl Create {
    pub fn get_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|binding| binding.column.as_str())
            .collect()
    }

    pub fn to_sql(&self) -> String {
        let columns = self.get_column_names();
        let params: Vec<String> = self
            .columns
            .iter()
            .map(|binding| format!(":{}", binding.column))
            .collect();
        format!(
            "INSERT INTO {}({}) VALUES ({})",
            self.table,
            columns.join(","),
            params.join(",")
        )
    }
}

impl Update {
    pub fn stamps_audit_column(&self) -> bool {
        self.assignments
            .iter()
            .any(|binding| binding.source == ValueSource::Now)
    }

    pub fn to_sql(&self) -> String {
        let assignments: Vec<String> = self
            .assignments
            .iter()
            .map(|binding| format!("{0} = :{0}", binding.column))
            .collect();
        format!(
            "UPDATE {} SET {} {}",
            self.table,
            assignments.join(","),
            self.predicate.to_sql()
        )
    }
}

impl Delete {
    pub fn to_sql(&self) -> String {
        format!("DELETE FROM {} {}", self.table, self.predicate.to_sql())
    }
}
