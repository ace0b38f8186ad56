use crate::{KeySegment, Operations, RsType};
use std::collections::BTreeSet;

/// Column stamped with the current time on every update
pub const AUDIT_COLUMN: &str = "last_updated";

/// A flat field of a record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// Column the field is read from and written to
    pub column: String,
    /// Exposed (JSON) name, e.g. `createdAt`
    pub name: String,
    pub rs_type: RsType,
    pub required_import: Option<&'static str>,
}

/// The struct generated for a table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub fields: Vec<Field>,
}

/// Reference held by one foreign key column.
///
/// The first column referencing a table, a primary key segment if there is
/// one, gets the table's link (`OwnersLink`, JSON `owners`, alias
/// `<foreign_table>_<foreign_column>_ref`). Further columns referencing the
/// same table are named after themselves (`ReviewerIdLink`, JSON
/// `reviewer_id`, alias `<column>_ref`). Every link has the type
/// `<ForeignTable>Link`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkField {
    /// Field name, e.g. `OwnersLink`
    pub name: String,
    /// Exposed (JSON) name
    pub json_name: String,
    pub foreign_table: String,
    pub foreign_column: String,
    /// Owning column holding the foreign key value
    pub column: String,
    /// Alias of the computed related-resource reference
    pub ref_alias: String,
}

/// HAL links embedded in a record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Links {
    pub name: String,
    /// Always `Self`, serialized as `_self`
    pub self_field: String,
    pub link_fields: Vec<LinkField>,
}

/// The link other tables embed when they reference this table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRecord {
    pub name: String,
    /// Exposed name of the id, the referenced column
    pub id_name: String,
    pub id_type: RsType,
    pub id_import: Option<&'static str>,
}

/// Everything synthesized for one table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub table_name: String,
    pub record: Record,
    pub links: Links,
    pub link_record: Option<LinkRecord>,
    pub primary_key: Vec<KeySegment>,
    pub has_audit_column: bool,
    pub operations: Operations,
}

impl Entity {
    pub fn get_record_field_names(&self) -> Vec<&str> {
        self.record
            .fields
            .iter()
            .map(|field| field.name.as_str())
            .collect()
    }

    pub fn get_link_field_names(&self) -> Vec<&str> {
        std::iter::once(self.links.self_field.as_str())
            .chain(self.links.link_fields.iter().map(|link| link.name.as_str()))
            .collect()
    }

    pub fn get_primary_key_columns(&self) -> Vec<&str> {
        self.primary_key
            .iter()
            .map(|segment| segment.column.as_str())
            .collect()
    }

    /// Imports needed by the types that appear in the generated module
    pub fn get_required_imports(&self) -> BTreeSet<&'static str> {
        let mut imports: BTreeSet<&'static str> = self
            .record
            .fields
            .iter()
            .filter_map(|field| field.required_import)
            .collect();
        imports.extend(
            self.primary_key
                .iter()
                .filter_map(|segment| segment.required_import),
        );
        if let Some(link_record) = &self.link_record {
            imports.extend(link_record.id_import);
        }
        imports
    }
}
