//! Schemas shared by the unit tests

use crate::{ColumnSchema, Schema};

fn column(table: &str, column: &str, data_type: &str, is_nullable: bool) -> ColumnSchema {
    ColumnSchema::new(table, column, data_type, is_nullable).unwrap()
}

/// `owners` 1-N `widgets`, plus `goose_db_version` without a primary key
pub fn widgets_schema() -> Schema {
    Schema {
        columns: vec![
            column("owners", "id", "int", false).with_primary_key(true),
            column("owners", "name", "varchar", false),
            column("widgets", "id", "int", false).with_primary_key(true),
            column("widgets", "name", "varchar", false),
            column("widgets", "owner_id", "int", true).with_foreign("owners", "id"),
            column("widgets", "created_at", "timestamp", false),
            column("widgets", "last_updated", "timestamp", false),
            column("goose_db_version", "version_id", "bigint", false),
            column("goose_db_version", "tstamp", "timestamp", true),
        ],
        tables: vec![
            "goose_db_version".to_owned(),
            "owners".to_owned(),
            "widgets".to_owned(),
        ],
    }
}

/// Join table whose primary key is made of two foreign keys
pub fn cachegroups_parameters_schema() -> Schema {
    Schema {
        columns: vec![
            column("cachegroups", "id", "bigint", false).with_primary_key(true),
            column("cachegroups", "name", "text", false),
            column("cachegroups", "type", "text", true),
            column("parameters", "id", "bigint", false).with_primary_key(true),
            column("parameters", "name", "text", false),
            column("parameters", "value", "text", false),
            column("cachegroups_parameters", "cachegroup", "bigint", false)
                .with_primary_key(true)
                .with_foreign("cachegroups", "id"),
            column("cachegroups_parameters", "parameter", "bigint", false)
                .with_primary_key(true)
                .with_foreign("parameters", "id"),
            column("cachegroups_parameters", "last_updated", "timestamp", false),
        ],
        tables: vec![
            "cachegroups".to_owned(),
            "cachegroups_parameters".to_owned(),
            "parameters".to_owned(),
        ],
    }
}

/// Self referencing table with two foreign keys to the same table
pub fn cachegroup_schema() -> Schema {
    Schema {
        columns: vec![
            column("cachegroup", "id", "bigint", false).with_primary_key(true),
            column("cachegroup", "name", "text", false),
            column("cachegroup", "parent_cachegroup_id", "bigint", true)
                .with_foreign("cachegroup", "id"),
            column("cachegroup", "secondary_parent_cachegroup_id", "bigint", true)
                .with_foreign("cachegroup", "id"),
        ],
        tables: vec!["cachegroup".to_owned()],
    }
}
