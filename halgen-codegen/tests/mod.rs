use halgen_codegen::{
    CodegenConfig, ColumnSchema, EntityTransformer, EntityWriter, Schema, SchemaError,
};
use pretty_assertions::assert_eq;

fn column(table: &str, column: &str, data_type: &str, is_nullable: bool) -> ColumnSchema {
    ColumnSchema::new(table, column, data_type, is_nullable).unwrap()
}

fn traffic_ops_schema() -> Schema {
    Schema {
        columns: vec![
            column("cachegroups", "name", "varchar", false).with_primary_key(true),
            column("cachegroups", "short_name", "varchar", false),
            column("cachegroups", "latitude", "double", true),
            column("cachegroups", "last_updated", "timestamp", false),
            column("parameters", "id", "bigint", false).with_primary_key(true),
            column("parameters", "name", "varchar", false),
            column("parameters", "config_file", "varchar", false),
            column("parameters", "value", "varchar", false),
            column("parameters", "secure", "boolean", false),
            column("cachegroups_parameters", "cachegroup", "varchar", false)
                .with_primary_key(true)
                .with_foreign("cachegroups", "name"),
            column("cachegroups_parameters", "parameter_id", "bigint", false)
                .with_primary_key(true)
                .with_foreign("parameters", "id"),
            column("cachegroups_parameters", "created_at", "timestamp", false),
            column("cachegroups_parameters", "last_updated", "timestamp", false),
            column("log", "id", "int", false).with_primary_key(true),
            column("log", "level", "varchar", true),
            column("log", "message", "text", false),
            column("log", "ticketnum", "varchar", true),
            column("log", "last_updated", "timestamp", false),
        ],
        tables: vec![
            "cachegroups".to_owned(),
            "cachegroups_parameters".to_owned(),
            "log".to_owned(),
            "parameters".to_owned(),
        ],
    }
}

#[test]
fn test_generate_every_table() -> Result<(), SchemaError> {
    let schema = traffic_ops_schema();
    let config = CodegenConfig::default();

    let mut names = Vec::new();
    for table in schema.tables.iter() {
        let entity = EntityTransformer::transform(&schema, table, &config)?;
        let output = EntityWriter::write_entity(&entity, &config);
        assert!(!output.content.is_empty());
        names.push(output.name);
    }
    assert_eq!(
        names,
        vec![
            "cachegroups.rs",
            "cachegroups_parameters.rs",
            "log.rs",
            "parameters.rs"
        ]
    );
    Ok(())
}

#[test]
fn test_join_table_keys_address_links() -> Result<(), SchemaError> {
    let schema = traffic_ops_schema();
    let config = CodegenConfig::default();
    let entity = EntityTransformer::transform(&schema, "cachegroups_parameters", &config)?;

    assert_eq!(entity.get_record_field_names(), vec!["createdAt"]);
    assert_eq!(
        entity.get_link_field_names(),
        vec!["Self", "CachegroupsLink", "ParametersLink"]
    );
    assert_eq!(
        entity.operations.fetch_one.to_sql(),
        "select *, concat('/api/2.0/cachegroups_parameters', '/cachegroup/', cachegroup, \
         '/parameter_id/', parameter_id) as self, \
         concat('/api/2.0/cachegroups/', cachegroup) as cachegroups_name_ref, \
         concat('/api/2.0/parameters/', parameter_id) as parameters_id_ref \
         from cachegroups_parameters \
         WHERE cachegroup=:links.cachegroups_link.id AND parameter_id=:links.parameters_link.id"
    );
    assert_eq!(
        entity.operations.create.get_column_names(),
        vec!["cachegroup", "parameter_id", "created_at"]
    );
    Ok(())
}

#[test]
fn test_link_records_follow_references() -> Result<(), SchemaError> {
    let schema = traffic_ops_schema();
    let config = CodegenConfig::default();

    let cachegroups = EntityTransformer::transform(&schema, "cachegroups", &config)?;
    let link_record = cachegroups.link_record.expect("cachegroups is referenced");
    assert_eq!(link_record.name, "CachegroupsLink");
    assert_eq!(link_record.id_name, "name");
    assert_eq!(link_record.id_type.to_string(), "String");

    let log = EntityTransformer::transform(&schema, "log", &config)?;
    assert_eq!(log.link_record, None);
    assert_eq!(
        log.get_record_field_names(),
        vec!["level", "message", "ticketnum"]
    );
    Ok(())
}

#[test]
fn test_api_path_and_support_module() -> Result<(), SchemaError> {
    let schema = traffic_ops_schema();
    let config = CodegenConfig::new("/api/4.0/", "app::sql");
    let entity = EntityTransformer::transform(&schema, "log", &config)?;
    let output = EntityWriter::write_entity(&entity, &config);

    assert!(output.content.contains("concat('/api/4.0/log/', id) as self"));
    assert!(output.content.contains("use app :: sql :: {"));
    assert!(!output.content.contains("crate :: db"));
    Ok(())
}

#[test]
fn test_missing_primary_key() {
    let mut schema = traffic_ops_schema();
    schema
        .columns
        .push(column("goose_db_version", "version_id", "bigint", false));
    schema.tables.push("goose_db_version".to_owned());

    assert_eq!(
        EntityTransformer::transform(&schema, "goose_db_version", &CodegenConfig::default()),
        Err(SchemaError::MissingPrimaryKey {
            table: "goose_db_version".to_owned()
        })
    );
}
