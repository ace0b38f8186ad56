use crate::{
    AUDIT_COLUMN, CodegenConfig, ColumnBinding, ColumnSchema, Create, Delete, Entity, FetchAll,
    FetchOne, Field, KeySegment, LinkField, LinkRecord, Links, Operations, Predicate, Projection,
    Record, RelatedReference, Route, Schema, SchemaError, SelfReference, TableSchema, Update,
    ValueSource, exported_name, field_name, link_name, plural, resolve_primary_key, singular,
};
use tracing::debug;

#[derive(Clone, Debug)]
pub struct EntityTransformer;

impl EntityTransformer {
    /// Synthesize the record, links and operations of `table_name`.
    ///
    /// Fails before anything is built when the table has no primary key.
    /// Other tables of `schema` only contribute the link record decision.
    pub fn transform(
        schema: &Schema,
        table_name: &str,
        config: &CodegenConfig,
    ) -> Result<Entity, SchemaError> {
        let table = schema.table(table_name);
        let primary_key = resolve_primary_key(&table)?;
        debug!(
            "Primary key of `{}`: {:?}",
            table_name,
            primary_key
                .iter()
                .map(|segment| segment.column.as_str())
                .collect::<Vec<_>>()
        );

        let record = Self::gen_record(&table);
        let links = Self::gen_links(&table);
        let link_record = Self::gen_link_record(schema, &table, &primary_key);
        let has_audit_column = table.has_column(AUDIT_COLUMN);
        let operations = Self::gen_operations(&table, &primary_key, &links, config);

        Ok(Entity {
            table_name: table_name.to_owned(),
            record,
            links,
            link_record,
            primary_key,
            has_audit_column,
            operations,
        })
    }

    fn gen_record(table: &TableSchema<'_>) -> Record {
        let fields = table
            .columns
            .iter()
            .filter(|col| !col.primary_key && !col.is_foreign_key())
            .filter(|col| col.column_name != AUDIT_COLUMN)
            .map(|col| Field {
                column: col.column_name.clone(),
                name: field_name(&col.column_name),
                rs_type: col.rs_type,
                required_import: col.required_import,
            })
            .collect();
        Record {
            name: exported_name(table.name),
            fields,
        }
    }

    fn gen_links(table: &TableSchema<'_>) -> Links {
        let table_links: Vec<LinkField> = table
            .columns
            .iter()
            .filter(|col| Self::owns_table_link(table, col))
            .filter_map(|col| {
                let foreign = col.foreign.as_ref()?;
                Some(LinkField {
                    name: link_name(&foreign.table),
                    json_name: foreign.table.clone(),
                    foreign_table: foreign.table.clone(),
                    foreign_column: foreign.column.clone(),
                    column: col.column_name.clone(),
                    ref_alias: ref_alias(&foreign.table, &foreign.column),
                })
            })
            .collect();
        let mut link_fields: Vec<LinkField> = Vec::new();
        for col in table.columns.iter() {
            let Some(foreign) = &col.foreign else {
                continue;
            };
            let owned = table_links
                .iter()
                .find(|link| link.column == col.column_name);
            let link = if let Some(owned) = owned {
                owned.clone()
            } else {
                let taken = |candidate: &str| {
                    table_links.iter().chain(link_fields.iter()).any(|link| {
                        link.name == candidate
                            || link.json_name == candidate
                            || link.ref_alias == candidate
                    })
                };
                let mut name = format!("{}Link", exported_name(&col.column_name));
                let mut json_name = col.column_name.clone();
                let mut alias = format!("{}_ref", col.column_name);
                if taken(name.as_str()) || taken(json_name.as_str()) || taken(alias.as_str()) {
                    name = format!(
                        "{}{}",
                        exported_name(&col.column_name),
                        link_name(&foreign.table)
                    );
                    json_name = format!("{}_{}", col.column_name, foreign.table);
                    alias = format!(
                        "{}_{}",
                        col.column_name,
                        ref_alias(&foreign.table, &foreign.column)
                    );
                }
                debug!(
                    "`{}.{}` is another reference to `{}`, linked as `{}`",
                    table.name, col.column_name, foreign.table, name
                );
                LinkField {
                    name,
                    json_name,
                    foreign_table: foreign.table.clone(),
                    foreign_column: foreign.column.clone(),
                    column: col.column_name.clone(),
                    ref_alias: alias,
                }
            };
            link_fields.push(link);
        }
        Links {
            name: format!("{}Links", exported_name(table.name)),
            self_field: "Self".to_owned(),
            link_fields,
        }
    }

    /// Whether `col` holds the table link to the table it references: the
    /// first referencing primary key segment, otherwise the first referencing
    /// column. Key segments address their value through this link.
    fn owns_table_link(table: &TableSchema<'_>, col: &ColumnSchema) -> bool {
        let Some(foreign) = &col.foreign else {
            return false;
        };
        let referencing = || {
            table.columns.iter().copied().filter(|other| {
                other
                    .foreign
                    .as_ref()
                    .is_some_and(|other_foreign| other_foreign.table == foreign.table)
            })
        };
        let owner = referencing()
            .find(|other| other.primary_key)
            .or_else(|| referencing().next());
        owner.is_some_and(|owner| owner.column_name == col.column_name)
    }

    /// Only tables that some foreign key points to get a link record. Its id
    /// has the type of the referenced column, nullable when any referencing
    /// column is.
    fn gen_link_record(
        schema: &Schema,
        table: &TableSchema<'_>,
        primary_key: &[KeySegment],
    ) -> Option<LinkRecord> {
        let referencing: Vec<_> = schema.referencing(table.name).collect();
        let foreign = referencing.first()?.foreign.as_ref()?;
        let (mut id_type, id_import) = match table.column(&foreign.column) {
            Some(col) => (col.rs_type, col.required_import),
            None => {
                let segment = primary_key.first()?;
                (segment.rs_type, segment.required_import)
            }
        };
        if referencing.iter().any(|col| col.is_nullable) {
            id_type = id_type.to_nullable();
        }
        Some(LinkRecord {
            name: link_name(table.name),
            id_name: foreign.column.clone(),
            id_type,
            id_import,
        })
    }

    fn gen_operations(
        table: &TableSchema<'_>,
        primary_key: &[KeySegment],
        links: &Links,
        config: &CodegenConfig,
    ) -> Operations {
        let singular_name = singular(table.name);
        let plural_name = plural(table.name);
        let projection = Self::gen_projection(table, primary_key, links, config);
        let api_path = config.api_path.as_str();
        let key_columns: Vec<String> = primary_key
            .iter()
            .map(|segment| segment.column.clone())
            .collect();
        let fetch_all_name = if plural_name == singular_name {
            format!("get_all_{plural_name}")
        } else {
            format!("get_{plural_name}")
        };
        let predicate = Predicate {
            segments: primary_key.to_vec(),
        };

        let create = Create {
            name: format!("post_{singular_name}"),
            route: Route::collection("POST", api_path, table.name),
            table: table.name.to_owned(),
            columns: table
                .columns
                .iter()
                .filter(|col| col.column_name != AUDIT_COLUMN)
                .filter(|col| !col.primary_key || col.is_foreign_key())
                .map(|col| Self::gen_binding(col, links))
                .collect(),
        };

        let update = Update {
            name: format!("put_{singular_name}"),
            route: Route::item("PUT", api_path, table.name, &key_columns),
            table: table.name.to_owned(),
            key: primary_key.to_vec(),
            assignments: table
                .columns
                .iter()
                .filter(|col| !col.primary_key)
                .map(|col| {
                    if col.column_name == AUDIT_COLUMN {
                        ColumnBinding {
                            column: col.column_name.clone(),
                            source: ValueSource::Now,
                        }
                    } else {
                        Self::gen_binding(col, links)
                    }
                })
                .collect(),
            predicate: predicate.clone(),
        };

        Operations {
            fetch_one: FetchOne {
                name: format!("get_{singular_name}"),
                route: Route::item("GET", api_path, table.name, &key_columns),
                key: primary_key.to_vec(),
                projection: projection.clone(),
                predicate: predicate.clone(),
            },
            fetch_all: FetchAll {
                name: fetch_all_name,
                route: Route::collection("GET", api_path, table.name),
                projection,
            },
            create,
            update,
            delete: Delete {
                name: format!("del_{singular_name}"),
                route: Route::item("DELETE", api_path, table.name, &key_columns),
                table: table.name.to_owned(),
                key: primary_key.to_vec(),
                predicate,
            },
        }
    }

    fn gen_projection(
        table: &TableSchema<'_>,
        primary_key: &[KeySegment],
        links: &Links,
        config: &CodegenConfig,
    ) -> Projection {
        Projection {
            table: table.name.to_owned(),
            api_path: config.api_path.clone(),
            self_reference: SelfReference {
                table: table.name.to_owned(),
                key_columns: primary_key
                    .iter()
                    .map(|segment| segment.column.clone())
                    .collect(),
            },
            related_references: links
                .link_fields
                .iter()
                .map(|link| RelatedReference {
                    foreign_table: link.foreign_table.clone(),
                    column: link.column.clone(),
                    alias: link.ref_alias.clone(),
                })
                .collect(),
        }
    }

    /// Foreign key columns are stored flat but read from their own link
    fn gen_binding(col: &ColumnSchema, links: &Links) -> ColumnBinding {
        let link = links
            .link_fields
            .iter()
            .find(|link| link.column == col.column_name);
        ColumnBinding {
            column: col.column_name.clone(),
            source: match link {
                Some(link) => ValueSource::Link(link.name.clone()),
                None => ValueSource::Field,
            },
        }
    }
}

fn ref_alias(foreign_table: &str, foreign_column: &str) -> String {
    format!("{foreign_table}_{foreign_column}_ref")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ParamAddress, Primitive, RsType,
        tests_cfg::{cachegroup_schema, cachegroups_parameters_schema, widgets_schema},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transform_widgets() {
        let schema = widgets_schema();
        let entity =
            EntityTransformer::transform(&schema, "widgets", &CodegenConfig::default()).unwrap();

        assert_eq!(entity.record.name, "Widgets");
        assert_eq!(entity.get_record_field_names(), vec!["name", "createdAt"]);
        assert_eq!(entity.links.name, "WidgetsLinks");
        assert_eq!(entity.get_link_field_names(), vec!["Self", "OwnersLink"]);
        assert_eq!(entity.links.link_fields[0].column, "owner_id");
        assert_eq!(entity.links.link_fields[0].ref_alias, "owners_id_ref");
        assert_eq!(entity.link_record, None);
        assert_eq!(entity.get_primary_key_columns(), vec!["id"]);
        assert!(entity.has_audit_column);

        let operations = &entity.operations;
        assert_eq!(operations.fetch_one.name, "get_widget");
        assert_eq!(operations.fetch_all.name, "get_widgets");
        assert_eq!(operations.create.name, "post_widget");
        assert_eq!(operations.update.name, "put_widget");
        assert_eq!(operations.delete.name, "del_widget");

        assert_eq!(
            operations.fetch_one.to_sql(),
            "select *, concat('/api/2.0/widgets/', id) as self, \
             concat('/api/2.0/owners/', owner_id) as owners_id_ref \
             from widgets WHERE id=:id"
        );
        assert_eq!(
            operations.fetch_all.to_sql(),
            "select *, concat('/api/2.0/widgets/', id) as self, \
             concat('/api/2.0/owners/', owner_id) as owners_id_ref from widgets"
        );
        assert_eq!(
            operations.create.get_column_names(),
            vec!["name", "owner_id", "created_at"]
        );
        assert_eq!(
            operations.create.columns[1].source,
            ValueSource::Link("OwnersLink".to_owned())
        );
        assert_eq!(
            operations.create.to_sql(),
            "INSERT INTO widgets(name,owner_id,created_at) VALUES (:name,:owner_id,:created_at)"
        );
        assert!(operations.update.stamps_audit_column());
        assert_eq!(
            operations.update.to_sql(),
            "UPDATE widgets SET name = :name,owner_id = :owner_id,\
             created_at = :created_at,last_updated = :last_updated WHERE id=:id"
        );
        assert_eq!(
            operations.delete.to_sql(),
            "DELETE FROM widgets WHERE id=:id"
        );
        assert_eq!(
            entity.get_required_imports().into_iter().collect::<Vec<_>>(),
            vec!["chrono::NaiveDateTime"]
        );
    }

    #[test]
    fn test_transform_referenced_table() {
        let schema = widgets_schema();
        let entity =
            EntityTransformer::transform(&schema, "owners", &CodegenConfig::default()).unwrap();

        assert_eq!(entity.get_record_field_names(), vec!["name"]);
        assert_eq!(entity.get_link_field_names(), vec!["Self"]);
        assert!(!entity.has_audit_column);
        assert!(!entity.operations.update.stamps_audit_column());
        assert_eq!(
            entity.link_record,
            Some(LinkRecord {
                name: "OwnersLink".to_owned(),
                id_name: "id".to_owned(),
                id_type: RsType::Nullable(Primitive::I64),
                id_import: None,
            })
        );
        assert_eq!(
            entity.operations.update.to_sql(),
            "UPDATE owners SET name = :name WHERE id=:id"
        );
    }

    #[test]
    fn test_transform_composite_key() {
        let schema = cachegroups_parameters_schema();
        let config = CodegenConfig::new("/api/1.2/", "crate::db");
        let entity =
            EntityTransformer::transform(&schema, "cachegroups_parameters", &config).unwrap();

        assert_eq!(entity.get_record_field_names(), Vec::<&str>::new());
        assert_eq!(
            entity.get_link_field_names(),
            vec!["Self", "CachegroupsLink", "ParametersLink"]
        );
        assert_eq!(
            entity
                .primary_key
                .iter()
                .map(|segment| segment.address.clone())
                .collect::<Vec<_>>(),
            vec![
                ParamAddress::Link {
                    foreign_table: "cachegroups".to_owned()
                },
                ParamAddress::Link {
                    foreign_table: "parameters".to_owned()
                },
            ]
        );

        let operations = &entity.operations;
        assert_eq!(operations.fetch_one.name, "get_cachegroups_parameter");
        assert_eq!(operations.fetch_all.name, "get_cachegroups_parameters");
        assert_eq!(
            operations.fetch_one.to_sql(),
            "select *, concat('/api/1.2/cachegroups_parameters', '/cachegroup/', cachegroup, \
             '/parameter/', parameter) as self, \
             concat('/api/1.2/cachegroups/', cachegroup) as cachegroups_id_ref, \
             concat('/api/1.2/parameters/', parameter) as parameters_id_ref \
             from cachegroups_parameters \
             WHERE cachegroup=:links.cachegroups_link.id AND parameter=:links.parameters_link.id"
        );
        assert_eq!(
            operations.create.to_sql(),
            "INSERT INTO cachegroups_parameters(cachegroup,parameter) VALUES (:cachegroup,:parameter)"
        );
        assert_eq!(
            operations.update.to_sql(),
            "UPDATE cachegroups_parameters SET last_updated = :last_updated \
             WHERE cachegroup=:links.cachegroups_link.id AND parameter=:links.parameters_link.id"
        );
        assert_eq!(
            operations.delete.to_sql(),
            "DELETE FROM cachegroups_parameters \
             WHERE cachegroup=:links.cachegroups_link.id AND parameter=:links.parameters_link.id"
        );
    }

    #[test]
    fn test_link_record_of_key_referenced_table() {
        let schema = cachegroups_parameters_schema();
        let entity =
            EntityTransformer::transform(&schema, "parameters", &CodegenConfig::default())
                .unwrap();
        assert_eq!(
            entity.link_record,
            Some(LinkRecord {
                name: "ParametersLink".to_owned(),
                id_name: "id".to_owned(),
                id_type: RsType::Plain(Primitive::I64),
                id_import: None,
            })
        );
    }

    #[test]
    fn test_missing_primary_key_is_per_table() {
        let schema = widgets_schema();
        let config = CodegenConfig::default();
        assert_eq!(
            EntityTransformer::transform(&schema, "goose_db_version", &config),
            Err(SchemaError::MissingPrimaryKey {
                table: "goose_db_version".to_owned()
            })
        );
        assert!(EntityTransformer::transform(&schema, "widgets", &config).is_ok());
        assert!(EntityTransformer::transform(&schema, "owners", &config).is_ok());
    }

    #[test]
    fn test_foreign_keys_to_same_table_get_own_links() {
        let schema = cachegroup_schema();
        let entity =
            EntityTransformer::transform(&schema, "cachegroup", &CodegenConfig::default())
                .unwrap();

        assert_eq!(
            entity.get_link_field_names(),
            vec!["Self", "CachegroupLink", "SecondaryParentCachegroupIdLink"]
        );
        let links = &entity.links.link_fields;
        assert_eq!(links[0].column, "parent_cachegroup_id");
        assert_eq!(links[0].json_name, "cachegroup");
        assert_eq!(links[0].ref_alias, "cachegroup_id_ref");
        assert_eq!(links[1].column, "secondary_parent_cachegroup_id");
        assert_eq!(links[1].json_name, "secondary_parent_cachegroup_id");
        assert_eq!(links[1].ref_alias, "secondary_parent_cachegroup_id_ref");

        let operations = &entity.operations;
        assert_eq!(
            operations.create.columns,
            vec![
                ColumnBinding {
                    column: "name".to_owned(),
                    source: ValueSource::Field,
                },
                ColumnBinding {
                    column: "parent_cachegroup_id".to_owned(),
                    source: ValueSource::Link("CachegroupLink".to_owned()),
                },
                ColumnBinding {
                    column: "secondary_parent_cachegroup_id".to_owned(),
                    source: ValueSource::Link("SecondaryParentCachegroupIdLink".to_owned()),
                },
            ]
        );
        assert_eq!(operations.update.assignments, operations.create.columns);
        assert_eq!(
            operations.fetch_all.to_sql(),
            "select *, concat('/api/2.0/cachegroup/', id) as self, \
             concat('/api/2.0/cachegroup/', parent_cachegroup_id) as cachegroup_id_ref, \
             concat('/api/2.0/cachegroup/', secondary_parent_cachegroup_id) \
             as secondary_parent_cachegroup_id_ref from cachegroup"
        );
    }

    #[test]
    fn test_key_segment_owns_table_link() {
        let schema = Schema {
            columns: vec![
                ColumnSchema::new("widget_owners", "reviewer_id", "int", true)
                    .unwrap()
                    .with_foreign("owners", "id"),
                ColumnSchema::new("widget_owners", "owners", "int", true)
                    .unwrap()
                    .with_foreign("owners", "id"),
                ColumnSchema::new("widget_owners", "owner_id", "int", false)
                    .unwrap()
                    .with_primary_key(true)
                    .with_foreign("owners", "id"),
            ],
            tables: vec!["widget_owners".to_owned()],
        };
        let entity =
            EntityTransformer::transform(&schema, "widget_owners", &CodegenConfig::default())
                .unwrap();

        assert_eq!(
            entity.get_link_field_names(),
            vec!["Self", "ReviewerIdLink", "OwnersOwnersLink", "OwnersLink"]
        );
        let owners = &entity.links.link_fields[1];
        assert_eq!(owners.json_name, "owners_owners");
        assert_eq!(owners.ref_alias, "owners_owners_id_ref");
        assert_eq!(entity.links.link_fields[2].column, "owner_id");
        assert_eq!(
            entity.operations.delete.to_sql(),
            "DELETE FROM widget_owners WHERE owner_id=:links.owners_link.id"
        );
    }

    #[test]
    fn test_uncountable_table_names() {
        let schema = Schema {
            columns: vec![
                ColumnSchema::new("equipment", "id", "int", false)
                    .unwrap()
                    .with_primary_key(true),
            ],
            tables: vec!["equipment".to_owned()],
        };
        let entity =
            EntityTransformer::transform(&schema, "equipment", &CodegenConfig::default())
                .unwrap();
        assert_eq!(entity.operations.fetch_one.name, "get_equipment");
        assert_eq!(entity.operations.fetch_all.name, "get_all_equipment");
    }

    #[test]
    fn test_routes() {
        let schema = cachegroups_parameters_schema();
        let entity = EntityTransformer::transform(
            &schema,
            "cachegroups_parameters",
            &CodegenConfig::default(),
        )
        .unwrap();
        let operations = &entity.operations;
        assert_eq!(
            operations.fetch_one.route.to_string(),
            "GET /api/2.0/cachegroups_parameters/cachegroup/{cachegroup}/parameter/{parameter}"
        );
        assert_eq!(
            operations.fetch_all.route.to_string(),
            "GET /api/2.0/cachegroups_parameters"
        );
        assert_eq!(
            operations.create.route.to_string(),
            "POST /api/2.0/cachegroups_parameters"
        );
        assert_eq!(operations.update.route.method, "PUT");
        assert_eq!(operations.delete.route.method, "DELETE");
    }
}
