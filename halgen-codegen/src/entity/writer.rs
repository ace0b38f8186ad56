use crate::{
    CodegenConfig, Create, Delete, Entity, FetchAll, FetchOne, KeySegment, LinkRecord, Route,
    ParamAddress, Update, ValueSource, link_name, module_name, rust_ident, type_ident,
};
use proc_macro2::{Ident, TokenStream};
use quote::quote;
use tracing::info;

#[derive(Clone, Debug)]
pub struct EntityWriter;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub content: String,
}

const LICENSE_HEADER: &str = r#"// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License."#;

impl EntityWriter {
    /// Render the module of one table, named `<table>.rs`
    pub fn write_entity(entity: &Entity, config: &CodegenConfig) -> OutputFile {
        let entity_file = format!("{}.rs", module_name(&entity.table_name));
        info!("Generating {}", entity_file);
        for field in entity.record.fields.iter() {
            info!("    > {} as `{}`: {}", field.column, field.name, field.rs_type);
        }
        for link in entity.links.link_fields.iter() {
            info!(
                "    > {} as `{}`: {}.{}",
                link.column, link.foreign_table, link.foreign_table, link.foreign_column
            );
        }

        let mut lines = Vec::new();
        Self::write_doc_comment(&mut lines, &entity.table_name);
        Self::write(&mut lines, Self::gen_code_blocks(entity, config));
        OutputFile {
            name: entity_file,
            content: lines.join("\n\n"),
        }
    }

    pub fn write(lines: &mut Vec<String>, code_blocks: Vec<TokenStream>) {
        lines.extend(
            code_blocks
                .into_iter()
                .map(|code_block| code_block.to_string())
                .collect::<Vec<_>>(),
        );
    }

    pub fn write_doc_comment(lines: &mut Vec<String>, table_name: &str) {
        let ver = env!("CARGO_PKG_VERSION");
        lines.push(LICENSE_HEADER.to_owned());
        lines.push(format!(
            "//! `{table_name}` data model. Generated by halgen-codegen {ver}"
        ));
    }

    pub fn gen_code_blocks(entity: &Entity, config: &CodegenConfig) -> Vec<TokenStream> {
        let operations = &entity.operations;
        let mut code_blocks = vec![
            Self::gen_import(entity, config),
            Self::gen_record_struct(entity),
            Self::gen_links_struct(entity),
        ];
        if let Some(link_record) = &entity.link_record {
            code_blocks.push(Self::gen_link_struct(link_record));
        }
        code_blocks.extend([
            Self::gen_impl_from_named_row(entity),
            Self::gen_fetch_one(entity, &operations.fetch_one),
            Self::gen_fetch_all(entity, &operations.fetch_all),
            Self::gen_create(entity, &operations.create),
            Self::gen_update(entity, &operations.update),
            Self::gen_delete(&operations.delete),
        ]);
        code_blocks
    }

    pub fn gen_import(entity: &Entity, config: &CodegenConfig) -> TokenStream {
        let support_module = config.support_module.iter().map(|segment| type_ident(segment));
        let required_imports = entity.get_required_imports().into_iter().map(|import| {
            let path = import.split("::").map(type_ident);
            quote! {
                use #(#path)::*;
            }
        });
        quote! {
            use #(#support_module)::*::{Db, Error, ExecResult, FromNamedRow, NamedArgs, NamedRow};
            #(#required_imports)*
            use serde::{Deserialize, Serialize};
        }
    }

    pub fn gen_record_struct(entity: &Entity) -> TokenStream {
        let record_name = type_ident(&entity.record.name);
        let links_name = type_ident(&entity.links.name);
        let fields = entity.record.fields.iter().map(|field| {
            let ident = rust_ident(&field.column);
            let json_name = &field.name;
            let rs_type = &field.rs_type;
            quote! {
                #[serde(rename = #json_name)]
                pub #ident: #rs_type,
            }
        });
        quote! {
            #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
            pub struct #record_name {
                #(#fields)*
                #[serde(rename = "_links")]
                pub links: #links_name,
            }
        }
    }

    pub fn gen_links_struct(entity: &Entity) -> TokenStream {
        let links_name = type_ident(&entity.links.name);
        let self_ident = rust_ident(&entity.links.self_field);
        let link_fields = entity.links.link_fields.iter().map(|link| {
            let ident = rust_ident(&link.name);
            let json_name = &link.json_name;
            let link_type = Self::gen_link_type(&link.foreign_table);
            quote! {
                #[serde(rename = #json_name)]
                pub #ident: #link_type,
            }
        });
        quote! {
            #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
            pub struct #links_name {
                #[serde(rename = "_self", default)]
                pub #self_ident: String,
                #(#link_fields)*
            }
        }
    }

    pub fn gen_link_struct(link_record: &LinkRecord) -> TokenStream {
        let link_name = type_ident(&link_record.name);
        let id_name = &link_record.id_name;
        let id_type = &link_record.id_type;
        quote! {
            #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
            pub struct #link_name {
                #[serde(rename = #id_name)]
                pub id: #id_type,
                #[serde(rename = "_ref", default)]
                pub r#ref: String,
            }
        }
    }

    pub fn gen_impl_from_named_row(entity: &Entity) -> TokenStream {
        let record_name = type_ident(&entity.record.name);
        let links_name = type_ident(&entity.links.name);
        let self_ident = rust_ident(&entity.links.self_field);
        let fields = entity.record.fields.iter().map(|field| {
            let ident = rust_ident(&field.column);
            let column = &field.column;
            quote! {
                #ident: row.get(#column)?,
            }
        });
        let link_fields = entity.links.link_fields.iter().map(|link| {
            let ident = rust_ident(&link.name);
            let link_type = Self::gen_link_type(&link.foreign_table);
            let column = &link.column;
            let ref_alias = &link.ref_alias;
            quote! {
                #ident: #link_type {
                    id: row.get(#column)?,
                    r#ref: row.get::<Option<String>>(#ref_alias)?.unwrap_or_default(),
                },
            }
        });
        quote! {
            impl FromNamedRow for #record_name {
                fn from_named_row(row: &NamedRow) -> Result<Self, Error> {
                    Ok(Self {
                        #(#fields)*
                        links: #links_name {
                            #self_ident: row.get("self")?,
                            #(#link_fields)*
                        },
                    })
                }
            }
        }
    }

    pub fn gen_fetch_one(entity: &Entity, fetch_one: &FetchOne) -> TokenStream {
        let fn_name = rust_ident(&fetch_one.name);
        let doc = Self::gen_route_doc(&fetch_one.route);
        let record_name = type_ident(&entity.record.name);
        let key_params = Self::gen_key_params(&fetch_one.key);
        let key_binds = Self::gen_key_binds(&fetch_one.key, false);
        let sql = fetch_one.to_sql();
        quote! {
            #doc
            pub async fn #fn_name(db: &Db, #(#key_params),*) -> Result<Vec<#record_name>, Error> {
                let mut args = NamedArgs::new();
                #(#key_binds)*
                let stmt = db
                    .prepare_named(#sql)
                    .inspect_err(|err| tracing::error!("{}", err))?;
                stmt.select::<#record_name>(&args)
                    .await
                    .inspect_err(|err| tracing::error!("{}", err))
            }
        }
    }

    pub fn gen_fetch_all(entity: &Entity, fetch_all: &FetchAll) -> TokenStream {
        let fn_name = rust_ident(&fetch_all.name);
        let doc = Self::gen_route_doc(&fetch_all.route);
        let record_name = type_ident(&entity.record.name);
        let sql = fetch_all.to_sql();
        quote! {
            #doc
            pub async fn #fn_name(db: &Db) -> Result<Vec<#record_name>, Error> {
                db.select::<#record_name>(#sql)
                    .await
                    .inspect_err(|err| tracing::error!("{}", err))
            }
        }
    }

    pub fn gen_create(entity: &Entity, create: &Create) -> TokenStream {
        let fn_name = rust_ident(&create.name);
        let doc = Self::gen_route_doc(&create.route);
        let record_name = type_ident(&entity.record.name);
        let binds = create.columns.iter().map(|binding| {
            let column = &binding.column;
            let value = binding.source.value_tokens(&binding.column);
            quote! {
                args.bind(#column, &#value);
            }
        });
        let sql = create.to_sql();
        quote! {
            #doc
            pub async fn #fn_name(db: &Db, payload: &[u8]) -> Result<ExecResult, Error> {
                let v: #record_name = serde_json::from_slice(payload)
                    .inspect_err(|err| tracing::error!("{}", err))?;
                let mut args = NamedArgs::new();
                #(#binds)*
                db.named_exec(#sql, &args)
                    .await
                    .inspect_err(|err| tracing::error!("{}", err))
            }
        }
    }

    pub fn gen_update(entity: &Entity, update: &Update) -> TokenStream {
        let fn_name = rust_ident(&update.name);
        let doc = Self::gen_route_doc(&update.route);
        let record_name = type_ident(&entity.record.name);
        let key_params = Self::gen_key_params(&update.key);
        let link_assignments: Vec<TokenStream> = update
            .key
            .iter()
            .filter_map(|segment| {
                let ParamAddress::Link { foreign_table } = &segment.address else {
                    return None;
                };
                let link = rust_ident(&link_name(foreign_table));
                let arg = rust_ident(&segment.column);
                Some(quote! {
                    v.links.#link.id = #arg.into();
                })
            })
            .collect();
        let decode = if link_assignments.is_empty() {
            quote! { let v: #record_name }
        } else {
            quote! { let mut v: #record_name }
        };
        let stamp = if update.stamps_audit_column() {
            let audit_column = update
                .assignments
                .iter()
                .filter(|binding| binding.source == ValueSource::Now)
                .map(|binding| rust_ident(&binding.column));
            quote! {
                #(let #audit_column = chrono::Utc::now().naive_utc();)*
            }
        } else {
            quote! {}
        };
        let binds = update.assignments.iter().map(|binding| {
            let column = &binding.column;
            let value = binding.source.value_tokens(&binding.column);
            quote! {
                args.bind(#column, &#value);
            }
        });
        let key_binds = Self::gen_key_binds(&update.key, true);
        let sql = update.to_sql();
        quote! {
            #doc
            pub async fn #fn_name(db: &Db, #(#key_params,)* payload: &[u8]) -> Result<ExecResult, Error> {
                #decode = serde_json::from_slice(payload)
                    .inspect_err(|err| tracing::error!("{}", err))?;
                #(#link_assignments)*
                #stamp
                let mut args = NamedArgs::new();
                #(#binds)*
                #(#key_binds)*
                db.named_exec(#sql, &args)
                    .await
                    .inspect_err(|err| tracing::error!("{}", err))
            }
        }
    }

    pub fn gen_delete(delete: &Delete) -> TokenStream {
        let fn_name = rust_ident(&delete.name);
        let doc = Self::gen_route_doc(&delete.route);
        let key_params = Self::gen_key_params(&delete.key);
        let key_binds = Self::gen_key_binds(&delete.key, false);
        let sql = delete.to_sql();
        quote! {
            #doc
            pub async fn #fn_name(db: &Db, #(#key_params),*) -> Result<ExecResult, Error> {
                let mut args = NamedArgs::new();
                #(#key_binds)*
                db.named_exec(#sql, &args)
                    .await
                    .inspect_err(|err| tracing::error!("{}", err))
            }
        }
    }

    /// `super::owners::OwnersLink`
    fn gen_link_type(foreign_table: &str) -> TokenStream {
        let module = rust_ident(&module_name(foreign_table));
        let link_name = type_ident(&link_name(foreign_table));
        quote! { super::#module::#link_name }
    }

    /// ` GET /api/2.0/log/{id}`, rendered as a `///` line
    fn gen_route_doc(route: &Route) -> TokenStream {
        let doc = format!(" {route}");
        quote! { #[doc = #doc] }
    }

    fn gen_key_params(key: &[KeySegment]) -> Vec<TokenStream> {
        key.iter()
            .map(|segment| {
                let arg = rust_ident(&segment.column);
                let rs_type = &segment.rs_type;
                quote! { #arg: #rs_type }
            })
            .collect()
    }

    /// Binds every key segment under its statement parameter name. Linked
    /// segments read the decoded record when there is one.
    fn gen_key_binds(key: &[KeySegment], from_record: bool) -> Vec<TokenStream> {
        key.iter()
            .map(|segment| {
                let param = segment.address.param_name();
                let value = match &segment.address {
                    ParamAddress::Link { foreign_table } if from_record => {
                        let link: Ident = rust_ident(&link_name(foreign_table));
                        quote! { v.links.#link.id }
                    }
                    _ => {
                        let arg = rust_ident(&segment.column);
                        quote! { #arg }
                    }
                };
                quote! {
                    args.bind(#param, &#value);
                }
            })
            .collect()
    }
}
