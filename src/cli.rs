use crate::{DEFAULT_FORMATTER, Dialect};
use clap::Parser;
use halgen_codegen::CodegenConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Generate HAL-style CRUD handler modules from a MySQL or Postgres schema"
)]
pub struct Cli {
    #[clap(value_enum, help = "Database dialect")]
    pub dialect: Dialect,

    #[clap(help = "Database user")]
    pub user: String,

    #[clap(help = "Database password")]
    pub password: String,

    #[clap(help = "Database name")]
    pub name: String,

    #[clap(help = "Database host")]
    pub host: String,

    #[clap(help = "Database port")]
    pub port: u16,

    #[clap(
        short = 'o',
        long,
        env = "HALGEN_OUTPUT_DIR",
        default_value = "./generated",
        help = "Directory the generated modules are written to"
    )]
    pub output_dir: PathBuf,

    #[clap(
        long,
        env = "HALGEN_API_PATH",
        default_value = CodegenConfig::DEFAULT_API_PATH,
        help = "Prefix of the self and related resource references"
    )]
    pub api_path: String,

    #[clap(
        short = 's',
        long,
        env = "DATABASE_SCHEMA",
        default_value = "public",
        long_help = "Database schema\n \
                    - For MySQL, this argument is ignored.\n \
                    - For PostgreSQL, this argument is optional with default value 'public'."
    )]
    pub database_schema: String,

    #[clap(
        short = 'i',
        long,
        value_delimiter = ',',
        default_value = "goose_db_version",
        help = "Skip generating modules for these tables"
    )]
    pub ignore_tables: Vec<String>,

    #[clap(
        long,
        env = "HALGEN_SUPPORT_MODULE",
        default_value = CodegenConfig::DEFAULT_SUPPORT_MODULE,
        value_parser = parse_support_module,
        help = "Module the generated code imports `Db`, `NamedArgs` and friends from"
    )]
    pub support_module: String,

    #[clap(
        long,
        env = "HALGEN_FORMATTER",
        default_value = DEFAULT_FORMATTER,
        help = "Command run on every generated file, the file path is appended"
    )]
    pub formatter: String,

    #[clap(short = 'v', long, help = "Show debug messages")]
    pub verbose: bool,
}

/// Accepts `::` separated Rust path segments, e.g. `crate::db`
fn parse_support_module(path: &str) -> Result<String, String> {
    let is_segment = |segment: &str| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|first| first == '_' || first.is_ascii_alphabetic())
            && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
    };
    if path.split("::").all(is_segment) {
        Ok(path.to_owned())
    } else {
        Err(format!("`{path}` is not a module path"))
    }
}
