use crate::{Cli, Error};
use clap::ValueEnum;
use halgen_codegen::CodegenConfig;
use std::{fmt, path::PathBuf};

pub const DEFAULT_FORMATTER: &str = "rustfmt --edition 2021";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Dialect {
    #[value(name = "mysql")]
    MySql,
    #[value(name = "postgres", alias = "postgresql")]
    Postgres,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySql => write!(f, "MySQL"),
            Self::Postgres => write!(f, "Postgres"),
        }
    }
}

/// Where and how to reach the database being introspected
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub dialect: Dialect,
    pub user: String,
    pub password: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Postgres only, the schema whose tables are generated
    pub database_schema: String,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("dialect", &self.dialect)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_schema", &self.database_schema)
            .finish()
    }
}

/// Everything a generation run needs, built once from the command line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub connection: ConnectionConfig,
    pub codegen: CodegenConfig,
    pub output_dir: PathBuf,
    /// Program and leading arguments, the file path is appended
    pub formatter: Vec<String>,
    pub ignore_tables: Vec<String>,
}

impl GeneratorConfig {
    pub fn is_ignored(&self, table: &str) -> bool {
        self.ignore_tables.iter().any(|ignored| ignored == table)
    }
}

impl TryFrom<&Cli> for GeneratorConfig {
    type Error = Error;

    fn try_from(cli: &Cli) -> Result<Self, Self::Error> {
        let formatter: Vec<String> = cli
            .formatter
            .split_whitespace()
            .map(ToOwned::to_owned)
            .collect();
        if formatter.is_empty() {
            return Err(Error::Configuration(
                "the formatter command must not be empty".to_owned(),
            ));
        }
        Ok(Self {
            connection: ConnectionConfig {
                dialect: cli.dialect,
                user: cli.user.clone(),
                password: cli.password.clone(),
                name: cli.name.clone(),
                host: cli.host.clone(),
                port: cli.port,
                database_schema: cli.database_schema.clone(),
            },
            codegen: CodegenConfig::new(cli.api_path.as_str(), &cli.support_module),
            output_dir: cli.output_dir.clone(),
            formatter,
            ignore_tables: cli
                .ignore_tables
                .iter()
                .map(|table| table.trim().to_owned())
                .filter(|table| !table.is_empty())
                .collect(),
        })
    }
}
