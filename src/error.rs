use halgen_codegen::SchemaError;
use std::path::PathBuf;
use thiserror::Error;

/// An error raised while writing or formatting a generated file
#[derive(Error, Debug)]
pub enum EmissionError {
    /// The output directory or file could not be created or written
    #[error("Fail to write `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The formatter could not be spawned or exited unsuccessfully
    #[error("Fail to format file `{}`: {reason}", .path.display())]
    Formatter { path: PathBuf, reason: String },
}

/// Any error that ends a generation run
#[derive(Error, Debug)]
pub enum Error {
    /// The command line was accepted by the parser but cannot be used as is
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Emission(#[from] EmissionError),
}
