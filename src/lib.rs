pub mod cli;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod emitter;
pub mod error;
pub mod uri_signing;

pub use cli::*;
pub use commands::*;
pub use config::*;
pub use discovery::*;
pub use emitter::*;
pub use error::*;
pub use uri_signing::*;
