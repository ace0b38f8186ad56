mod config;
mod entity;
mod error;
mod names;
mod schema;

pub use config::*;
pub use entity::*;
pub use error::*;
pub use names::*;
pub use schema::*;

#[cfg(test)]
mod tests_cfg;
