mod base_entity;
mod operation;
mod primary_key;
mod transformer;
mod writer;

pub use base_entity::*;
pub use operation::*;
pub use primary_key::*;
pub use transformer::*;
pub use writer::*;
