//! Value module - In-memory representation of resource and overlay documents.

mod value;

pub use value::*;
