//! Value/Type Model
//!
//! The tagged field values and schema types everything else is built on.
//!
//! ## Responsibilities
//! - Field kinds and the keyword table used by `create type`
//! - Parsing command tokens into typed values
//! - Schema conformance checks for records

mod value;
mod schema;

pub use value::{FieldKind, FieldValue};
pub use schema::{FieldDefinition, Record, TypeDef};
