//! Catalog Module
//!
//! Holds every type (schema) definition, keyed by type name.
//!
//! ## Responsibilities
//! - Validate and register new types (`create type`)
//! - Resolve a type name to its schema for every record operation
//!
//! Types are never altered or removed once defined.

use std::collections::BTreeMap;

use crate::config::Limits;
use crate::error::{CatalogError, SchemaError};
use crate::model::{FieldDefinition, TypeDef};

/// Mapping from type name to schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    types: BTreeMap<String, TypeDef>,
    limits: Limits,
}

impl Catalog {
    /// Create an empty catalog with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog enforcing the given limits
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            types: BTreeMap::new(),
            limits,
        }
    }

    /// Define a new type
    ///
    /// Checks, in order: duplicate name, name validity, field list shape
    /// (empty / too many / names / duplicates), then the primary-key index.
    /// A rejected definition leaves the catalog unchanged.
    pub fn define_type(
        &mut self,
        name: impl Into<String>,
        fields: Vec<FieldDefinition>,
        primary_key_index: usize,
    ) -> Result<&TypeDef, SchemaError> {
        let name = name.into();

        if self.types.contains_key(&name) {
            return Err(SchemaError::DuplicateTypeName(name));
        }
        check_name(&name, self.limits.max_type_name_len)?;

        if fields.is_empty() {
            return Err(SchemaError::EmptyFieldList);
        }
        if fields.len() > self.limits.max_fields_per_type {
            return Err(SchemaError::TooManyFields {
                count: fields.len(),
                max: self.limits.max_fields_per_type,
            });
        }
        for (i, field) in fields.iter().enumerate() {
            check_name(&field.name, self.limits.max_field_name_len)?;
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateFieldName(field.name.clone()));
            }
        }

        if primary_key_index >= fields.len() {
            return Err(SchemaError::InvalidPrimaryKeyIndex {
                order: primary_key_index.saturating_add(1),
                field_count: fields.len(),
            });
        }

        let type_def = TypeDef::new(name.clone(), fields, primary_key_index);
        Ok(self.types.entry(name).or_insert(type_def))
    }

    /// Re-register a persisted definition through the same validation
    pub fn restore(&mut self, type_def: TypeDef) -> Result<&TypeDef, SchemaError> {
        let primary_key_index = type_def.primary_key_index();
        let fields = type_def.fields().to_vec();
        self.define_type(type_def.name().to_string(), fields, primary_key_index)
    }

    /// Resolve a type by name
    pub fn lookup_type(&self, name: &str) -> Result<&TypeDef, CatalogError> {
        self.types
            .get(name)
            .ok_or_else(|| CatalogError::TypeNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All types, ordered by name
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

/// Letters and digits only, at least one letter, bounded length
fn check_name(name: &str, max_len: usize) -> Result<(), SchemaError> {
    let valid = name.bytes().all(|b| b.is_ascii_alphanumeric())
        && name.bytes().any(|b| b.is_ascii_alphabetic());
    if !valid {
        return Err(SchemaError::InvalidName(name.to_string()));
    }
    if name.len() > max_len {
        return Err(SchemaError::NameTooLong {
            name: name.to_string(),
            max: max_len,
        });
    }
    Ok(())
}
