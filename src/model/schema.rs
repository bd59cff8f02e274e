//! Type definitions and records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DataError;

use super::{FieldKind, FieldValue};

/// One declared field of a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A named schema: ordered fields plus the primary-key position
///
/// Only [`Catalog::define_type`](crate::Catalog::define_type) builds these,
/// so `fields` is non-empty and `primary_key_index < fields.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDef {
    name: String,
    fields: Vec<FieldDefinition>,
    primary_key_index: usize,
}

impl TypeDef {
    pub(crate) fn new(name: String, fields: Vec<FieldDefinition>, primary_key_index: usize) -> Self {
        Self {
            name,
            fields,
            primary_key_index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// 0-based index of the primary-key field
    pub fn primary_key_index(&self) -> usize {
        self.primary_key_index
    }

    pub fn primary_key_field(&self) -> &FieldDefinition {
        &self.fields[self.primary_key_index]
    }

    /// Check typed values against this schema
    ///
    /// Count first, then kinds in declared order; the first mismatching
    /// position is reported.
    pub fn check_values(&self, values: &[FieldValue], max_string_len: usize) -> Result<(), DataError> {
        self.check_count(values.len())?;
        for (index, (field, value)) in self.fields.iter().zip(values).enumerate() {
            if !value.conforms_to(field.kind, max_string_len) {
                return Err(DataError::FieldTypeMismatch {
                    index,
                    expected: field.kind,
                });
            }
        }
        Ok(())
    }

    /// Parse raw command tokens into typed values, in declared order
    pub fn parse_values<S: AsRef<str>>(
        &self,
        tokens: &[S],
        max_string_len: usize,
    ) -> Result<Vec<FieldValue>, DataError> {
        self.check_count(tokens.len())?;
        self.fields
            .iter()
            .zip(tokens)
            .enumerate()
            .map(|(index, (field, token))| {
                FieldValue::parse(field.kind, token.as_ref(), max_string_len).ok_or(
                    DataError::FieldTypeMismatch {
                        index,
                        expected: field.kind,
                    },
                )
            })
            .collect()
    }

    /// Parse a lookup key as the primary-key field's kind
    pub fn parse_key(&self, text: &str, max_string_len: usize) -> Option<FieldValue> {
        FieldValue::parse(self.primary_key_field().kind, text, max_string_len)
    }

    fn check_count(&self, actual: usize) -> Result<(), DataError> {
        if actual != self.fields.len() {
            return Err(DataError::FieldCountMismatch {
                expected: self.fields.len(),
                actual,
            });
        }
        Ok(())
    }
}

/// A stored record: one value per field of its type, in declared order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub type_name: String,
    pub values: Vec<FieldValue>,
}

impl Record {
    pub fn new(type_name: impl Into<String>, values: Vec<FieldValue>) -> Self {
        Self {
            type_name: type_name.into(),
            values,
        }
    }

    /// Primary-key value under the given schema
    pub fn key<'a>(&'a self, type_def: &TypeDef) -> &'a FieldValue {
        &self.values[type_def.primary_key_index()]
    }
}

/// Values separated by single spaces (the search output form)
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}
