//! RecordStore implementation
//!
//! Nested BTreeMaps: type name → primary key → record.

use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::error::{CommandError, DataError};
use crate::model::{FieldValue, Record};

/// Per-type record tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordStore {
    tables: BTreeMap<String, BTreeMap<FieldValue, Record>>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record
    ///
    /// Failure order: type not found, field count, first mismatching field
    /// kind (lowest index), duplicate primary key. On failure nothing is
    /// stored.
    pub fn insert(
        &mut self,
        catalog: &Catalog,
        type_name: &str,
        values: Vec<FieldValue>,
    ) -> Result<&Record, CommandError> {
        let type_def = catalog.lookup_type(type_name)?;
        type_def.check_values(&values, catalog.limits().max_string_len)?;

        let key = values[type_def.primary_key_index()].clone();
        let table = self.tables.entry(type_name.to_string()).or_default();
        if table.contains_key(&key) {
            return Err(DataError::DuplicatePrimaryKey(key.to_string()).into());
        }

        Ok(table
            .entry(key)
            .or_insert_with(|| Record::new(type_name, values)))
    }

    /// Re-insert a persisted record through the same validation
    pub fn restore(&mut self, catalog: &Catalog, record: Record) -> Result<&Record, CommandError> {
        let Record { type_name, values } = record;
        self.insert(catalog, &type_name, values)
    }

    /// Exact-match lookup by primary key
    pub fn find(
        &self,
        catalog: &Catalog,
        type_name: &str,
        key: &FieldValue,
    ) -> Result<&Record, CommandError> {
        catalog.lookup_type(type_name)?;
        self.tables
            .get(type_name)
            .and_then(|table| table.get(key))
            .ok_or_else(|| DataError::KeyNotFound(key.to_string()).into())
    }

    /// Remove a record by primary key, returning it
    ///
    /// Deleting a key that is already gone fails with `KeyNotFound`.
    pub fn delete(
        &mut self,
        catalog: &Catalog,
        type_name: &str,
        key: &FieldValue,
    ) -> Result<Record, CommandError> {
        catalog.lookup_type(type_name)?;
        self.tables
            .get_mut(type_name)
            .and_then(|table| table.remove(key))
            .ok_or_else(|| DataError::KeyNotFound(key.to_string()).into())
    }

    /// Records of one type, ordered by primary key
    pub fn records<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a Record> + 'a {
        self.tables
            .get(type_name)
            .into_iter()
            .flat_map(|table| table.values())
    }

    /// Every record, grouped by type name then ordered by key
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.tables.values().flat_map(|table| table.values())
    }

    /// Number of records of one type
    pub fn count(&self, type_name: &str) -> usize {
        self.tables.get(type_name).map_or(0, |table| table.len())
    }

    /// Total number of records across all types
    pub fn len(&self) -> usize {
        self.tables.values().map(|table| table.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
