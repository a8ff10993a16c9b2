//! Store mapping: which entity types the store knows about and which of
//! their document fields carry unique indexes.

use std::collections::BTreeMap;

use crate::core::entity::Entity;
use crate::core::error::{DataError, DataResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableModel {
    pub unique: Vec<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    tables: BTreeMap<&'static str, TableModel>,
}

impl Model {
    pub fn builder() -> ModelBuilder {
        ModelBuilder::new()
    }

    pub fn is_mapped(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn table(&self, table: &str) -> Option<&TableModel> {
        self.tables.get(table)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&'static str, &TableModel)> {
        self.tables.iter().map(|(name, table)| (*name, table))
    }

    /// Name of the unique index on `table.field`.
    pub fn unique_index_name(table: &str, field: &str) -> String {
        format!("uq_{}_{}", table, field)
    }
}

#[derive(Debug, Default)]
pub struct ModelBuilder {
    tables: BTreeMap<&'static str, TableModel>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity<T: Entity>(mut self) -> Self {
        self.tables.entry(T::TABLE).or_default();
        self
    }

    /// Declare a unique index on a top-level document field of `T`.
    pub fn unique<T: Entity>(mut self, field: &'static str) -> Self {
        let table = self.tables.entry(T::TABLE).or_default();
        if !table.unique.contains(&field) {
            table.unique.push(field);
        }
        self
    }

    /// Names end up in SQL statements, so only plain identifiers are accepted.
    pub fn build(self) -> DataResult<Model> {
        for (table, model) in &self.tables {
            if !is_identifier(table) {
                return Err(DataError::InvalidModel(format!(
                    "table name `{}` is not a valid identifier",
                    table
                )));
            }
            if let Some(field) = model.unique.iter().find(|field| !is_identifier(field)) {
                return Err(DataError::InvalidModel(format!(
                    "unique field `{}` on `{}` is not a valid identifier",
                    field, table
                )));
            }
        }

        Ok(Model {
            tables: self.tables,
        })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
