use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DbError, Result};
use crate::parser::token::name_key;
use crate::storage::catalog::{SchemaCatalog, SchemaObject};
use crate::storage::schema::{IndexDef, TableDef};

/// Schema mutations buffered by one transaction.
///
/// An entry of `None` marks a drop. Nothing here is visible outside the
/// owning transaction until `SchemaCatalog::commit`.
#[derive(Debug, Clone, Default)]
pub struct StagedSchema {
    base_version: u64,
    tables: BTreeMap<String, Option<TableDef>>,
    indices: BTreeMap<String, Option<IndexDef>>,
    /// Keys that were free in the committed catalog when first staged.
    created: BTreeSet<String>,
}

impl StagedSchema {
    pub(crate) fn new(base_version: u64) -> Self {
        Self {
            base_version,
            ..Self::default()
        }
    }

    /// Committed schema version this overlay was started from.
    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    pub fn has_changes(&self) -> bool {
        !self.tables.is_empty() || !self.indices.is_empty()
    }

    pub fn change_count(&self) -> usize {
        self.tables.len() + self.indices.len()
    }

    /// Committed state seen through this overlay.
    pub fn view<'a>(&'a self, catalog: &'a SchemaCatalog) -> SchemaView<'a> {
        SchemaView {
            catalog,
            staged: Some(self),
        }
    }

    pub(crate) fn put_table(
        &mut self,
        catalog: &SchemaCatalog,
        table: TableDef,
        indices: Vec<IndexDef>,
    ) {
        for index in indices {
            self.put_index(catalog, index);
        }
        let key = table.name.key();
        if !catalog.contains(&key) {
            self.created.insert(key.clone());
        }
        self.tables.insert(key, Some(table));
    }

    pub(crate) fn put_index(&mut self, catalog: &SchemaCatalog, index: IndexDef) {
        let key = index.name.key();
        if !catalog.contains(&key) {
            self.created.insert(key.clone());
        }
        self.indices.insert(key, Some(index));
    }

    pub(crate) fn remove_table(&mut self, name: &str) {
        self.tables.insert(name_key(name), None);
    }

    pub(crate) fn remove_index(&mut self, name: &str) {
        self.indices.insert(name_key(name), None);
    }

    /// Fails if another transaction committed one of our new names first.
    pub(crate) fn validate_against(&self, catalog: &SchemaCatalog) -> Result<()> {
        for key in &self.created {
            let staged = match (self.tables.get(key), self.indices.get(key)) {
                (Some(Some(t)), _) => Some(t.name()),
                (_, Some(Some(i))) => Some(i.name()),
                _ => None,
            };
            if let Some(name) = staged {
                if catalog.contains(key) {
                    return Err(DbError::duplicate(name));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn table_changes(&self) -> impl Iterator<Item = (&str, Option<&TableDef>)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub(crate) fn index_changes(&self) -> impl Iterator<Item = (&str, Option<&IndexDef>)> {
        self.indices.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    #[allow(clippy::type_complexity)]
    pub(crate) fn into_changes(
        self,
    ) -> (
        BTreeMap<String, Option<TableDef>>,
        BTreeMap<String, Option<IndexDef>>,
    ) {
        (self.tables, self.indices)
    }
}

/// Read access to committed state plus, optionally, one overlay.
#[derive(Debug, Clone, Copy)]
pub struct SchemaView<'a> {
    catalog: &'a SchemaCatalog,
    staged: Option<&'a StagedSchema>,
}

impl<'a> SchemaView<'a> {
    /// View of committed state only.
    pub fn committed(catalog: &'a SchemaCatalog) -> Self {
        Self {
            catalog,
            staged: None,
        }
    }

    pub fn table(&self, name: &str) -> Option<&'a TableDef> {
        let catalog: &'a SchemaCatalog = self.catalog;
        match self.staged.and_then(|s| s.tables.get(&name_key(name))) {
            Some(entry) => entry.as_ref(),
            None => catalog.table(name),
        }
    }

    pub fn index(&self, name: &str) -> Option<&'a IndexDef> {
        let catalog: &'a SchemaCatalog = self.catalog;
        match self.staged.and_then(|s| s.indices.get(&name_key(name))) {
            Some(entry) => entry.as_ref(),
            None => catalog.index(name),
        }
    }

    pub fn object(&self, name: &str) -> Option<SchemaObject<'a>> {
        if let Some(t) = self.table(name) {
            return Some(SchemaObject::Table(t));
        }
        self.index(name).map(SchemaObject::Index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.object(name).is_some()
    }

    /// Visible tables sorted by case-folded name.
    pub fn tables(&self) -> Vec<&'a TableDef> {
        let catalog: &'a SchemaCatalog = self.catalog;
        let mut out: BTreeMap<String, &'a TableDef> =
            catalog.tables().map(|t| (t.name.key(), t)).collect();
        if let Some(staged) = self.staged {
            for (key, entry) in &staged.tables {
                match entry {
                    Some(t) => {
                        out.insert(key.clone(), t);
                    }
                    None => {
                        out.remove(key);
                    }
                }
            }
        }
        out.into_values().collect()
    }

    /// Visible indices on `table`, sorted by case-folded name.
    pub fn indices_of(&self, table: &str) -> Vec<&'a IndexDef> {
        let catalog: &'a SchemaCatalog = self.catalog;
        let mut out: BTreeMap<String, &'a IndexDef> =
            catalog.indices().map(|i| (i.name.key(), i)).collect();
        if let Some(staged) = self.staged {
            for (key, entry) in &staged.indices {
                match entry {
                    Some(i) => {
                        out.insert(key.clone(), i);
                    }
                    None => {
                        out.remove(key);
                    }
                }
            }
        }
        out.into_values()
            .filter(|i| i.table.matches(table))
            .collect()
    }
}
