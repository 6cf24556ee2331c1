mod constraints;
mod persistence;
mod staged;

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::error::Result;
use crate::parser::token::name_key;
use crate::storage::engine::SchemaStore;
use crate::storage::schema::{IndexDef, TableDef};

pub use constraints::{autoindex_name, resolve_index, resolve_table};
pub use persistence::{CatalogRecord, RecordKind};
pub use staged::{SchemaView, StagedSchema};

/// A table or index looked up by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaObject<'a> {
    Table(&'a TableDef),
    Index(&'a IndexDef),
}

impl SchemaObject<'_> {
    pub fn name(&self) -> &str {
        match self {
            SchemaObject::Table(t) => t.name(),
            SchemaObject::Index(i) => i.name(),
        }
    }
}

/// Committed tables and indices of one database.
///
/// Tables and indices share one case-insensitive namespace.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables: BTreeMap<String, TableDef>,
    indices: BTreeMap<String, IndexDef>,
    schema_version: u64,
}

impl SchemaCatalog {
    /// Creates a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_version(&self) -> u64 {
        self.schema_version
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(&name_key(name))
    }

    pub fn index(&self, name: &str) -> Option<&IndexDef> {
        self.indices.get(&name_key(name))
    }

    pub fn object(&self, name: &str) -> Option<SchemaObject<'_>> {
        let key = name_key(name);
        if let Some(t) = self.tables.get(&key) {
            return Some(SchemaObject::Table(t));
        }
        self.indices.get(&key).map(SchemaObject::Index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.object(name).is_some()
    }

    /// Tables sorted by case-folded name.
    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }

    pub fn indices(&self) -> impl Iterator<Item = &IndexDef> {
        self.indices.values()
    }

    pub fn indices_of(&self, table: &str) -> Vec<&IndexDef> {
        self.indices
            .values()
            .filter(|i| i.table.matches(table))
            .collect()
    }

    /// Empty overlay for a new transaction.
    pub fn stage(&self) -> StagedSchema {
        StagedSchema::new(self.schema_version)
    }

    /// Rebuilds the catalog from the records held by `store`.
    pub fn load(store: &dyn SchemaStore) -> Result<Self> {
        persistence::load_catalog(store)
    }

    /// Persists `staged` through the store's open transaction and publishes it.
    ///
    /// On any failure the store transaction is rolled back and the catalog is
    /// left untouched. Returns the schema version after the commit.
    pub fn commit(&mut self, staged: StagedSchema, store: &mut dyn SchemaStore) -> Result<u64> {
        match self.persist(&staged, store) {
            Ok(version) => {
                if let Some(version) = version {
                    let changes = staged.change_count();
                    self.publish(staged, version);
                    info!(schema_version = version, changes, "schema changes committed");
                }
                Ok(self.schema_version)
            }
            Err(e) => {
                if let Err(rollback_err) = store.rollback() {
                    warn!(error = %rollback_err, "store rollback failed after commit error");
                }
                Err(e)
            }
        }
    }

    fn persist(&self, staged: &StagedSchema, store: &mut dyn SchemaStore) -> Result<Option<u64>> {
        staged.validate_against(self)?;
        if !staged.has_changes() {
            store.commit()?;
            return Ok(None);
        }

        for (key, table) in staged.table_changes() {
            match table {
                Some(t) if t.temporary => {}
                Some(t) => {
                    store.write_record(key, &CatalogRecord::from_table(t).to_bytes()?)?;
                }
                None => store.delete_record(key)?,
            }
        }
        for (key, index) in staged.index_changes() {
            match index {
                Some(i) if i.temporary => {}
                Some(i) => {
                    store.write_record(key, &CatalogRecord::from_index(i).to_bytes()?)?;
                }
                None => store.delete_record(key)?,
            }
        }

        let version = store.bump_schema_version()?;
        store.commit()?;
        Ok(Some(version))
    }

    fn publish(&mut self, staged: StagedSchema, version: u64) {
        let (tables, indices) = staged.into_changes();
        for (key, table) in tables {
            match table {
                Some(t) => {
                    self.tables.insert(key, t);
                }
                None => {
                    self.tables.remove(&key);
                }
            }
        }
        for (key, index) in indices {
            match index {
                Some(i) => {
                    self.indices.insert(key, i);
                }
                None => {
                    self.indices.remove(&key);
                }
            }
        }
        self.schema_version = version;
    }

    pub(crate) fn insert_loaded(&mut self, table: TableDef, indices: Vec<IndexDef>) {
        for index in indices {
            self.indices.insert(index.name.key(), index);
        }
        self.tables.insert(table.name.key(), table);
    }

    pub(crate) fn insert_loaded_index(&mut self, index: IndexDef) {
        self.indices.insert(index.name.key(), index);
    }

    pub(crate) fn set_schema_version(&mut self, version: u64) {
        self.schema_version = version;
    }
}
