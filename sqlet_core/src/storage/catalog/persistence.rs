use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::parser::command::Command;
use crate::parser::parser::parse;
use crate::storage::catalog::constraints::{resolve_index, resolve_table};
use crate::storage::catalog::{SchemaCatalog, SchemaView};
use crate::storage::engine::SchemaStore;
use crate::storage::schema::{IndexDef, TableDef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Table,
    Index,
}

/// Stored form of one schema object.
///
/// Implicit indices carry no SQL; they are rebuilt from their table's
/// definition on load and the record is only cross-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub kind: RecordKind,
    pub name: String,
    pub table: String,
    pub sql: Option<String>,
    pub implicit: bool,
    pub unique: bool,
    pub columns: Vec<String>,
    #[serde(default)]
    pub schema_version: u64,
}

impl CatalogRecord {
    pub fn from_table(table: &TableDef) -> Self {
        Self {
            kind: RecordKind::Table,
            name: table.name().to_string(),
            table: table.name().to_string(),
            sql: Some(table.to_sql()),
            implicit: false,
            unique: false,
            columns: table.column_names().into_iter().map(String::from).collect(),
            schema_version: table.schema_version,
        }
    }

    pub fn from_index(index: &IndexDef) -> Self {
        Self {
            kind: RecordKind::Index,
            name: index.name().to_string(),
            table: index.table_name().to_string(),
            sql: index.stored_sql(),
            implicit: index.implicit,
            unique: index.unique,
            columns: index.column_names().into_iter().map(String::from).collect(),
            schema_version: 0,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(self)
            .map_err(|e| StoreError::Malformed(format!("failed to encode record '{}': {e}", self.name)))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        serde_json::from_slice(bytes)
            .map_err(|e| StoreError::Malformed(format!("malformed catalog record: {e}")))
    }
}

fn malformed(message: String) -> StoreError {
    StoreError::Malformed(message)
}

fn parse_record_sql(record: &CatalogRecord) -> Result<Command, StoreError> {
    let sql = record
        .sql
        .as_deref()
        .ok_or_else(|| malformed(format!("record '{}' has no SQL", record.name)))?;
    parse(sql).map_err(|e| malformed(format!("record '{}': {e}", record.name)))
}

pub(super) fn load_catalog(store: &dyn SchemaStore) -> Result<SchemaCatalog> {
    let mut records = Vec::new();
    for key in store.record_names()? {
        if let Some(bytes) = store.read_record(&key)? {
            records.push(CatalogRecord::from_bytes(&bytes)?);
        }
    }

    let mut catalog = SchemaCatalog::new();
    let mut implicit = Vec::new();
    let mut explicit = Vec::new();
    let empty = SchemaCatalog::new();
    for record in records {
        match record.kind {
            RecordKind::Table => {
                let Command::CreateTable(stmt) = parse_record_sql(&record)? else {
                    return Err(malformed(format!("record '{}' is not a CREATE TABLE", record.name)).into());
                };
                // Tables are rebuilt in isolation so load order cannot matter.
                let (table, indices) =
                    resolve_table(stmt, &SchemaView::committed(&empty), record.schema_version)?;
                catalog.insert_loaded(table, indices);
            }
            RecordKind::Index if record.implicit => implicit.push(record),
            RecordKind::Index => explicit.push(record),
        }
    }

    for record in &implicit {
        let matches = catalog.index(&record.name).is_some_and(|index| {
            index.implicit
                && index.table.matches(&record.table)
                && index.column_names() == record.columns.iter().map(String::as_str).collect::<Vec<_>>()
        });
        if !matches {
            return Err(malformed(format!(
                "implicit index record '{}' does not match its table definition",
                record.name
            ))
            .into());
        }
    }
    let rebuilt = catalog.indices().filter(|i| i.implicit).count();
    if rebuilt != implicit.len() {
        return Err(malformed(format!(
            "expected {rebuilt} implicit index records, found {}",
            implicit.len()
        ))
        .into());
    }

    for record in &explicit {
        let Command::CreateIndex(stmt) = parse_record_sql(record)? else {
            return Err(malformed(format!("record '{}' is not a CREATE INDEX", record.name)).into());
        };
        let index = resolve_index(stmt, &SchemaView::committed(&catalog))?;
        catalog.insert_loaded_index(index);
    }

    catalog.set_schema_version(store.schema_version());
    debug!(
        tables = catalog.tables().count(),
        indices = catalog.indices().count(),
        schema_version = catalog.schema_version(),
        "catalog loaded"
    );
    Ok(catalog)
}
