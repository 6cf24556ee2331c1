use tracing::debug;

use crate::engine::format::{index_fingerprint, table_fingerprint};
use crate::error::{DbError, Result};
use crate::parser::command::{CreateIndex, CreateTable, QualifiedName};
use crate::storage::catalog::{
    resolve_index, resolve_table, SchemaCatalog, SchemaObject, StagedSchema,
};
use crate::storage::schema::{IndexDef, TableDef};

/// Result of staging a `CREATE`.
#[derive(Debug, Clone, PartialEq)]
pub enum Staged<T> {
    Created(T),
    /// `IF NOT EXISTS` matched an identical definition; nothing was staged.
    Existing(T),
}

impl<T> Staged<T> {
    pub fn into_inner(self) -> T {
        match self {
            Staged::Created(v) | Staged::Existing(v) => v,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Staged::Created(_))
    }
}

/// Resolves `stmt` and adds the table and its implicit indices to `staged`.
///
/// On error `staged` is unchanged.
pub fn stage_create_table(
    stmt: CreateTable,
    catalog: &SchemaCatalog,
    staged: &mut StagedSchema,
) -> Result<Staged<TableDef>> {
    let view = staged.view(catalog);
    let name = stmt.name.name.clone();
    let existing = view.object(name.value());
    if existing.is_some() && !stmt.if_not_exists {
        return Err(DbError::duplicate(name.value()));
    }

    let (table, indices) = resolve_table(stmt, &view, catalog.schema_version() + 1)?;
    if let Some(existing) = existing {
        return match existing {
            SchemaObject::Table(current)
                if table_fingerprint(current) == table_fingerprint(&table) =>
            {
                debug!(table = current.name(), "table exists; IF NOT EXISTS is a no-op");
                Ok(Staged::Existing(current.clone()))
            }
            _ => Err(DbError::duplicate(name.value())),
        };
    }

    debug!(
        table = table.name(),
        indices = indices.len(),
        "staged CREATE TABLE"
    );
    staged.put_table(catalog, table.clone(), indices);
    Ok(Staged::Created(table))
}

/// Resolves `stmt` and adds the index to `staged`.
pub fn stage_create_index(
    stmt: CreateIndex,
    catalog: &SchemaCatalog,
    staged: &mut StagedSchema,
) -> Result<Staged<IndexDef>> {
    let view = staged.view(catalog);
    let name = stmt.name.name.clone();
    let existing = view.object(name.value());
    if existing.is_some() && !stmt.if_not_exists {
        return Err(DbError::duplicate(name.value()));
    }

    let index = resolve_index(stmt, &view)?;
    if let Some(existing) = existing {
        return match existing {
            SchemaObject::Index(current)
                if index_fingerprint(current) == index_fingerprint(&index) =>
            {
                debug!(index = current.name(), "index exists; IF NOT EXISTS is a no-op");
                Ok(Staged::Existing(current.clone()))
            }
            _ => Err(DbError::duplicate(name.value())),
        };
    }

    debug!(index = index.name(), table = index.table_name(), "staged CREATE INDEX");
    staged.put_index(catalog, index.clone());
    Ok(Staged::Created(index))
}

/// Stages removal of a table and every index on it. Returns `false` when
/// the table is absent and `if_exists` is set.
pub fn stage_drop_table(
    name: &QualifiedName,
    if_exists: bool,
    catalog: &SchemaCatalog,
    staged: &mut StagedSchema,
) -> Result<bool> {
    let view = staged.view(catalog);
    let Some(table) = view.table(name.name.value()) else {
        if if_exists {
            return Ok(false);
        }
        return Err(DbError::NotFound {
            name: name.name.value().to_string(),
        });
    };
    let table_key = table.name.key();
    let index_keys: Vec<String> = view
        .indices_of(table.name())
        .into_iter()
        .map(|i| i.name.key())
        .collect();

    debug!(table = %name.name, indices = index_keys.len(), "staged DROP TABLE");
    for key in &index_keys {
        staged.remove_index(key);
    }
    staged.remove_table(&table_key);
    Ok(true)
}

/// Stages removal of an explicit index.
pub fn stage_drop_index(
    name: &QualifiedName,
    if_exists: bool,
    catalog: &SchemaCatalog,
    staged: &mut StagedSchema,
) -> Result<bool> {
    let view = staged.view(catalog);
    let Some(index) = view.index(name.name.value()) else {
        if if_exists {
            return Ok(false);
        }
        return Err(DbError::NotFound {
            name: name.name.value().to_string(),
        });
    };
    if index.implicit {
        return Err(DbError::structural(
            "index associated with UNIQUE or PRIMARY KEY constraint cannot be dropped",
        ));
    }
    let key = index.name.key();

    debug!(index = %name.name, "staged DROP INDEX");
    staged.remove_index(&key);
    Ok(true)
}
