mod ddl;

use tracing::{debug, warn};

use crate::engine::format::qualified_name;
use crate::error::{DbError, Result};
use crate::parser::command::{Command, TransactionMode};
use crate::storage::catalog::{SchemaCatalog, StagedSchema};
use crate::storage::engine::SchemaStore;

pub use ddl::{stage_create_index, stage_create_table, stage_drop_index, stage_drop_table, Staged};

/// An open transaction: its mode and the schema changes it has staged.
#[derive(Debug)]
pub struct Transaction {
    mode: TransactionMode,
    staged: StagedSchema,
}

impl Transaction {
    pub fn mode(&self) -> TransactionMode {
        self.mode
    }

    pub fn staged(&self) -> &StagedSchema {
        &self.staged
    }
}

pub fn begin(
    catalog: &SchemaCatalog,
    store: &mut dyn SchemaStore,
    mode: TransactionMode,
) -> Result<Transaction> {
    store.begin(mode)?;
    debug!(?mode, schema_version = catalog.schema_version(), "transaction started");
    Ok(Transaction {
        mode,
        staged: catalog.stage(),
    })
}

/// Commits `tx`; returns the schema version afterwards.
pub fn commit(
    tx: Transaction,
    catalog: &mut SchemaCatalog,
    store: &mut dyn SchemaStore,
) -> Result<u64> {
    catalog.commit(tx.staged, store)
}

pub fn rollback(tx: Transaction, store: &mut dyn SchemaStore) -> Result<()> {
    if tx.staged.has_changes() {
        warn!(
            changes = tx.staged.change_count(),
            "rolling back transaction with staged schema changes"
        );
    }
    store.rollback()?;
    Ok(())
}

/// Runs `f` against the open write transaction, or against an implicit one
/// that is committed on success and rolled back on failure.
pub fn in_write_transaction<T>(
    catalog: &mut SchemaCatalog,
    store: &mut dyn SchemaStore,
    tx: &mut Option<Transaction>,
    f: impl FnOnce(&SchemaCatalog, &mut StagedSchema) -> Result<T>,
) -> Result<T> {
    if let Some(active) = tx.as_mut() {
        if !active.mode.is_write() {
            return Err(DbError::Transaction(
                "cannot modify the schema inside a read-only transaction".to_string(),
            ));
        }
        return f(catalog, &mut active.staged);
    }

    let mut implicit = begin(catalog, store, TransactionMode::Write)?;
    match f(catalog, &mut implicit.staged) {
        Ok(out) => {
            commit(implicit, catalog, store)?;
            Ok(out)
        }
        Err(e) => {
            if let Err(rollback_err) = rollback(implicit, store) {
                warn!(error = %rollback_err, "auto-commit rollback failed");
            }
            Err(e)
        }
    }
}

/// Executes a parsed command and returns a one-line status message.
pub fn execute_command(
    cmd: Command,
    catalog: &mut SchemaCatalog,
    store: &mut dyn SchemaStore,
    tx: &mut Option<Transaction>,
) -> Result<String> {
    match cmd {
        Command::Begin(mode) => {
            if tx.is_some() {
                return Err(DbError::Transaction(
                    "cannot start a transaction within a transaction".to_string(),
                ));
            }
            *tx = Some(begin(catalog, store, mode)?);
            Ok("transaction started".to_string())
        }
        Command::Commit => {
            let active = tx
                .take()
                .ok_or_else(|| DbError::Transaction("no active transaction".to_string()))?;
            commit(active, catalog, store)?;
            Ok("transaction committed".to_string())
        }
        Command::Rollback => {
            let active = tx
                .take()
                .ok_or_else(|| DbError::Transaction("no active transaction".to_string()))?;
            rollback(active, store)?;
            Ok("transaction rolled back".to_string())
        }
        Command::CreateTable(stmt) => {
            let outcome = in_write_transaction(catalog, store, tx, |catalog, staged| {
                stage_create_table(stmt, catalog, staged)
            })?;
            Ok(match outcome {
                Staged::Created(t) => format!("created table {}", t.name),
                Staged::Existing(t) => format!("table {} already exists", t.name),
            })
        }
        Command::CreateIndex(stmt) => {
            let outcome = in_write_transaction(catalog, store, tx, |catalog, staged| {
                stage_create_index(stmt, catalog, staged)
            })?;
            Ok(match outcome {
                Staged::Created(i) => format!("created index {} on {}", i.name, i.table),
                Staged::Existing(i) => format!("index {} already exists", i.name),
            })
        }
        Command::DropTable { name, if_exists } => {
            let dropped = in_write_transaction(catalog, store, tx, |catalog, staged| {
                stage_drop_table(&name, if_exists, catalog, staged)
            })?;
            Ok(if dropped {
                format!("dropped table {}", qualified_name(&name))
            } else {
                format!("table {} does not exist", qualified_name(&name))
            })
        }
        Command::DropIndex { name, if_exists } => {
            let dropped = in_write_transaction(catalog, store, tx, |catalog, staged| {
                stage_drop_index(&name, if_exists, catalog, staged)
            })?;
            Ok(if dropped {
                format!("dropped index {}", qualified_name(&name))
            } else {
                format!("index {} does not exist", qualified_name(&name))
            })
        }
    }
}
