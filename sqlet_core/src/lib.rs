use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod storage;

pub use config::DbConfig;
pub use error::{DbError, Result, StoreError};

use engine::execute::{self, Transaction};
use parser::command::{Command, QualifiedName, TransactionMode};
use parser::token::Identifier;
use storage::{DiskStore, IndexDef, MemStore, SchemaCatalog, SchemaStore, SchemaView, TableDef};

/// One connection: a schema catalog over a storage collaborator.
#[derive(Debug)]
pub struct Database {
    path: Option<PathBuf>,
    catalog: SchemaCatalog,
    store: Box<dyn SchemaStore>,
    tx: Option<Transaction>,
}

impl Database {
    /// Opens (creating if needed) a directory-backed database.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(path, DbConfig::default())
    }

    pub fn open_with(path: impl Into<PathBuf>, config: DbConfig) -> Result<Self> {
        let path = path.into();
        let store = DiskStore::open(&path, &config)?;
        let mut db = Self::with_store(Box::new(store))?;
        info!(
            path = %path.display(),
            tables = db.catalog.tables().count(),
            schema_version = db.catalog.schema_version(),
            "database opened"
        );
        db.path = Some(path);
        Ok(db)
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            catalog: SchemaCatalog::new(),
            store: Box::new(MemStore::new()),
            tx: None,
        }
    }

    /// Builds the catalog from whatever `store` already holds.
    pub fn with_store(store: Box<dyn SchemaStore>) -> Result<Self> {
        let catalog = SchemaCatalog::load(&*store)?;
        Ok(Self {
            path: None,
            catalog,
            store,
            tx: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Parses and runs one statement, returning a status message.
    pub fn execute(&mut self, input: &str) -> Result<String> {
        let cmd = parser::parser::parse(input)?;
        execute::execute_command(cmd, &mut self.catalog, self.store.as_mut(), &mut self.tx)
    }

    pub fn begin(&mut self, mode: TransactionMode) -> Result<()> {
        if self.tx.is_some() {
            return Err(DbError::Transaction(
                "cannot start a transaction within a transaction".to_string(),
            ));
        }
        self.tx = Some(execute::begin(&self.catalog, self.store.as_mut(), mode)?);
        Ok(())
    }

    /// Commits the open transaction; returns the schema version afterwards.
    pub fn commit(&mut self) -> Result<u64> {
        let tx = self.take_tx()?;
        execute::commit(tx, &mut self.catalog, self.store.as_mut())
    }

    pub fn rollback(&mut self) -> Result<()> {
        let tx = self.take_tx()?;
        execute::rollback(tx, self.store.as_mut())
    }

    pub fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    fn take_tx(&mut self) -> Result<Transaction> {
        self.tx
            .take()
            .ok_or_else(|| DbError::Transaction("no active transaction".to_string()))
    }

    /// Runs `f` inside a transaction that commits if `f` succeeds and rolls
    /// back otherwise.
    pub fn run_transaction<T>(
        &mut self,
        mode: TransactionMode,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.begin(mode)?;
        match f(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(e) => {
                if self.tx.is_some() {
                    if let Err(rollback_err) = self.rollback() {
                        warn!(error = %rollback_err, "rollback failed after transaction error");
                    }
                }
                Err(e)
            }
        }
    }

    pub fn create_table(&mut self, sql: &str) -> Result<TableDef> {
        let Command::CreateTable(stmt) = parser::parser::parse(sql)? else {
            return Err(wrong_statement(sql, "CREATE TABLE"));
        };
        let staged = execute::in_write_transaction(
            &mut self.catalog,
            self.store.as_mut(),
            &mut self.tx,
            |catalog, staged| execute::stage_create_table(stmt, catalog, staged),
        )?;
        Ok(staged.into_inner())
    }

    pub fn create_index(&mut self, sql: &str) -> Result<IndexDef> {
        let Command::CreateIndex(stmt) = parser::parser::parse(sql)? else {
            return Err(wrong_statement(sql, "CREATE INDEX"));
        };
        let staged = execute::in_write_transaction(
            &mut self.catalog,
            self.store.as_mut(),
            &mut self.tx,
            |catalog, staged| execute::stage_create_index(stmt, catalog, staged),
        )?;
        Ok(staged.into_inner())
    }

    /// Drops a table and its indices. Returns `false` if it did not exist
    /// and `if_exists` is set.
    pub fn drop_table(&mut self, name: &str, if_exists: bool) -> Result<bool> {
        let name = unqualified(name);
        execute::in_write_transaction(
            &mut self.catalog,
            self.store.as_mut(),
            &mut self.tx,
            |catalog, staged| execute::stage_drop_table(&name, if_exists, catalog, staged),
        )
    }

    pub fn drop_index(&mut self, name: &str, if_exists: bool) -> Result<bool> {
        let name = unqualified(name);
        execute::in_write_transaction(
            &mut self.catalog,
            self.store.as_mut(),
            &mut self.tx,
            |catalog, staged| execute::stage_drop_index(&name, if_exists, catalog, staged),
        )
    }

    /// Committed schema plus the open transaction's own changes.
    pub fn view(&self) -> SchemaView<'_> {
        match &self.tx {
            Some(tx) => tx.staged().view(&self.catalog),
            None => SchemaView::committed(&self.catalog),
        }
    }

    pub fn get_table(&self, name: &str) -> Option<&TableDef> {
        self.view().table(name)
    }

    pub fn get_index(&self, name: &str) -> Option<&IndexDef> {
        self.view().index(name)
    }

    pub fn tables(&self) -> Vec<&TableDef> {
        self.view().tables()
    }

    pub fn indices_of(&self, table: &str) -> Vec<&IndexDef> {
        self.view().indices_of(table)
    }

    /// Last committed schema version.
    pub fn schema_version(&self) -> u64 {
        self.catalog.schema_version()
    }

    /// All visible definitions as SQL text.
    pub fn schema_sql(&self) -> String {
        let view = self.view();
        engine::format_schema(&view.tables(), |table| view.indices_of(table))
    }
}

fn unqualified(name: &str) -> QualifiedName {
    QualifiedName {
        database: None,
        name: Identifier::bare(name),
    }
}

fn wrong_statement(sql: &str, expected: &str) -> DbError {
    DbError::Syntax {
        message: format!("expected {expected}"),
        found: sql.split_whitespace().next().unwrap_or_default().to_string(),
        offset: sql.len() - sql.trim_start().len(),
    }
}
