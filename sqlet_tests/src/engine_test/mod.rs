use sqlet_core::parser::command::TransactionMode;
use sqlet_core::storage::{MemStore, SchemaStore};
use sqlet_core::{Database, DbError, StoreError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

fn temp_dir(prefix: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut path = std::env::temp_dir();
    path.push(format!(
        "sqlet_engine_{}_{}_{}",
        prefix,
        std::process::id(),
        id
    ));
    let _ = std::fs::remove_dir_all(&path);
    path
}

fn test_db(prefix: &str) -> Database {
    Database::open(temp_dir(prefix)).unwrap()
}

/// In-memory store whose commits and rollbacks can be made to fail.
#[derive(Debug, Default)]
struct FailingStore {
    inner: MemStore,
    fail_commit: bool,
    fail_rollback: bool,
}

impl SchemaStore for FailingStore {
    fn begin(&mut self, mode: TransactionMode) -> Result<(), StoreError> {
        self.inner.begin(mode)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.fail_commit {
            return Err(StoreError::Transaction("disk full".to_string()));
        }
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.inner.rollback()?;
        if self.fail_rollback {
            return Err(StoreError::Transaction("rollback lost".to_string()));
        }
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.inner.in_transaction()
    }

    fn read_record(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.read_record(name)
    }

    fn write_record(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.inner.write_record(name, bytes)
    }

    fn delete_record(&mut self, name: &str) -> Result<(), StoreError> {
        self.inner.delete_record(name)
    }

    fn record_names(&self) -> Result<Vec<String>, StoreError> {
        self.inner.record_names()
    }

    fn schema_version(&self) -> u64 {
        self.inner.schema_version()
    }

    fn bump_schema_version(&mut self) -> Result<u64, StoreError> {
        self.inner.bump_schema_version()
    }
}
