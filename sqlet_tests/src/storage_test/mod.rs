use sqlet_core::parser::command::TransactionMode;
use sqlet_core::storage::catalog::RecordKind;
use sqlet_core::storage::{CatalogRecord, DiskStore, MemStore, SchemaStore};
use sqlet_core::{Database, DbConfig, DbError, StoreError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

fn temp_dir(prefix: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut path = std::env::temp_dir();
    path.push(format!(
        "sqlet_storage_{}_{}_{}",
        prefix,
        std::process::id(),
        id
    ));
    let _ = std::fs::remove_dir_all(&path);
    path
}

mod stores;
mod wal_recovery;
