mod wal;

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::DbConfig;
use crate::error::StoreError;
use crate::parser::command::TransactionMode;
use crate::storage::engine::{
    read_through, require_tx, visible_names, visible_version, PendingTx, SchemaStore, StoreState,
};

/// Directory-backed schema store.
///
/// Layout: `catalog.json` holds the last checkpoint, `wal.log` holds
/// transactions committed since. A commit is durable once its `COMMIT` line
/// is in the log.
#[derive(Debug)]
pub struct DiskStore {
    root: PathBuf,
    sync_wal: bool,
    state: StoreState,
    pending: Option<PendingTx>,
    next_txid: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    schema_version: u64,
    /// Record key to hex-encoded bytes.
    records: BTreeMap<String, String>,
}

impl DiskStore {
    pub fn open(root: impl Into<PathBuf>, config: &DbConfig) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.exists() && !config.create_if_missing {
            return Err(StoreError::io(
                &root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "database directory missing"),
            ));
        }
        initialize_layout(&root)?;

        let mut store = Self {
            state: load_snapshot(&root.join("catalog.json"))?,
            root,
            sync_wal: config.sync_wal,
            pending: None,
            next_txid: 1,
        };
        store.recover()?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn catalog_path(&self) -> PathBuf {
        self.root.join("catalog.json")
    }

    fn wal_path(&self) -> PathBuf {
        self.root.join("wal.log")
    }

    /// Replays committed WAL transactions on top of the snapshot.
    fn recover(&mut self) -> Result<(), StoreError> {
        let wal_path = self.wal_path();
        let committed = wal::read_committed(&wal_path)?;
        let replayed = committed.len();
        for (txid, ops) in committed {
            wal::apply(ops, &mut self.state)?;
            self.next_txid = self.next_txid.max(txid + 1);
        }
        if replayed > 0 {
            info!(
                root = %self.root.display(),
                transactions = replayed,
                schema_version = self.state.schema_version,
                "replayed committed WAL transactions"
            );
            self.checkpoint()?;
        }
        let leftover = fs::metadata(&wal_path)
            .map(|m| m.len() > 0)
            .unwrap_or(false);
        if leftover {
            wal::truncate(&wal_path)?;
        }
        Ok(())
    }

    /// Writes the committed state to `catalog.json` via a temp file. The
    /// temp file is synced before the rename, and the directory after it
    /// when `sync_wal` is set.
    fn checkpoint(&self) -> Result<(), StoreError> {
        let snapshot = SnapshotFile {
            schema_version: self.state.schema_version,
            records: self
                .state
                .records
                .iter()
                .map(|(k, v)| (k.clone(), hex::encode(v)))
                .collect(),
        };
        let payload = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StoreError::Malformed(format!("failed to encode snapshot: {e}")))?;
        let path = self.catalog_path();
        let tmp = self.root.join("catalog.json.tmp");
        let mut file = File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
        file.write_all(payload.as_bytes())
            .map_err(|e| StoreError::io(&tmp, e))?;
        file.sync_all().map_err(|e| StoreError::io(&tmp, e))?;
        drop(file);
        fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))?;
        if self.sync_wal {
            sync_dir(&self.root)?;
        }
        Ok(())
    }

    /// Checkpoints and clears the log after a transaction is durable in the
    /// WAL. Failures only delay cleanup: the log is replayed on next open.
    fn settle(&self, wal_path: &Path) {
        if let Err(e) = self.checkpoint() {
            warn!(error = %e, "checkpoint failed; WAL kept for recovery");
            return;
        }
        if let Err(e) = wal::truncate(wal_path) {
            warn!(error = %e, "WAL truncate failed; it will be replayed on next open");
        }
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), StoreError> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| StoreError::io(dir, e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), StoreError> {
    Ok(())
}

fn initialize_layout(root: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(root).map_err(|e| StoreError::io(root, e))?;

    let catalog = root.join("catalog.json");
    if !catalog.exists() {
        File::create(&catalog).map_err(|e| StoreError::io(&catalog, e))?;
    }

    let wal = root.join("wal.log");
    if !wal.exists() {
        File::create(&wal).map_err(|e| StoreError::io(&wal, e))?;
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<StoreState, StoreError> {
    let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(StoreState::default());
    }
    let file: SnapshotFile = serde_json::from_str(&content)
        .map_err(|e| StoreError::Malformed(format!("malformed catalog JSON: {e}")))?;
    let mut records = BTreeMap::new();
    for (key, value) in file.records {
        let bytes = hex::decode(&value)
            .map_err(|e| StoreError::Malformed(format!("bad payload for '{key}': {e}")))?;
        records.insert(key, bytes);
    }
    Ok(StoreState {
        records,
        schema_version: file.schema_version,
    })
}

impl SchemaStore for DiskStore {
    fn begin(&mut self, mode: TransactionMode) -> Result<(), StoreError> {
        if self.pending.is_some() {
            return Err(StoreError::Transaction(
                "transaction already active".to_string(),
            ));
        }
        self.pending = Some(PendingTx::new(mode));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let pending = self
            .pending
            .take()
            .ok_or_else(|| StoreError::Transaction("no active transaction".to_string()))?;
        if pending.is_empty() {
            return Ok(());
        }

        let txid = self.next_txid;
        let ops = wal::ops_for(&pending);
        let wal_path = self.wal_path();
        wal::append(&wal_path, txid, &ops, self.sync_wal)?;
        self.next_txid += 1;
        pending.apply_to(&mut self.state);
        debug!(txid, ops = ops.len(), "WAL transaction committed");

        self.settle(&wal_path);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.pending = None;
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    fn read_record(&self, name: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(read_through(&self.state, self.pending.as_ref(), name))
    }

    fn write_record(&mut self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let tx = require_tx(self.pending.as_mut())?;
        tx.ensure_writable()?;
        tx.writes.insert(name.to_string(), Some(bytes.to_vec()));
        Ok(())
    }

    fn delete_record(&mut self, name: &str) -> Result<(), StoreError> {
        let tx = require_tx(self.pending.as_mut())?;
        tx.ensure_writable()?;
        tx.writes.insert(name.to_string(), None);
        Ok(())
    }

    fn record_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(visible_names(&self.state, self.pending.as_ref()))
    }

    fn schema_version(&self) -> u64 {
        visible_version(&self.state, self.pending.as_ref())
    }

    fn bump_schema_version(&mut self) -> Result<u64, StoreError> {
        let current = self.schema_version();
        let tx = require_tx(self.pending.as_mut())?;
        tx.ensure_writable()?;
        tx.schema_version = Some(current + 1);
        Ok(current + 1)
    }
}
