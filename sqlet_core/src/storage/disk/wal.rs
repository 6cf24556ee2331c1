use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::storage::engine::{PendingTx, StoreState};

/// One logged mutation. Record payloads are hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum WalOp {
    Put { key: String, value: String },
    Delete { key: String },
    Version { value: u64 },
}

pub(crate) fn ops_for(pending: &PendingTx) -> Vec<WalOp> {
    let mut ops: Vec<WalOp> = pending
        .writes
        .iter()
        .map(|(key, value)| match value {
            Some(bytes) => WalOp::Put {
                key: key.clone(),
                value: hex::encode(bytes),
            },
            None => WalOp::Delete { key: key.clone() },
        })
        .collect();
    if let Some(value) = pending.schema_version {
        ops.push(WalOp::Version { value });
    }
    ops
}

/// Appends `BEGIN`, one `OP` line per operation and `COMMIT` for `txid`.
pub(crate) fn append(path: &Path, txid: u64, ops: &[WalOp], sync: bool) -> Result<(), StoreError> {
    let mut payload = format!("BEGIN {txid}\n");
    for op in ops {
        let json = serde_json::to_string(op)
            .map_err(|e| StoreError::Malformed(format!("failed to encode WAL op: {e}")))?;
        payload.push_str(&format!("OP {txid} {json}\n"));
    }
    payload.push_str(&format!("COMMIT {txid}\n"));

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;
    file.write_all(payload.as_bytes())
        .map_err(|e| StoreError::io(path, e))?;
    if sync {
        file.sync_all().map_err(|e| StoreError::io(path, e))?;
    }
    Ok(())
}

/// Operations of every transaction that reached its `COMMIT` line, in log
/// order. Transactions without a `COMMIT` are dropped.
pub(crate) fn read_committed(path: &Path) -> Result<Vec<(u64, Vec<WalOp>)>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;

    let mut open: BTreeMap<u64, Vec<&str>> = BTreeMap::new();
    let mut committed = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (tag, rest) = line.split_once(' ').unwrap_or((line, ""));
        match tag {
            "BEGIN" => {
                open.insert(parse_txid(rest, line_no)?, Vec::new());
            }
            "OP" => {
                let (txid, op) = rest.split_once(' ').unwrap_or((rest, ""));
                let txid = parse_txid(txid, line_no)?;
                if let Some(ops) = open.get_mut(&txid) {
                    ops.push(op);
                }
            }
            "COMMIT" => {
                let txid = parse_txid(rest, line_no)?;
                if let Some(raw) = open.remove(&txid) {
                    let mut ops = Vec::with_capacity(raw.len());
                    for op in raw {
                        let op: WalOp = serde_json::from_str(op).map_err(|e| {
                            StoreError::Malformed(format!("bad WAL op in transaction {txid}: {e}"))
                        })?;
                        ops.push(op);
                    }
                    committed.push((txid, ops));
                }
            }
            other => {
                return Err(StoreError::Malformed(format!(
                    "unknown WAL record '{other}' at line {}",
                    line_no + 1
                )));
            }
        }
    }
    Ok(committed)
}

fn parse_txid(raw: &str, line_no: usize) -> Result<u64, StoreError> {
    raw.trim().parse::<u64>().map_err(|_| {
        StoreError::Malformed(format!(
            "bad transaction id '{raw}' in WAL at line {}",
            line_no + 1
        ))
    })
}

pub(crate) fn apply(ops: Vec<WalOp>, state: &mut StoreState) -> Result<(), StoreError> {
    for op in ops {
        match op {
            WalOp::Put { key, value } => {
                let bytes = hex::decode(&value).map_err(|e| {
                    StoreError::Malformed(format!("bad payload for '{key}' in WAL: {e}"))
                })?;
                state.records.insert(key, bytes);
            }
            WalOp::Delete { key } => {
                state.records.remove(&key);
            }
            WalOp::Version { value } => state.schema_version = value,
        }
    }
    Ok(())
}

pub(crate) fn truncate(path: &Path) -> Result<(), StoreError> {
    fs::write(path, "").map_err(|e| StoreError::io(path, e))
}
