use super::*;

/// Behavior every store must share.
fn check_store_contract(store: &mut dyn SchemaStore) {
    assert!(matches!(
        store.write_record("a", b"1"),
        Err(StoreError::Transaction(_))
    ));
    assert!(store.bump_schema_version().is_err());

    store.begin(TransactionMode::Write).unwrap();
    assert!(store.begin(TransactionMode::Write).is_err());
    store.write_record("a", b"1").unwrap();
    store.write_record("b", b"2").unwrap();
    assert_eq!(store.read_record("a").unwrap(), Some(b"1".to_vec()));
    assert_eq!(store.bump_schema_version().unwrap(), 1);
    assert_eq!(store.schema_version(), 1);
    store.commit().unwrap();
    assert!(!store.in_transaction());

    store.begin(TransactionMode::Write).unwrap();
    store.delete_record("a").unwrap();
    store.write_record("c", b"3").unwrap();
    store.bump_schema_version().unwrap();
    assert_eq!(store.record_names().unwrap(), vec!["b", "c"]);
    store.rollback().unwrap();

    assert_eq!(store.record_names().unwrap(), vec!["a", "b"]);
    assert_eq!(store.read_record("c").unwrap(), None);
    assert_eq!(store.schema_version(), 1);

    store.begin(TransactionMode::ReadOnly).unwrap();
    assert!(store.write_record("d", b"4").is_err());
    assert!(store.delete_record("a").is_err());
    assert!(store.bump_schema_version().is_err());
    store.commit().unwrap();
    assert_eq!(store.record_names().unwrap(), vec!["a", "b"]);
}

#[test]
fn test_mem_store_contract() {
    let mut store = MemStore::new();
    check_store_contract(&mut store);
}

#[test]
fn test_disk_store_contract() {
    let path = temp_dir("disk_contract");
    let mut store = DiskStore::open(&path, &DbConfig::default()).unwrap();
    assert_eq!(store.root(), path.as_path());
    check_store_contract(&mut store);
    drop(store);

    let store = DiskStore::open(&path, &DbConfig::default()).unwrap();
    assert_eq!(store.record_names().unwrap(), vec!["a", "b"]);
    assert_eq!(store.read_record("b").unwrap(), Some(b"2".to_vec()));
    assert_eq!(store.schema_version(), 1);
    let _ = std::fs::remove_dir_all(&path);
}

#[test]
fn test_disk_store_layout() {
    let path = temp_dir("layout");
    let _store = DiskStore::open(&path, &DbConfig::default()).unwrap();
    assert!(path.join("catalog.json").exists());
    assert!(path.join("wal.log").exists());
    let _ = std::fs::remove_dir_all(&path);
}

#[test]
fn test_disk_store_without_fsync_still_persists() {
    let path = temp_dir("no_sync");
    let config = DbConfig {
        sync_wal: false,
        ..DbConfig::default()
    };
    {
        let mut db = Database::open_with(path.clone(), config).unwrap();
        db.execute("create table t (a)").unwrap();
    }
    {
        let db = Database::open_with(path.clone(), config).unwrap();
        assert!(db.get_table("t").is_some());
    }
    let _ = std::fs::remove_dir_all(&path);
}

#[test]
fn test_commit_checkpoints_snapshot_and_clears_wal() -> anyhow::Result<()> {
    let path = temp_dir("checkpoint");
    let mut store = DiskStore::open(&path, &DbConfig::default())?;
    store.begin(TransactionMode::Write)?;
    store.write_record("t", b"table")?;
    store.bump_schema_version()?;
    store.commit()?;

    assert!(!path.join("catalog.json.tmp").exists());
    assert_eq!(std::fs::read_to_string(path.join("wal.log"))?, "");
    let snapshot: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path.join("catalog.json"))?)?;
    assert_eq!(snapshot["schema_version"], 1);
    assert_eq!(snapshot["records"]["t"], hex::encode(b"table"));

    let _ = std::fs::remove_dir_all(&path);
    Ok(())
}
