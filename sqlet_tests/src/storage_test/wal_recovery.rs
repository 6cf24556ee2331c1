use super::*;

fn table_put(name: &str, sql: &str, columns: &[&str], version: u64) -> String {
    let record = CatalogRecord {
        kind: RecordKind::Table,
        name: name.to_string(),
        table: name.to_string(),
        sql: Some(sql.to_string()),
        implicit: false,
        unique: false,
        columns: columns.iter().map(|c| c.to_string()).collect(),
        schema_version: version,
    };
    format!(
        r#"{{"op":"put","key":"{}","value":"{}"}}"#,
        name.to_ascii_lowercase(),
        hex::encode(record.to_bytes().unwrap())
    )
}

#[test]
fn test_wal_is_truncated_after_commit() {
    let path = temp_dir("wal_truncate");
    {
        let mut db = Database::open(path.clone()).unwrap();
        db.execute("create table users (id int, name text)").unwrap();
    }
    let wal = std::fs::read_to_string(path.join("wal.log")).unwrap();
    assert_eq!(wal, "");
}

#[test]
fn test_recovery_ignores_uncommitted_wal_transaction() {
    let path = temp_dir("wal_uncommitted_ignored");
    {
        let mut db = Database::open(path.clone()).unwrap();
        db.execute("create table users (id int, name text)").unwrap();
    }

    // Crash after BEGIN + OP, before COMMIT.
    std::fs::write(
        path.join("wal.log"),
        "BEGIN 42\nOP 42 {\"op\":\"delete\",\"key\":\"users\"}\n",
    )
    .unwrap();

    {
        let db = Database::open(path.clone()).unwrap();
        assert!(db.get_table("users").is_some());
        assert_eq!(db.schema_version(), 1);
    }
    let wal = std::fs::read_to_string(path.join("wal.log")).unwrap();
    assert_eq!(wal, "");
}

#[test]
fn test_recovery_replays_committed_wal_transaction() {
    let path = temp_dir("wal_committed_replayed");
    {
        let mut db = Database::open(path.clone()).unwrap();
        db.execute("create table users (id int, name text)").unwrap();
    }

    // Crash after the COMMIT line is durable but before the checkpoint.
    let wal = format!(
        "BEGIN 7\nOP 7 {}\nOP 7 {{\"op\":\"version\",\"value\":2}}\nCOMMIT 7\n",
        table_put("orders", "CREATE TABLE orders (id integer PRIMARY KEY, total real)", &["id", "total"], 2)
    );
    std::fs::write(path.join("wal.log"), wal).unwrap();

    {
        let db = Database::open(path.clone()).unwrap();
        assert!(db.get_table("users").is_some());
        let orders = db.get_table("orders").unwrap();
        assert_eq!(orders.rowid_alias, Some(0));
        assert_eq!(orders.schema_version, 2);
        assert_eq!(db.schema_version(), 2);
    }
    {
        let db = Database::open(path.clone()).unwrap();
        assert!(db.get_table("orders").is_some());
    }
}

#[test]
fn test_recovery_replays_only_committed_when_wal_has_mixed_transactions() {
    let path = temp_dir("wal_mixed_recovery");
    {
        let mut db = Database::open(path.clone()).unwrap();
        db.execute("create table users (id int, name text)").unwrap();
    }

    let wal = format!(
        "BEGIN 1\nOP 1 {}\nOP 1 {{\"op\":\"version\",\"value\":5}}\nCOMMIT 1\n\
         BEGIN 2\nOP 2 {{\"op\":\"delete\",\"key\":\"users\"}}\n\
         BEGIN 3\nOP 3 {}\nCOMMIT 3\n",
        table_put("a", "CREATE TABLE a (x)", &["x"], 5),
        table_put("c", "CREATE TABLE c (z)", &["z"], 5),
    );
    std::fs::write(path.join("wal.log"), wal).unwrap();

    {
        let db = Database::open(path.clone()).unwrap();
        let names: Vec<&str> = db.tables().into_iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["a", "c", "users"]);
        assert_eq!(db.schema_version(), 5);
    }
}

#[test]
fn test_commits_after_recovery_use_fresh_transaction_ids() {
    let path = temp_dir("wal_txid");
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(
        path.join("wal.log"),
        format!(
            "BEGIN 9\nOP 9 {}\nOP 9 {{\"op\":\"version\",\"value\":1}}\nCOMMIT 9\n",
            table_put("t", "CREATE TABLE t (a)", &["a"], 1)
        ),
    )
    .unwrap();

    {
        let mut db = Database::open(path.clone()).unwrap();
        assert!(db.get_table("t").is_some());
        db.execute("create table u (b)").unwrap();
        assert_eq!(db.schema_version(), 2);
    }
    {
        let db = Database::open(path.clone()).unwrap();
        assert_eq!(db.tables().len(), 2);
    }
}

#[test]
fn test_malformed_wal_line_fails_open() {
    let path = temp_dir("wal_malformed");
    {
        let mut db = Database::open(path.clone()).unwrap();
        db.execute("create table users (id int)").unwrap();
    }
    std::fs::write(path.join("wal.log"), "GARBAGE 1\n").unwrap();

    let err = Database::open(path.clone()).unwrap_err();
    assert!(matches!(err, DbError::CatalogIo(StoreError::Malformed(_))));
}

#[test]
fn test_bad_op_in_committed_transaction_fails_open() {
    let path = temp_dir("wal_bad_op");
    std::fs::create_dir_all(&path).unwrap();
    std::fs::write(
        path.join("wal.log"),
        "BEGIN 1\nOP 1 {\"op\":\"explode\"}\nCOMMIT 1\n",
    )
    .unwrap();

    let err = Database::open(path.clone()).unwrap_err();
    assert!(matches!(err, DbError::CatalogIo(StoreError::Malformed(_))));
}
