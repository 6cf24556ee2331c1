/// Options for opening a directory-backed database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbConfig {
    /// Create the database directory when it does not exist.
    pub create_if_missing: bool,
    /// fsync the WAL before a commit is acknowledged.
    pub sync_wal: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_wal: true,
        }
    }
}
