use thiserror::Error;

/// Failures raised by a storage collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed catalog data: {0}")]
    Malformed(String),
    #[error("Storage transaction error: {0}")]
    Transaction(String),
}

impl StoreError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Lexical error at offset {offset}: {message}")]
    Lexical { message: String, offset: usize },

    #[error("Syntax error at offset {offset} near '{found}': {message}")]
    Syntax {
        message: String,
        found: String,
        offset: usize,
    },

    #[error("Object '{name}' already exists")]
    DuplicateDefinition { name: String },

    #[error("{0}")]
    StructuralConstraint(String),

    #[error("No such object '{name}'")]
    NotFound { name: String },

    #[error("{0}")]
    Transaction(String),

    #[error("Catalog I/O failed: {0}")]
    CatalogIo(#[from] StoreError),
}

impl DbError {
    pub(crate) fn structural(message: impl Into<String>) -> Self {
        DbError::StructuralConstraint(message.into())
    }

    pub(crate) fn duplicate(name: impl Into<String>) -> Self {
        DbError::DuplicateDefinition { name: name.into() }
    }
}

pub type Result<T, E = DbError> = std::result::Result<T, E>;
