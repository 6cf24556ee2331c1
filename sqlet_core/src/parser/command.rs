use serde::{Deserialize, Serialize};

use crate::parser::token::Identifier;

/// Locking intent of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionMode {
    ReadOnly,
    Write,
    Exclusive,
}

impl TransactionMode {
    pub fn is_write(self) -> bool {
        !matches!(self, TransactionMode::ReadOnly)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// `ON CONFLICT` resolution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictAction {
    Rollback,
    Abort,
    Fail,
    Ignore,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferentialAction {
    SetNull,
    SetDefault,
    Cascade,
    Restrict,
    NoAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    OnDelete(ReferentialAction),
    OnUpdate(ReferentialAction),
    Match(Identifier),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deferrable {
    pub not: bool,
    /// `Some(true)` for `INITIALLY DEFERRED`, `Some(false)` for `INITIALLY IMMEDIATE`.
    pub initially_deferred: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyClause {
    pub table: Identifier,
    pub columns: Vec<Identifier>,
    pub actions: Vec<ForeignKeyAction>,
    pub deferrable: Option<Deferrable>,
}

/// One term of an index or of a PRIMARY KEY / UNIQUE column list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedColumn {
    pub name: Identifier,
    pub collation: Option<Identifier>,
    pub order: Option<SortOrder>,
}

impl IndexedColumn {
    pub fn named(name: Identifier) -> Self {
        Self {
            name,
            collation: None,
            order: None,
        }
    }
}

/// Column and table constraints.
///
/// Column-level `PrimaryKey`/`Unique`/`ForeignKey` leave `columns` empty; the
/// declaring column is implied. `index` is the name of the index that
/// materializes the constraint and is filled in by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    NotNull {
        on_conflict: Option<ConflictAction>,
    },
    Null,
    PrimaryKey {
        order: Option<SortOrder>,
        columns: Vec<IndexedColumn>,
        on_conflict: Option<ConflictAction>,
        autoincrement: bool,
        index: Option<String>,
    },
    Unique {
        columns: Vec<IndexedColumn>,
        on_conflict: Option<ConflictAction>,
        index: Option<String>,
    },
    Default {
        value: String,
    },
    Check {
        expr: String,
    },
    Collate {
        collation: Identifier,
    },
    ForeignKey {
        columns: Vec<Identifier>,
        clause: ForeignKeyClause,
    },
}

impl ConstraintKind {
    /// Whether the constraint is enforced through an index.
    pub fn needs_index(&self) -> bool {
        matches!(self, ConstraintKind::PrimaryKey { .. } | ConstraintKind::Unique { .. })
    }

    /// Name of the index materializing this constraint, once resolved.
    pub fn index_name(&self) -> Option<&str> {
        match self {
            ConstraintKind::PrimaryKey { index, .. } | ConstraintKind::Unique { index, .. } => {
                index.as_deref()
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: Option<Identifier>,
    pub kind: ConstraintKind,
}

/// Declared column type, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeName {
    /// Source text, e.g. `VARCHAR (10)`.
    pub text: String,
    /// Type words joined by single spaces, e.g. `VARCHAR`.
    pub name: String,
    /// Size arguments, e.g. `["10"]`.
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: Identifier,
    pub type_name: Option<TypeName>,
    pub constraints: Vec<Constraint>,
}

/// A table constraint and the number of column definitions preceding it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConstraintSpec {
    pub constraint: Constraint,
    pub after_column: usize,
}

/// `[schema.]name`
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub database: Option<Identifier>,
    pub name: Identifier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: QualifiedName,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub without_rowid: bool,
    pub columns: Vec<ColumnSpec>,
    pub constraints: Vec<TableConstraintSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub name: QualifiedName,
    pub table: Identifier,
    pub unique: bool,
    pub if_not_exists: bool,
    pub columns: Vec<IndexedColumn>,
    pub where_clause: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Begin(TransactionMode),
    Commit,
    Rollback,

    CreateTable(CreateTable),
    CreateIndex(CreateIndex),
    DropTable {
        name: QualifiedName,
        if_exists: bool,
    },
    DropIndex {
        name: QualifiedName,
        if_exists: bool,
    },
}
