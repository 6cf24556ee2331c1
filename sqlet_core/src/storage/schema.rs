use crate::engine::format;
use crate::parser::command::{Constraint, ConstraintKind, IndexedColumn, TypeName};
use crate::parser::token::Identifier;

/// A column of a resolved table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Identifier,
    pub type_name: Option<TypeName>,
    /// Zero-based position in the table.
    pub ordinal: usize,
    pub constraints: Vec<Constraint>,
}

impl ColumnDef {
    /// Declared type exactly as written, if any.
    pub fn declared_type(&self) -> Option<&str> {
        self.type_name.as_ref().map(|t| t.text.as_str())
    }

    pub fn is_not_null(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c.kind, ConstraintKind::NotNull { .. }))
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c.kind, ConstraintKind::PrimaryKey { .. }))
    }
}

/// A table-level constraint with the number of columns declared before it.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConstraint {
    pub constraint: Constraint,
    pub after_column: usize,
}

/// A validated table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub database: Option<Identifier>,
    pub name: Identifier,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub without_rowid: bool,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
    /// Ordinal of the column aliasing the rowid.
    pub rowid_alias: Option<usize>,
    /// Schema version in which the table became visible.
    pub schema_version: u64,
}

impl TableDef {
    pub fn name(&self) -> &str {
        self.name.value()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name.matches(name))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.value()).collect()
    }

    /// Column- and table-level constraints in declaration order.
    pub fn constraints_in_order(&self) -> Vec<&Constraint> {
        let mut out = Vec::new();
        for (i, col) in self.columns.iter().enumerate() {
            out.extend(col.constraints.iter());
            out.extend(
                self.constraints
                    .iter()
                    .filter(|tc| tc.after_column == i + 1)
                    .map(|tc| &tc.constraint),
            );
        }
        out
    }

    pub fn primary_key(&self) -> Option<&Constraint> {
        self.constraints_in_order()
            .into_iter()
            .find(|c| matches!(c.kind, ConstraintKind::PrimaryKey { .. }))
    }

    /// Names of the implicit indices backing this table's constraints.
    pub fn index_names(&self) -> Vec<&str> {
        self.constraints_in_order()
            .into_iter()
            .filter_map(|c| c.kind.index_name())
            .collect()
    }

    pub fn rowid_alias_column(&self) -> Option<&ColumnDef> {
        self.rowid_alias.and_then(|i| self.columns.get(i))
    }

    /// Canonical `CREATE TABLE` text.
    pub fn to_sql(&self) -> String {
        format::table_sql(self)
    }
}

/// A validated index definition, explicit or materialized from a constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDef {
    pub database: Option<Identifier>,
    pub name: Identifier,
    pub table: Identifier,
    pub unique: bool,
    /// Created by the resolver for a PRIMARY KEY or UNIQUE constraint.
    pub implicit: bool,
    pub if_not_exists: bool,
    /// Whether the owning table is a TEMP table.
    pub temporary: bool,
    pub columns: Vec<IndexedColumn>,
    pub where_clause: Option<String>,
}

impl IndexDef {
    pub fn name(&self) -> &str {
        self.name.value()
    }

    pub fn table_name(&self) -> &str {
        self.table.value()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.value()).collect()
    }

    /// Canonical `CREATE INDEX` text.
    pub fn to_sql(&self) -> String {
        format::index_sql(self)
    }

    /// Text kept in the catalog record; implicit indices have none.
    pub fn stored_sql(&self) -> Option<String> {
        if self.implicit {
            None
        } else {
            Some(self.to_sql())
        }
    }
}
