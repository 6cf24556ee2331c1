use std::collections::HashSet;

use crate::error::{DbError, Result};
use crate::parser::command::{
    Constraint, ConstraintKind, CreateIndex, CreateTable, ForeignKeyClause, IndexedColumn,
    QualifiedName, SortOrder,
};
use crate::parser::token::{is_plain_identifier, Identifier, QuoteStyle};
use crate::storage::catalog::SchemaView;
use crate::storage::schema::{ColumnDef, IndexDef, TableConstraint, TableDef};

const RESERVED_PREFIX: &str = "sqlite_";

/// Name of the `ordinal`-th (1-based) index materialized for `table`.
pub fn autoindex_name(table: &str, ordinal: usize) -> String {
    format!("sqlite_autoindex_{table}_{ordinal}")
}

fn check_reserved(name: &Identifier) -> Result<()> {
    let reserved = name
        .value()
        .get(..RESERVED_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(RESERVED_PREFIX));
    if reserved {
        return Err(DbError::structural(format!(
            "object name reserved for internal use: {}",
            name.value()
        )));
    }
    Ok(())
}

/// Position of a constraint inside a table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Column(usize, usize),
    Table(usize),
}

impl Slot {
    fn owner(self) -> Option<usize> {
        match self {
            Slot::Column(c, _) => Some(c),
            Slot::Table(_) => None,
        }
    }
}

fn declaration_order(columns: &[ColumnDef], constraints: &[TableConstraint]) -> Vec<Slot> {
    let mut out = Vec::new();
    for (c, col) in columns.iter().enumerate() {
        out.extend((0..col.constraints.len()).map(|j| Slot::Column(c, j)));
        out.extend(
            constraints
                .iter()
                .enumerate()
                .filter(|(_, tc)| tc.after_column == c + 1)
                .map(|(k, _)| Slot::Table(k)),
        );
    }
    out
}

fn constraint_at<'c>(
    columns: &'c [ColumnDef],
    constraints: &'c [TableConstraint],
    slot: Slot,
) -> &'c Constraint {
    match slot {
        Slot::Column(c, j) => &columns[c].constraints[j],
        Slot::Table(k) => &constraints[k].constraint,
    }
}

fn constraint_at_mut<'c>(
    columns: &'c mut [ColumnDef],
    constraints: &'c mut [TableConstraint],
    slot: Slot,
) -> &'c mut Constraint {
    match slot {
        Slot::Column(c, j) => &mut columns[c].constraints[j],
        Slot::Table(k) => &mut constraints[k].constraint,
    }
}

/// Ordinals of the columns a PRIMARY KEY or UNIQUE constraint covers.
fn key_columns(
    columns: &[ColumnDef],
    owner: Option<usize>,
    terms: &[IndexedColumn],
    what: &str,
) -> Result<Vec<usize>> {
    if let Some(c) = owner {
        return Ok(vec![c]);
    }
    let mut out = Vec::with_capacity(terms.len());
    for term in terms {
        let ordinal = columns
            .iter()
            .position(|col| col.name == term.name)
            .ok_or_else(|| {
                DbError::structural(format!(
                    "no such column: {} in {what}",
                    term.name.value()
                ))
            })?;
        if out.contains(&ordinal) {
            return Err(DbError::structural(format!(
                "column {} listed twice in {what}",
                term.name.value()
            )));
        }
        out.push(ordinal);
    }
    Ok(out)
}

fn check_foreign_key(
    table: &Identifier,
    columns: &[ColumnDef],
    owner: Option<usize>,
    local: &[Identifier],
    clause: &ForeignKeyClause,
    view: &SchemaView<'_>,
) -> Result<()> {
    let local_count = match owner {
        Some(c) => {
            if clause.columns.len() > 1 {
                return Err(DbError::structural(format!(
                    "foreign key on {} should reference only one column of table {}",
                    columns[c].name.value(),
                    clause.table.value()
                )));
            }
            1
        }
        None => {
            for name in local {
                if !columns.iter().any(|col| col.name == *name) {
                    return Err(DbError::structural(format!(
                        "unknown column \"{}\" in foreign key definition",
                        name.value()
                    )));
                }
            }
            local.len()
        }
    };
    if !clause.columns.is_empty() && clause.columns.len() != local_count {
        return Err(DbError::structural(
            "number of columns in foreign key does not match the number of columns in the referenced table",
        ));
    }

    let referenced: Option<Vec<&Identifier>> = if clause.table == *table {
        Some(columns.iter().map(|c| &c.name).collect())
    } else {
        view.table(clause.table.value())
            .map(|t| t.columns.iter().map(|c| &c.name).collect())
    };
    if let Some(known) = referenced {
        for name in &clause.columns {
            if !known.iter().any(|k| *k == name) {
                return Err(DbError::structural(format!(
                    "foreign key references unknown column \"{}\" of table {}",
                    name.value(),
                    clause.table.value()
                )));
            }
        }
    }
    Ok(())
}

fn generated_identifier(name: String) -> Identifier {
    let quote = if is_plain_identifier(&name) {
        QuoteStyle::Bare
    } else {
        QuoteStyle::Double
    };
    Identifier::new(name, quote)
}

/// Validates a parsed `CREATE TABLE` and materializes its implicit indices.
///
/// `view` is only consulted for the columns of tables referenced by foreign
/// keys. Name collisions are the caller's concern.
pub fn resolve_table(
    stmt: CreateTable,
    view: &SchemaView<'_>,
    schema_version: u64,
) -> Result<(TableDef, Vec<IndexDef>)> {
    let CreateTable {
        name: QualifiedName { database, name },
        temporary,
        if_not_exists,
        without_rowid,
        columns: column_specs,
        constraints: table_specs,
    } = stmt;
    check_reserved(&name)?;

    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(column_specs.len());
    for (ordinal, spec) in column_specs.into_iter().enumerate() {
        if !seen.insert(spec.name.key()) {
            return Err(DbError::structural(format!(
                "duplicate column name: {}",
                spec.name.value()
            )));
        }
        columns.push(ColumnDef {
            name: spec.name,
            type_name: spec.type_name,
            ordinal,
            constraints: spec.constraints,
        });
    }
    let mut constraints: Vec<TableConstraint> = table_specs
        .into_iter()
        .map(|spec| TableConstraint {
            constraint: spec.constraint,
            after_column: spec.after_column,
        })
        .collect();

    let order = declaration_order(&columns, &constraints);

    let mut primary: Option<(Slot, Vec<usize>)> = None;
    for &slot in &order {
        let constraint = constraint_at(&columns, &constraints, slot);
        match &constraint.kind {
            ConstraintKind::PrimaryKey { columns: terms, .. } => {
                if primary.is_some() {
                    return Err(DbError::structural(format!(
                        "table \"{}\" has more than one primary key",
                        name.value()
                    )));
                }
                let ordinals = key_columns(&columns, slot.owner(), terms, "PRIMARY KEY")?;
                primary = Some((slot, ordinals));
            }
            ConstraintKind::Unique { columns: terms, .. } => {
                key_columns(&columns, slot.owner(), terms, "UNIQUE")?;
            }
            ConstraintKind::ForeignKey {
                columns: local,
                clause,
            } => check_foreign_key(&name, &columns, slot.owner(), local, clause, view)?,
            ConstraintKind::NotNull { .. }
            | ConstraintKind::Null
            | ConstraintKind::Default { .. }
            | ConstraintKind::Check { .. }
            | ConstraintKind::Collate { .. } => {}
        }
    }

    if without_rowid && primary.is_none() {
        return Err(DbError::structural(format!(
            "PRIMARY KEY missing on table {}",
            name.value()
        )));
    }

    let rowid_alias = match &primary {
        Some((slot, ordinals)) if !without_rowid && ordinals.len() == 1 => {
            let column = &columns[ordinals[0]];
            let integer = column
                .declared_type()
                .is_some_and(|t| t.eq_ignore_ascii_case("INTEGER"));
            let descending = matches!(
                constraint_at(&columns, &constraints, *slot).kind,
                ConstraintKind::PrimaryKey {
                    order: Some(SortOrder::Desc),
                    ..
                }
            );
            (integer && !descending).then_some(ordinals[0])
        }
        _ => None,
    };

    if let Some((slot, _)) = &primary {
        let autoincrement = matches!(
            constraint_at(&columns, &constraints, *slot).kind,
            ConstraintKind::PrimaryKey {
                autoincrement: true,
                ..
            }
        );
        if autoincrement && rowid_alias.is_none() {
            return Err(DbError::structural(
                "AUTOINCREMENT is only allowed on an INTEGER PRIMARY KEY",
            ));
        }
    }

    let alias_slot = rowid_alias.and(primary.as_ref().map(|(slot, _)| *slot));
    let mut indices = Vec::new();
    for &slot in &order {
        if Some(slot) == alias_slot {
            continue;
        }
        let terms = match (&constraint_at(&columns, &constraints, slot).kind, slot) {
            (ConstraintKind::PrimaryKey { order, .. }, Slot::Column(c, _)) => vec![IndexedColumn {
                name: columns[c].name.clone(),
                collation: None,
                order: *order,
            }],
            (ConstraintKind::Unique { .. }, Slot::Column(c, _)) => {
                vec![IndexedColumn::named(columns[c].name.clone())]
            }
            (ConstraintKind::PrimaryKey { columns: terms, .. }, Slot::Table(_))
            | (ConstraintKind::Unique { columns: terms, .. }, Slot::Table(_)) => terms.clone(),
            _ => continue,
        };

        let index_name = autoindex_name(name.value(), indices.len() + 1);
        match &mut constraint_at_mut(&mut columns, &mut constraints, slot).kind {
            ConstraintKind::PrimaryKey { index, .. } | ConstraintKind::Unique { index, .. } => {
                *index = Some(index_name.clone());
            }
            _ => {}
        }
        indices.push(IndexDef {
            database: database.clone(),
            name: generated_identifier(index_name),
            table: name.clone(),
            unique: true,
            implicit: true,
            if_not_exists: false,
            temporary,
            columns: terms,
            where_clause: None,
        });
    }

    let table = TableDef {
        database,
        name,
        temporary,
        if_not_exists,
        without_rowid,
        columns,
        constraints,
        rowid_alias,
        schema_version,
    };
    Ok((table, indices))
}

/// Validates a parsed `CREATE INDEX` against the visible tables.
pub fn resolve_index(stmt: CreateIndex, view: &SchemaView<'_>) -> Result<IndexDef> {
    let CreateIndex {
        name: QualifiedName { database, name },
        table,
        unique,
        if_not_exists,
        columns,
        where_clause,
    } = stmt;
    check_reserved(&name)?;

    let target = view
        .table(table.value())
        .ok_or_else(|| DbError::structural(format!("no such table: {}", table.value())))?;

    let mut seen = HashSet::new();
    for term in &columns {
        if target.column(term.name.value()).is_none() {
            return Err(DbError::structural(format!(
                "table {} has no column named {}",
                target.name(),
                term.name.value()
            )));
        }
        if !seen.insert(term.name.key()) {
            return Err(DbError::structural(format!(
                "column {} listed twice in index {}",
                term.name.value(),
                name.value()
            )));
        }
    }

    Ok(IndexDef {
        database,
        name,
        table,
        unique,
        implicit: false,
        if_not_exists,
        temporary: target.temporary,
        columns,
        where_clause,
    })
}
