use crate::parser::command::{
    ConflictAction, Constraint, ConstraintKind, Deferrable, ForeignKeyAction, ForeignKeyClause,
    IndexedColumn, QualifiedName, ReferentialAction, SortOrder, TypeName,
};
use crate::parser::parser::lexer::Lexer;
use crate::parser::token::{is_plain_identifier, name_key, Identifier, TokenKind};
use crate::storage::schema::{ColumnDef, IndexDef, TableDef};

/// How identifiers, types and expressions are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    /// As written in the source.
    Canonical,
    /// Case-folded and whitespace-collapsed; used to compare definitions.
    Normalized,
}

impl Style {
    fn ident(self, ident: &Identifier) -> String {
        match self {
            Style::Canonical => ident.to_string(),
            Style::Normalized => {
                let folded = name_key(ident.value());
                if is_plain_identifier(&folded) {
                    folded
                } else {
                    format!("\"{}\"", folded.replace('"', "\"\""))
                }
            }
        }
    }

    fn type_name(self, type_name: &TypeName) -> String {
        match self {
            Style::Canonical => type_name.text.clone(),
            Style::Normalized => {
                let mut out = type_name.name.to_ascii_uppercase();
                if !type_name.args.is_empty() {
                    out.push_str(&format!("({})", type_name.args.join(",")));
                }
                out
            }
        }
    }

    fn expr(self, text: &str) -> String {
        match self {
            Style::Canonical => text.to_string(),
            Style::Normalized => normalize_expr(text),
        }
    }
}

/// Re-lexes expression text and joins the tokens with single spaces.
/// Identifiers are case-folded and lose their quoting; literals are kept.
fn normalize_expr(text: &str) -> String {
    let Ok(tokens) = Lexer::new(text).tokenize() else {
        return text.split_whitespace().collect::<Vec<_>>().join(" ");
    };
    tokens
        .iter()
        .filter_map(|token| match &token.kind {
            TokenKind::Eof => None,
            TokenKind::Ident(ident) if ident.is_bare() => Some(name_key(ident.value())),
            TokenKind::Ident(ident) => Some(Style::Normalized.ident(ident)),
            TokenKind::Str(s) => Some(format!("'{}'", s.replace('\'', "''"))),
            TokenKind::Blob(hex) => Some(format!("X'{}'", hex.to_ascii_uppercase())),
            TokenKind::Num(n) => Some(n.to_ascii_lowercase()),
            TokenKind::LParen => Some("(".to_string()),
            TokenKind::RParen => Some(")".to_string()),
            TokenKind::Comma => Some(",".to_string()),
            TokenKind::Semicolon => Some(";".to_string()),
            TokenKind::Dot => Some(".".to_string()),
            TokenKind::Minus => Some("-".to_string()),
            TokenKind::Plus => Some("+".to_string()),
            TokenKind::Operator(op) => Some(op.clone()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical `CREATE TABLE` text for `table`.
pub fn table_sql(table: &TableDef) -> String {
    render_table(table, Style::Canonical, true)
}

/// Canonical `CREATE INDEX` text for `index`.
pub fn index_sql(index: &IndexDef) -> String {
    render_index(index, Style::Canonical, true)
}

/// Structural fingerprint of a table; equal for definitions that differ only
/// in case, quoting, whitespace or the `IF NOT EXISTS` guard.
pub fn table_fingerprint(table: &TableDef) -> String {
    render_table(table, Style::Normalized, false)
}

pub fn index_fingerprint(index: &IndexDef) -> String {
    render_index(index, Style::Normalized, false)
}

fn qualified(style: Style, database: Option<&Identifier>, name: &Identifier) -> String {
    match database {
        Some(db) => format!("{}.{}", style.ident(db), style.ident(name)),
        None => style.ident(name),
    }
}

fn render_table(table: &TableDef, style: Style, guard: bool) -> String {
    let mut sql = String::from("CREATE ");
    if table.temporary {
        sql.push_str("TEMP ");
    }
    sql.push_str("TABLE ");
    if guard && table.if_not_exists {
        sql.push_str("IF NOT EXISTS ");
    }
    sql.push_str(&qualified(style, table.database.as_ref(), &table.name));

    let mut items = Vec::with_capacity(table.columns.len() + table.constraints.len());
    for (i, column) in table.columns.iter().enumerate() {
        items.push(render_column(column, style));
        items.extend(
            table
                .constraints
                .iter()
                .filter(|tc| tc.after_column == i + 1)
                .map(|tc| render_constraint(&tc.constraint, style)),
        );
    }
    sql.push_str(&format!(" ({})", items.join(", ")));

    if table.without_rowid {
        sql.push_str(" WITHOUT ROWID");
    }
    sql
}

fn render_column(column: &ColumnDef, style: Style) -> String {
    let mut parts = vec![style.ident(&column.name)];
    if let Some(type_name) = &column.type_name {
        parts.push(style.type_name(type_name));
    }
    parts.extend(column.constraints.iter().map(|c| render_constraint(c, style)));
    parts.join(" ")
}

fn render_index(index: &IndexDef, style: Style, guard: bool) -> String {
    let mut sql = String::from("CREATE ");
    if index.unique {
        sql.push_str("UNIQUE ");
    }
    sql.push_str("INDEX ");
    if guard && index.if_not_exists {
        sql.push_str("IF NOT EXISTS ");
    }
    sql.push_str(&qualified(style, index.database.as_ref(), &index.name));
    sql.push_str(&format!(
        " ON {} ({})",
        style.ident(&index.table),
        indexed_columns(&index.columns, style)
    ));
    if let Some(expr) = &index.where_clause {
        sql.push_str(&format!(" WHERE {}", style.expr(expr)));
    }
    sql
}

fn indexed_columns(columns: &[IndexedColumn], style: Style) -> String {
    columns
        .iter()
        .map(|c| {
            let mut out = style.ident(&c.name);
            if let Some(collation) = &c.collation {
                out.push_str(&format!(" COLLATE {}", style.ident(collation)));
            }
            if let Some(order) = c.order {
                out.push(' ');
                out.push_str(sort_order(order));
            }
            out
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn identifier_list(names: &[Identifier], style: Style) -> String {
    names
        .iter()
        .map(|n| style.ident(n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn sort_order(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

fn conflict(out: &mut String, on_conflict: Option<ConflictAction>) {
    let Some(action) = on_conflict else {
        return;
    };
    out.push_str(" ON CONFLICT ");
    out.push_str(match action {
        ConflictAction::Rollback => "ROLLBACK",
        ConflictAction::Abort => "ABORT",
        ConflictAction::Fail => "FAIL",
        ConflictAction::Ignore => "IGNORE",
        ConflictAction::Replace => "REPLACE",
    });
}

fn referential_action(action: ReferentialAction) -> &'static str {
    match action {
        ReferentialAction::SetNull => "SET NULL",
        ReferentialAction::SetDefault => "SET DEFAULT",
        ReferentialAction::Cascade => "CASCADE",
        ReferentialAction::Restrict => "RESTRICT",
        ReferentialAction::NoAction => "NO ACTION",
    }
}

fn references(clause: &ForeignKeyClause, style: Style) -> String {
    let mut out = format!("REFERENCES {}", style.ident(&clause.table));
    if !clause.columns.is_empty() {
        out.push_str(&format!(" ({})", identifier_list(&clause.columns, style)));
    }
    for action in &clause.actions {
        match action {
            ForeignKeyAction::OnDelete(a) => {
                out.push_str(&format!(" ON DELETE {}", referential_action(*a)))
            }
            ForeignKeyAction::OnUpdate(a) => {
                out.push_str(&format!(" ON UPDATE {}", referential_action(*a)))
            }
            ForeignKeyAction::Match(name) => out.push_str(&format!(" MATCH {}", style.ident(name))),
        }
    }
    if let Some(Deferrable {
        not,
        initially_deferred,
    }) = clause.deferrable
    {
        out.push_str(if not { " NOT DEFERRABLE" } else { " DEFERRABLE" });
        match initially_deferred {
            Some(true) => out.push_str(" INITIALLY DEFERRED"),
            Some(false) => out.push_str(" INITIALLY IMMEDIATE"),
            None => {}
        }
    }
    out
}

fn render_constraint(constraint: &Constraint, style: Style) -> String {
    let mut out = String::new();
    if let Some(name) = &constraint.name {
        out.push_str(&format!("CONSTRAINT {} ", style.ident(name)));
    }
    match &constraint.kind {
        ConstraintKind::NotNull { on_conflict } => {
            out.push_str("NOT NULL");
            conflict(&mut out, *on_conflict);
        }
        ConstraintKind::Null => out.push_str("NULL"),
        ConstraintKind::PrimaryKey {
            order,
            columns,
            on_conflict,
            autoincrement,
            index: _,
        } => {
            out.push_str("PRIMARY KEY");
            if let Some(order) = order {
                out.push(' ');
                out.push_str(sort_order(*order));
            }
            if !columns.is_empty() {
                out.push_str(&format!(" ({})", indexed_columns(columns, style)));
            }
            conflict(&mut out, *on_conflict);
            if *autoincrement {
                out.push_str(" AUTOINCREMENT");
            }
        }
        ConstraintKind::Unique {
            columns,
            on_conflict,
            index: _,
        } => {
            out.push_str("UNIQUE");
            if !columns.is_empty() {
                out.push_str(&format!(" ({})", indexed_columns(columns, style)));
            }
            conflict(&mut out, *on_conflict);
        }
        ConstraintKind::Default { value } => {
            out.push_str(&format!("DEFAULT {}", style.expr(value)));
        }
        ConstraintKind::Check { expr } => {
            out.push_str(&format!("CHECK ({})", style.expr(expr)));
        }
        ConstraintKind::Collate { collation } => {
            out.push_str(&format!("COLLATE {}", style.ident(collation)));
        }
        ConstraintKind::ForeignKey { columns, clause } => {
            if !columns.is_empty() {
                out.push_str(&format!("FOREIGN KEY ({}) ", identifier_list(columns, style)));
            }
            out.push_str(&references(clause, style));
        }
    }
    out
}

/// One statement per line: every visible table followed by its indices.
/// Implicit indices are listed as comments.
pub fn format_schema<'a>(
    tables: &[&'a TableDef],
    indices_of: impl Fn(&str) -> Vec<&'a IndexDef>,
) -> String {
    let mut lines = Vec::new();
    for table in tables {
        lines.push(format!("{};", table.to_sql()));
        for index in indices_of(table.name()) {
            if index.implicit {
                lines.push(format!(
                    "-- {} ON {} ({})",
                    index.name(),
                    table.name(),
                    index.column_names().join(", ")
                ));
            } else {
                lines.push(format!("{};", index.to_sql()));
            }
        }
    }
    lines.join("\n")
}

/// `QualifiedName` as written, for messages.
pub fn qualified_name(name: &QualifiedName) -> String {
    qualified(Style::Canonical, name.database.as_ref(), &name.name)
}
