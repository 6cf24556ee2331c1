use super::{ParseState, Parser};
use crate::error::Result;
use crate::parser::command::{
    ColumnSpec, Command, Constraint, ConstraintKind, CreateIndex, CreateTable, QualifiedName,
    TableConstraintSpec, TypeName,
};
use crate::parser::token::{Keyword, TokenKind};

impl Parser<'_> {
    /// Everything after `CREATE`.
    pub(super) fn parse_create(&mut self) -> Result<Command> {
        let mut state = ParseState::ExpectKeyword;
        let mut temporary = false;
        let mut unique = false;
        let mut is_index = false;
        let mut if_not_exists = false;
        let mut name: Option<QualifiedName> = None;
        let mut columns: Vec<ColumnSpec> = Vec::new();
        let mut constraints: Vec<TableConstraintSpec> = Vec::new();

        loop {
            state = match state {
                ParseState::ExpectKeyword => {
                    if self.eat_keyword(Keyword::Temp) || self.eat_keyword(Keyword::Temporary) {
                        temporary = true;
                        self.expect_keyword(Keyword::Table)?;
                    } else if self.eat_keyword(Keyword::Unique) {
                        unique = true;
                        is_index = true;
                        self.expect_keyword(Keyword::Index)?;
                    } else if self.eat_keyword(Keyword::Index) {
                        is_index = true;
                    } else if !self.eat_keyword(Keyword::Table) {
                        return Err(self.unexpected("TABLE or INDEX"));
                    }
                    if_not_exists = self.if_not_exists()?;
                    ParseState::ExpectTableOrIndexName
                }
                ParseState::ExpectTableOrIndexName => {
                    if is_index {
                        let index_name = self.qualified_name("an index name")?;
                        return self.create_index_body(index_name, unique, if_not_exists);
                    }
                    name = Some(self.qualified_name("a table name")?);
                    ParseState::ExpectOpenParen
                }
                ParseState::ExpectOpenParen => {
                    self.expect(&TokenKind::LParen, "'('")?;
                    ParseState::ExpectColumnOrConstraint
                }
                ParseState::ExpectColumnOrConstraint => {
                    // The first element is always a column.
                    if !columns.is_empty() && self.at_table_constraint() {
                        let constraint = self.table_constraint()?;
                        constraints.push(TableConstraintSpec {
                            constraint,
                            after_column: columns.len(),
                        });
                    } else {
                        columns.push(self.column_def()?);
                    }
                    ParseState::ExpectCommaOrCloseParen
                }
                ParseState::ExpectCommaOrCloseParen => {
                    if self.eat(&TokenKind::Comma) {
                        ParseState::ExpectColumnOrConstraint
                    } else if self.eat(&TokenKind::RParen) {
                        ParseState::Done
                    } else {
                        return Err(self.unexpected("',' or ')'"));
                    }
                }
                ParseState::Done => break,
            };
        }

        let without_rowid = if self.eat_keyword(Keyword::Without) {
            self.expect_keyword(Keyword::Rowid)?;
            true
        } else {
            false
        };

        let Some(name) = name else {
            return Err(self.unexpected("a table name"));
        };
        Ok(Command::CreateTable(CreateTable {
            name,
            temporary,
            if_not_exists,
            without_rowid,
            columns,
            constraints,
        }))
    }

    /// `ON table ( indexed-column, ... ) [WHERE expr]`
    fn create_index_body(
        &mut self,
        name: QualifiedName,
        unique: bool,
        if_not_exists: bool,
    ) -> Result<Command> {
        self.expect_keyword(Keyword::On)?;
        let table = self.expect_identifier("a table name")?;
        let columns = self.indexed_column_list()?;
        let where_clause = if self.eat_keyword(Keyword::Where) {
            Some(self.trailing_text()?)
        } else {
            None
        };
        Ok(Command::CreateIndex(CreateIndex {
            name,
            table,
            unique,
            if_not_exists,
            columns,
            where_clause,
        }))
    }

    /// Source text up to the end of the statement.
    fn trailing_text(&mut self) -> Result<String> {
        let start = self.current().span.start;
        if matches!(self.current().kind, TokenKind::Semicolon | TokenKind::Eof) {
            return Err(self.unexpected("an expression"));
        }
        while !matches!(self.current().kind, TokenKind::Semicolon | TokenKind::Eof) {
            self.advance();
        }
        Ok(self.slice(start, self.last_end()))
    }

    /// Everything after `DROP`.
    pub(super) fn parse_drop(&mut self) -> Result<Command> {
        let is_table = if self.eat_keyword(Keyword::Table) {
            true
        } else if self.eat_keyword(Keyword::Index) {
            false
        } else {
            return Err(self.unexpected("TABLE or INDEX"));
        };
        let if_exists = self.if_exists()?;
        if is_table {
            let name = self.qualified_name("a table name")?;
            Ok(Command::DropTable { name, if_exists })
        } else {
            let name = self.qualified_name("an index name")?;
            Ok(Command::DropIndex { name, if_exists })
        }
    }

    fn at_table_constraint(&self) -> bool {
        matches!(
            self.current().keyword(),
            Some(
                Keyword::Constraint
                    | Keyword::Primary
                    | Keyword::Unique
                    | Keyword::Check
                    | Keyword::Foreign
            )
        )
    }

    fn at_column_constraint(&self) -> bool {
        matches!(
            self.current().keyword(),
            Some(
                Keyword::Constraint
                    | Keyword::Primary
                    | Keyword::Not
                    | Keyword::Null
                    | Keyword::Unique
                    | Keyword::Check
                    | Keyword::Default
                    | Keyword::Collate
                    | Keyword::References
            )
        )
    }

    /// `name [type] [column-constraint ...]`
    fn column_def(&mut self) -> Result<ColumnSpec> {
        let name = self.expect_identifier("a column name")?;
        let type_name = self.type_name()?;
        let mut constraints = Vec::new();
        while let Some(constraint) = self.column_constraint()? {
            constraints.push(constraint);
        }
        Ok(ColumnSpec {
            name,
            type_name,
            constraints,
        })
    }

    /// A run of type words with an optional `(n [, m])` suffix.
    fn type_name(&mut self) -> Result<Option<TypeName>> {
        let start = self.current().span.start;
        let mut words: Vec<String> = Vec::new();
        while let TokenKind::Ident(ident) = &self.current().kind {
            if self.at_column_constraint() {
                break;
            }
            words.push(ident.value().to_string());
            self.advance();
        }
        if words.is_empty() {
            return Ok(None);
        }

        let mut args = Vec::new();
        if self.eat(&TokenKind::LParen) {
            args.push(self.signed_number()?);
            if self.eat(&TokenKind::Comma) {
                args.push(self.signed_number()?);
            }
            self.expect(&TokenKind::RParen, "')'")?;
        }

        Ok(Some(TypeName {
            text: self.slice(start, self.last_end()),
            name: words.join(" "),
            args,
        }))
    }

    fn constraint_name(&mut self) -> Result<Option<crate::parser::token::Identifier>> {
        if self.eat_keyword(Keyword::Constraint) {
            Ok(Some(self.expect_identifier("a constraint name")?))
        } else {
            Ok(None)
        }
    }

    fn column_constraint(&mut self) -> Result<Option<Constraint>> {
        let name = self.constraint_name()?;
        let kind = match self.current().keyword() {
            Some(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                let order = self.sort_order();
                let on_conflict = self.conflict_clause()?;
                let autoincrement = self.eat_keyword(Keyword::Autoincrement);
                ConstraintKind::PrimaryKey {
                    order,
                    columns: Vec::new(),
                    on_conflict,
                    autoincrement,
                    index: None,
                }
            }
            Some(Keyword::Not) => {
                self.advance();
                self.expect_keyword(Keyword::Null)?;
                ConstraintKind::NotNull {
                    on_conflict: self.conflict_clause()?,
                }
            }
            Some(Keyword::Null) => {
                self.advance();
                ConstraintKind::Null
            }
            Some(Keyword::Unique) => {
                self.advance();
                ConstraintKind::Unique {
                    columns: Vec::new(),
                    on_conflict: self.conflict_clause()?,
                    index: None,
                }
            }
            Some(Keyword::Check) => {
                self.advance();
                ConstraintKind::Check {
                    expr: self.parenthesized_text()?,
                }
            }
            Some(Keyword::Default) => {
                self.advance();
                ConstraintKind::Default {
                    value: self.default_value()?,
                }
            }
            Some(Keyword::Collate) => {
                self.advance();
                ConstraintKind::Collate {
                    collation: self.expect_identifier("a collation name")?,
                }
            }
            Some(Keyword::References) => {
                self.advance();
                ConstraintKind::ForeignKey {
                    columns: Vec::new(),
                    clause: self.foreign_key_clause()?,
                }
            }
            _ => {
                if name.is_some() {
                    return Err(self.unexpected("a column constraint"));
                }
                return Ok(None);
            }
        };
        Ok(Some(Constraint { name, kind }))
    }

    fn table_constraint(&mut self) -> Result<Constraint> {
        let name = self.constraint_name()?;
        let kind = match self.current().keyword() {
            Some(Keyword::Primary) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                let columns = self.indexed_column_list()?;
                ConstraintKind::PrimaryKey {
                    order: None,
                    columns,
                    on_conflict: self.conflict_clause()?,
                    autoincrement: false,
                    index: None,
                }
            }
            Some(Keyword::Unique) => {
                self.advance();
                let columns = self.indexed_column_list()?;
                ConstraintKind::Unique {
                    columns,
                    on_conflict: self.conflict_clause()?,
                    index: None,
                }
            }
            Some(Keyword::Check) => {
                self.advance();
                ConstraintKind::Check {
                    expr: self.parenthesized_text()?,
                }
            }
            Some(Keyword::Foreign) => {
                self.advance();
                self.expect_keyword(Keyword::Key)?;
                let columns = self.identifier_list()?;
                self.expect_keyword(Keyword::References)?;
                ConstraintKind::ForeignKey {
                    columns,
                    clause: self.foreign_key_clause()?,
                }
            }
            _ => return Err(self.unexpected("PRIMARY KEY, UNIQUE, CHECK or FOREIGN KEY")),
        };
        Ok(Constraint { name, kind })
    }
}
