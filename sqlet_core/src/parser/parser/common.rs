use super::Parser;
use crate::error::Result;
use crate::parser::command::{
    ConflictAction, Deferrable, ForeignKeyAction, ForeignKeyClause, IndexedColumn,
    QualifiedName, ReferentialAction, SortOrder,
};
use crate::parser::token::{Identifier, Keyword, TokenKind};

impl Parser<'_> {
    /// `[schema.]name`
    pub(super) fn qualified_name(&mut self, what: &str) -> Result<QualifiedName> {
        let first = self.expect_identifier(what)?;
        if self.eat(&TokenKind::Dot) {
            let name = self.expect_identifier(what)?;
            Ok(QualifiedName {
                database: Some(first),
                name,
            })
        } else {
            Ok(QualifiedName {
                database: None,
                name: first,
            })
        }
    }

    pub(super) fn sort_order(&mut self) -> Option<SortOrder> {
        if self.eat_keyword(Keyword::Asc) {
            Some(SortOrder::Asc)
        } else if self.eat_keyword(Keyword::Desc) {
            Some(SortOrder::Desc)
        } else {
            None
        }
    }

    /// `( name [COLLATE c] [ASC|DESC], ... )`
    pub(super) fn indexed_column_list(&mut self) -> Result<Vec<IndexedColumn>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut cols = Vec::new();
        loop {
            let name = self.expect_identifier("a column name")?;
            let collation = if self.eat_keyword(Keyword::Collate) {
                Some(self.expect_identifier("a collation name")?)
            } else {
                None
            };
            let order = self.sort_order();
            cols.push(IndexedColumn {
                name,
                collation,
                order,
            });
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RParen, "',' or ')'")?;
            return Ok(cols);
        }
    }

    /// `( name, ... )`
    pub(super) fn identifier_list(&mut self) -> Result<Vec<Identifier>> {
        self.expect(&TokenKind::LParen, "'('")?;
        let mut cols = Vec::new();
        loop {
            cols.push(self.expect_identifier("a column name")?);
            if self.eat(&TokenKind::Comma) {
                continue;
            }
            self.expect(&TokenKind::RParen, "',' or ')'")?;
            return Ok(cols);
        }
    }

    /// `[ON CONFLICT ROLLBACK|ABORT|FAIL|IGNORE|REPLACE]`
    pub(super) fn conflict_clause(&mut self) -> Result<Option<ConflictAction>> {
        if !self.at_keyword(Keyword::On) {
            return Ok(None);
        }
        self.advance();
        self.expect_keyword(Keyword::Conflict)?;
        let action = match self.current().keyword() {
            Some(Keyword::Rollback) => ConflictAction::Rollback,
            Some(Keyword::Abort) => ConflictAction::Abort,
            Some(Keyword::Fail) => ConflictAction::Fail,
            Some(Keyword::Ignore) => ConflictAction::Ignore,
            Some(Keyword::Replace) => ConflictAction::Replace,
            _ => return Err(self.unexpected("ROLLBACK, ABORT, FAIL, IGNORE or REPLACE")),
        };
        self.advance();
        Ok(Some(action))
    }

    /// `( expr )`, returning the verbatim text between the parentheses.
    pub(super) fn parenthesized_text(&mut self) -> Result<String> {
        let open = self.expect(&TokenKind::LParen, "'('")?;
        let mut depth = 1usize;
        loop {
            match self.current().kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        let close = self.advance().span;
                        let text = self.slice(open.end, close.start);
                        if text.is_empty() {
                            return Err(self.syntax_at(close.start, ")", "an expression"));
                        }
                        return Ok(text);
                    }
                }
                TokenKind::Eof => return Err(self.unexpected("')'")),
                _ => {}
            }
            self.advance();
        }
    }

    /// `[+|-] number`, returning its source text.
    pub(super) fn signed_number(&mut self) -> Result<String> {
        let start = self.current().span.start;
        if !self.eat(&TokenKind::Minus) {
            self.eat(&TokenKind::Plus);
        }
        match self.current().kind {
            TokenKind::Num(_) => {
                let end = self.advance().span.end;
                Ok(self.slice(start, end))
            }
            _ => Err(self.unexpected("a number")),
        }
    }

    /// Value of a `DEFAULT` clause: signed number, literal, bare word or
    /// parenthesized expression, kept as source text.
    pub(super) fn default_value(&mut self) -> Result<String> {
        let start = self.current().span.start;
        match &self.current().kind {
            TokenKind::Minus | TokenKind::Plus => self.signed_number(),
            TokenKind::LParen => {
                self.parenthesized_text()?;
                Ok(self.slice(start, self.last_end()))
            }
            TokenKind::Num(_) | TokenKind::Str(_) | TokenKind::Blob(_) | TokenKind::Ident(_) => {
                let end = self.advance().span.end;
                Ok(self.slice(start, end))
            }
            _ => Err(self.unexpected("a default value")),
        }
    }

    fn referential_action(&mut self) -> Result<ReferentialAction> {
        let action = match self.current().keyword() {
            Some(Keyword::Set) => {
                self.advance();
                if self.eat_keyword(Keyword::Null) {
                    return Ok(ReferentialAction::SetNull);
                }
                self.expect_keyword(Keyword::Default)?;
                return Ok(ReferentialAction::SetDefault);
            }
            Some(Keyword::No) => {
                self.advance();
                self.expect_keyword(Keyword::Action)?;
                return Ok(ReferentialAction::NoAction);
            }
            Some(Keyword::Cascade) => ReferentialAction::Cascade,
            Some(Keyword::Restrict) => ReferentialAction::Restrict,
            _ => {
                return Err(
                    self.unexpected("SET NULL, SET DEFAULT, CASCADE, RESTRICT or NO ACTION")
                );
            }
        };
        self.advance();
        Ok(action)
    }

    /// Everything after `REFERENCES`.
    pub(super) fn foreign_key_clause(&mut self) -> Result<ForeignKeyClause> {
        let table = self.expect_identifier("a referenced table name")?;
        let columns = if self.at(&TokenKind::LParen) {
            self.identifier_list()?
        } else {
            Vec::new()
        };

        let mut actions = Vec::new();
        let mut deferrable = None;
        loop {
            if self.at_keyword(Keyword::On) {
                self.advance();
                if self.eat_keyword(Keyword::Delete) {
                    actions.push(ForeignKeyAction::OnDelete(self.referential_action()?));
                } else if self.eat_keyword(Keyword::Update) {
                    actions.push(ForeignKeyAction::OnUpdate(self.referential_action()?));
                } else {
                    return Err(self.unexpected("DELETE or UPDATE"));
                }
            } else if self.eat_keyword(Keyword::Match) {
                actions.push(ForeignKeyAction::Match(
                    self.expect_identifier("a match type")?,
                ));
            } else if deferrable.is_none()
                && (self.at_keyword(Keyword::Deferrable)
                    || (self.at_keyword(Keyword::Not) && self.peek_is_keyword(Keyword::Deferrable)))
            {
                let not = self.eat_keyword(Keyword::Not);
                self.expect_keyword(Keyword::Deferrable)?;
                let initially_deferred = if self.eat_keyword(Keyword::Initially) {
                    if self.eat_keyword(Keyword::Deferred) {
                        Some(true)
                    } else {
                        self.expect_keyword(Keyword::Immediate)?;
                        Some(false)
                    }
                } else {
                    None
                };
                deferrable = Some(Deferrable {
                    not,
                    initially_deferred,
                });
            } else {
                break;
            }
        }

        Ok(ForeignKeyClause {
            table,
            columns,
            actions,
            deferrable,
        })
    }

    fn peek_is_keyword(&self, keyword: Keyword) -> bool {
        self.tokens
            .get(self.pos + 1)
            .is_some_and(|t| t.is_keyword(keyword))
    }
}
