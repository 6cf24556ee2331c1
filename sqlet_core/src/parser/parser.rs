mod common;
mod create;
pub(crate) mod lexer;
mod tx;

use tracing::debug;

use crate::error::{DbError, Result};
use crate::parser::command::Command;
use crate::parser::token::{Identifier, Keyword, Span, Token, TokenKind};

/// Parses one DDL or transaction-control statement.
///
/// Parsing is all-or-nothing: the first token that does not fit the grammar
/// fails the statement with its source offset.
pub fn parse(input: &str) -> Result<Command> {
    let tokens = lexer::Lexer::new(input).tokenize()?;
    let mut parser = Parser::new(input, tokens);
    let cmd = parser.parse_statement()?;
    debug!(statement = input, "parsed statement");
    Ok(cmd)
}

/// Where the statement parser is within a `CREATE` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseState {
    ExpectKeyword,
    ExpectTableOrIndexName,
    ExpectOpenParen,
    ExpectColumnOrConstraint,
    ExpectCommaOrCloseParen,
    Done,
}

pub(crate) struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            input,
            tokens,
            pos: 0,
        }
    }

    fn current(&self) -> &Token {
        // The lexer always terminates the stream with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Span end of the most recently consumed token.
    fn last_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.input[start..end].trim().to_string()
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.current().is_keyword(keyword)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.at_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> DbError {
        let token = self.current();
        DbError::Syntax {
            message: format!("expected {expected}"),
            found: token.describe(),
            offset: token.span.start,
        }
    }

    fn syntax_at(&self, offset: usize, found: &str, expected: &str) -> DbError {
        DbError::Syntax {
            message: format!("expected {expected}"),
            found: found.to_string(),
            offset,
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Span> {
        if self.at(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<Identifier> {
        match &self.current().kind {
            TokenKind::Ident(ident) => {
                let ident = ident.clone();
                self.advance();
                Ok(ident)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    /// `IF NOT EXISTS`
    fn if_not_exists(&mut self) -> Result<bool> {
        if !self.eat_keyword(Keyword::If) {
            return Ok(false);
        }
        self.expect_keyword(Keyword::Not)?;
        self.expect_keyword(Keyword::Exists)?;
        Ok(true)
    }

    /// `IF EXISTS`
    fn if_exists(&mut self) -> Result<bool> {
        if !self.eat_keyword(Keyword::If) {
            return Ok(false);
        }
        self.expect_keyword(Keyword::Exists)?;
        Ok(true)
    }

    fn parse_statement(&mut self) -> Result<Command> {
        let Some(keyword) = self.current().keyword() else {
            return Err(self.unexpected("a statement keyword"));
        };
        let cmd = match keyword {
            Keyword::Create => {
                self.advance();
                self.parse_create()?
            }
            Keyword::Drop => {
                self.advance();
                self.parse_drop()?
            }
            Keyword::Begin | Keyword::Commit | Keyword::End | Keyword::Rollback => {
                self.parse_transaction_control()?
            }
            _ => return Err(self.unexpected("CREATE, DROP, BEGIN, COMMIT or ROLLBACK")),
        };
        self.eat(&TokenKind::Semicolon);
        if !self.at(&TokenKind::Eof) {
            return Err(self.unexpected("end of statement"));
        }
        Ok(cmd)
    }
}
