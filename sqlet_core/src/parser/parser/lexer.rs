use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{DbError, Result};
use crate::parser::token::{
    Identifier, QuoteStyle, Span, Token, TokenKind, is_ident_continue, is_ident_start,
};

pub(crate) struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map(|&(i, _)| i).unwrap_or(self.input.len())
    }

    fn error(&self, message: impl Into<String>, offset: usize) -> DbError {
        DbError::Lexical {
            message: message.into(),
            offset,
        }
    }

    fn rest_starts_with(&mut self, prefix: &str) -> bool {
        let input = self.input;
        let offset = self.offset();
        input[offset..].starts_with(prefix)
    }

    /// Skips whitespace and comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some('-') if self.rest_starts_with("--") => {
                    for (_, c) in self.chars.by_ref() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.rest_starts_with("/*") => {
                    let start = self.offset();
                    self.chars.next();
                    self.chars.next();
                    let mut closed = false;
                    while let Some((_, c)) = self.chars.next() {
                        if c == '*' && self.peek_char() == Some('/') {
                            self.chars.next();
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(self.error("Unterminated block comment", start));
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Reads a delimited run where a doubled closing delimiter escapes itself.
    fn read_delimited(&mut self, start: usize, close: char, what: &str) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.chars.next() {
                Some((_, c)) if c == close => {
                    if close != ']' && self.peek_char() == Some(close) {
                        self.chars.next();
                        out.push(close);
                    } else {
                        return Ok(out);
                    }
                }
                Some((_, c)) => out.push(c),
                None => return Err(self.error(format!("Unterminated {what}"), start)),
            }
        }
    }

    /// The first character has already been consumed.
    fn read_word(&mut self, start: usize) -> String {
        while self.peek_char().is_some_and(is_ident_continue) {
            self.chars.next();
        }
        let input = self.input;
        let end = self.offset();
        input[start..end].to_string()
    }

    /// The first character has already been consumed.
    fn read_number(&mut self, start: usize) -> Result<String> {
        let input = self.input;
        let rest = &input[start..];
        if rest.starts_with("0x") || rest.starts_with("0X") {
            self.chars.next();
            let mut digits = 0;
            while self.peek_char().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.chars.next();
                digits += 1;
            }
            if digits == 0 {
                return Err(self.error("Malformed hex literal", start));
            }
        } else {
            let mut seen_dot = rest.starts_with('.');
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    self.chars.next();
                } else if c == '.' && !seen_dot {
                    seen_dot = true;
                    self.chars.next();
                } else {
                    break;
                }
            }
            if matches!(self.peek_char(), Some('e' | 'E')) {
                self.chars.next();
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.chars.next();
                }
                if !self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(self.error("Malformed numeric exponent", start));
                }
                while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.chars.next();
                }
            }
        }
        let end = self.offset();
        if self.peek_char().is_some_and(is_ident_start) {
            return Err(self.error("Identifier characters directly after a number", end));
        }
        Ok(input[start..end].to_string())
    }

    pub(crate) fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;
        let start = self.offset();
        let Some((_, c)) = self.chars.next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span { start, end: start },
            });
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '-' => TokenKind::Minus,
            '+' => TokenKind::Plus,
            '.' if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => {
                TokenKind::Num(self.read_number(start)?)
            }
            '.' => TokenKind::Dot,
            '"' => TokenKind::Ident(Identifier::new(
                self.read_delimited(start, '"', "quoted identifier")?,
                QuoteStyle::Double,
            )),
            '`' => TokenKind::Ident(Identifier::new(
                self.read_delimited(start, '`', "quoted identifier")?,
                QuoteStyle::Backtick,
            )),
            '[' => TokenKind::Ident(Identifier::new(
                self.read_delimited(start, ']', "bracketed identifier")?,
                QuoteStyle::Bracket,
            )),
            '\'' => TokenKind::Str(self.read_delimited(start, '\'', "string literal")?),
            'x' | 'X' if self.peek_char() == Some('\'') => {
                self.chars.next();
                let hex = self.read_delimited(start, '\'', "blob literal")?;
                if hex.len() % 2 != 0 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(self.error("Malformed blob literal", start));
                }
                TokenKind::Blob(hex)
            }
            c if c.is_ascii_digit() => TokenKind::Num(self.read_number(start)?),
            c if is_ident_start(c) => TokenKind::Ident(Identifier::bare(self.read_word(start))),
            '$' => {
                return Err(self.error(
                    "Identifiers cannot begin with '$'; quote the name to use it",
                    start,
                ));
            }
            '*' | '/' | '%' | '=' | '<' | '>' | '!' | '|' | '&' | '~' => {
                let mut op = String::from(c);
                while let Some(next) = self.peek_char() {
                    if matches!(next, '=' | '<' | '>' | '|') {
                        op.push(next);
                        self.chars.next();
                    } else {
                        break;
                    }
                }
                TokenKind::Operator(op)
            }
            other => return Err(self.error(format!("Unexpected character '{other}'"), start)),
        };

        let end = self.offset();
        Ok(Token {
            kind,
            span: Span { start, end },
        })
    }

    /// Collects all tokens; the last one is always `Eof`.
    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}
