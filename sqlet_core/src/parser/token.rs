use std::fmt;

use serde::{Deserialize, Serialize};

/// How an identifier was written in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuoteStyle {
    #[default]
    Bare,
    /// `[name]`
    Bracket,
    /// `"name"`
    Double,
    /// `` `name` ``
    Backtick,
}

/// A schema object or column name.
///
/// Two identifiers are the same object when their unescaped values are equal
/// ignoring ASCII case; the quote style only matters for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier {
    value: String,
    quote: QuoteStyle,
}

impl Identifier {
    pub fn new(value: impl Into<String>, quote: QuoteStyle) -> Self {
        Self {
            value: value.into(),
            quote,
        }
    }

    pub fn bare(value: impl Into<String>) -> Self {
        Self::new(value, QuoteStyle::Bare)
    }

    /// Unescaped value as written.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn quote(&self) -> QuoteStyle {
        self.quote
    }

    pub fn is_bare(&self) -> bool {
        self.quote == QuoteStyle::Bare
    }

    /// Namespace key used by the catalog.
    pub fn key(&self) -> String {
        name_key(&self.value)
    }

    pub fn matches(&self, other: &str) -> bool {
        self.value.eq_ignore_ascii_case(other)
    }

    /// True when this is a bare word spelling the given keyword.
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.is_bare() && self.value.eq_ignore_ascii_case(keyword.as_str())
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.value.eq_ignore_ascii_case(&other.value)
    }
}

impl Eq for Identifier {}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quote {
            QuoteStyle::Bare => f.write_str(&self.value),
            QuoteStyle::Bracket => write!(f, "[{}]", self.value),
            QuoteStyle::Double => write!(f, "\"{}\"", self.value.replace('"', "\"\"")),
            QuoteStyle::Backtick => write!(f, "`{}`", self.value.replace('`', "``")),
        }
    }
}

/// Case-folded lookup key for a name.
pub fn name_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Whether `name` can be written without quotes and read back unchanged.
pub fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if is_ident_start(c) => {}
        _ => return false,
    }
    chars.all(is_ident_continue) && Keyword::from_word(name).is_none()
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub(crate) fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Byte range of a token in the statement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(Identifier),
    Str(String),
    Blob(String),
    Num(String),
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,
    Minus,
    Plus,
    /// Any other operator character run; only meaningful inside expressions.
    Operator(String),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Ident(ident) if ident.is_bare() => Keyword::from_word(ident.value()),
            _ => None,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }

    /// Source-like rendering used in error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Ident(ident) => ident.to_string(),
            TokenKind::Str(s) => format!("'{s}'"),
            TokenKind::Blob(b) => format!("X'{b}'"),
            TokenKind::Num(n) => n.clone(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::Comma => ",".to_string(),
            TokenKind::Semicolon => ";".to_string(),
            TokenKind::Dot => ".".to_string(),
            TokenKind::Minus => "-".to_string(),
            TokenKind::Plus => "+".to_string(),
            TokenKind::Operator(op) => op.clone(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

macro_rules! keywords {
    ($($variant:ident => $text:literal),* $(,)?) => {
        /// Words the DDL grammar gives meaning to.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Keyword {
            $($variant),*
        }

        impl Keyword {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text),*
                }
            }

            pub fn from_word(word: &str) -> Option<Keyword> {
                $(if word.eq_ignore_ascii_case($text) {
                    return Some(Keyword::$variant);
                })*
                None
            }
        }
    };
}

keywords! {
    Abort => "ABORT",
    Action => "ACTION",
    Asc => "ASC",
    Autoincrement => "AUTOINCREMENT",
    Begin => "BEGIN",
    Cascade => "CASCADE",
    Check => "CHECK",
    Collate => "COLLATE",
    Commit => "COMMIT",
    Conflict => "CONFLICT",
    Constraint => "CONSTRAINT",
    Create => "CREATE",
    Default => "DEFAULT",
    Deferrable => "DEFERRABLE",
    Deferred => "DEFERRED",
    Delete => "DELETE",
    Desc => "DESC",
    Drop => "DROP",
    End => "END",
    Exclusive => "EXCLUSIVE",
    Exists => "EXISTS",
    Fail => "FAIL",
    Foreign => "FOREIGN",
    If => "IF",
    Ignore => "IGNORE",
    Immediate => "IMMEDIATE",
    Index => "INDEX",
    Initially => "INITIALLY",
    Key => "KEY",
    Match => "MATCH",
    No => "NO",
    Not => "NOT",
    Null => "NULL",
    On => "ON",
    Primary => "PRIMARY",
    References => "REFERENCES",
    Replace => "REPLACE",
    Restrict => "RESTRICT",
    Rollback => "ROLLBACK",
    Rowid => "ROWID",
    Set => "SET",
    Table => "TABLE",
    Temp => "TEMP",
    Temporary => "TEMPORARY",
    Transaction => "TRANSACTION",
    Unique => "UNIQUE",
    Update => "UPDATE",
    Where => "WHERE",
    Without => "WITHOUT",
}
