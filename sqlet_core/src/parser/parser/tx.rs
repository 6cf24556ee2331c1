use super::Parser;
use crate::error::Result;
use crate::parser::command::{Command, TransactionMode};
use crate::parser::token::Keyword;

impl Parser<'_> {
    /// `BEGIN [DEFERRED|IMMEDIATE|EXCLUSIVE] [TRANSACTION]`,
    /// `COMMIT|END [TRANSACTION]`, `ROLLBACK [TRANSACTION]`
    pub(super) fn parse_transaction_control(&mut self) -> Result<Command> {
        let cmd = if self.eat_keyword(Keyword::Begin) {
            let mode = if self.eat_keyword(Keyword::Exclusive) {
                TransactionMode::Exclusive
            } else {
                if !self.eat_keyword(Keyword::Deferred) {
                    self.eat_keyword(Keyword::Immediate);
                }
                TransactionMode::Write
            };
            Command::Begin(mode)
        } else if self.eat_keyword(Keyword::Commit) || self.eat_keyword(Keyword::End) {
            Command::Commit
        } else {
            self.expect_keyword(Keyword::Rollback)?;
            Command::Rollback
        };
        self.eat_keyword(Keyword::Transaction);
        Ok(cmd)
    }
}
