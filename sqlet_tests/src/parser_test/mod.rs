use sqlet_core::DbError;
use sqlet_core::parser::command::{
    Command, ConflictAction, ConstraintKind, CreateIndex, CreateTable, Deferrable,
    ForeignKeyAction, ReferentialAction, SortOrder, TransactionMode,
};
use sqlet_core::parser::parser::parse;
use sqlet_core::parser::token::QuoteStyle;

fn create_table(sql: &str) -> CreateTable {
    match parse(sql).unwrap() {
        Command::CreateTable(stmt) => stmt,
        other => panic!("expected CREATE TABLE, got {other:?}"),
    }
}

fn create_index(sql: &str) -> CreateIndex {
    match parse(sql).unwrap() {
        Command::CreateIndex(stmt) => stmt,
        other => panic!("expected CREATE INDEX, got {other:?}"),
    }
}

mod create;
mod tx;
