use super::*;

#[test]
fn test_parse_begin_variants() {
    assert_eq!(parse("BEGIN").unwrap(), Command::Begin(TransactionMode::Write));
    assert_eq!(
        parse("begin deferred transaction").unwrap(),
        Command::Begin(TransactionMode::Write)
    );
    assert_eq!(
        parse("begin immediate;").unwrap(),
        Command::Begin(TransactionMode::Write)
    );
    assert_eq!(
        parse("BEGIN EXCLUSIVE TRANSACTION").unwrap(),
        Command::Begin(TransactionMode::Exclusive)
    );
}

#[test]
fn test_parse_commit_and_rollback() {
    assert_eq!(parse("commit").unwrap(), Command::Commit);
    assert_eq!(parse("END TRANSACTION").unwrap(), Command::Commit);
    assert_eq!(parse("rollback transaction;").unwrap(), Command::Rollback);
}

#[test]
fn test_parse_drop_table() {
    match parse("drop table if exists main.users").unwrap() {
        Command::DropTable { name, if_exists } => {
            assert!(if_exists);
            assert_eq!(name.database.unwrap().value(), "main");
            assert_eq!(name.name.value(), "users");
        }
        other => panic!("expected DROP TABLE, got {other:?}"),
    }
}

#[test]
fn test_parse_drop_index() {
    match parse("DROP INDEX [my index]").unwrap() {
        Command::DropIndex { name, if_exists } => {
            assert!(!if_exists);
            assert_eq!(name.name.value(), "my index");
            assert_eq!(name.name.quote(), QuoteStyle::Bracket);
        }
        other => panic!("expected DROP INDEX, got {other:?}"),
    }
}

#[test]
fn test_parse_drop_needs_object_kind() {
    assert!(matches!(
        parse("drop users").unwrap_err(),
        DbError::Syntax { .. }
    ));
}
