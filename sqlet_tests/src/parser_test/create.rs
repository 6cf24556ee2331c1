use super::*;

#[test]
fn test_parse_create_keeps_type_text() {
    let t = create_table(
        "CREATE TABLE SITE_VARS (SITEID VARCHAR (10) NOT NULL, VARNAME VARCHAR (50) NOT NULL, VALUE VARCHAR (500))",
    );

    assert_eq!(t.name.name.value(), "SITE_VARS");
    assert!(t.name.database.is_none());
    assert_eq!(t.columns.len(), 3);

    let ty = t.columns[0].type_name.as_ref().unwrap();
    assert_eq!(ty.text, "VARCHAR (10)");
    assert_eq!(ty.name, "VARCHAR");
    assert_eq!(ty.args, vec!["10".to_string()]);
    assert!(matches!(
        t.columns[0].constraints[0].kind,
        ConstraintKind::NotNull { on_conflict: None }
    ));
    assert_eq!(t.columns[2].name.value(), "VALUE");
    assert!(t.columns[2].constraints.is_empty());
}

#[test]
fn test_parse_create_table_level_primary_key() {
    let t = create_table(
        "create table TESTXX (a int, b int, c int, d int, blob blob, primary key (a,b,c,d))",
    );

    assert_eq!(t.columns.len(), 5);
    assert_eq!(t.columns[4].name.value(), "blob");
    assert_eq!(t.constraints.len(), 1);
    assert_eq!(t.constraints[0].after_column, 5);
    match &t.constraints[0].constraint.kind {
        ConstraintKind::PrimaryKey { columns, .. } => {
            let names: Vec<&str> = columns.iter().map(|c| c.name.value()).collect();
            assert_eq!(names, vec!["a", "b", "c", "d"]);
        }
        other => panic!("expected PRIMARY KEY, got {other:?}"),
    }
}

#[test]
fn test_parse_create_quoted_names() {
    let t = create_table(
        r#"CREATE TABLE "name with whitespace" (id integer primary key, [dimensions_2] text, `c` int)"#,
    );

    assert_eq!(t.name.name.value(), "name with whitespace");
    assert_eq!(t.name.name.quote(), QuoteStyle::Double);
    assert_eq!(t.columns[1].name.value(), "dimensions_2");
    assert_eq!(t.columns[1].name.quote(), QuoteStyle::Bracket);
    assert_eq!(t.columns[2].name.quote(), QuoteStyle::Backtick);
}

#[test]
fn test_parse_create_column_constraints() {
    let t = create_table(
        "create table t (\
            id integer constraint pk primary key desc on conflict replace autoincrement, \
            n text not null default 'x' collate nocase check (length(n) > 0) unique, \
            p integer references parent(id) on delete cascade deferrable initially deferred)",
    );

    let id = &t.columns[0];
    assert_eq!(id.constraints.len(), 1);
    assert_eq!(id.constraints[0].name.as_ref().unwrap().value(), "pk");
    match &id.constraints[0].kind {
        ConstraintKind::PrimaryKey {
            order,
            columns,
            on_conflict,
            autoincrement,
            index,
        } => {
            assert_eq!(*order, Some(SortOrder::Desc));
            assert!(columns.is_empty());
            assert_eq!(*on_conflict, Some(ConflictAction::Replace));
            assert!(*autoincrement);
            assert!(index.is_none());
        }
        other => panic!("expected PRIMARY KEY, got {other:?}"),
    }

    let n = &t.columns[1];
    assert_eq!(n.constraints.len(), 5);
    assert!(matches!(n.constraints[0].kind, ConstraintKind::NotNull { .. }));
    assert_eq!(
        n.constraints[1].kind,
        ConstraintKind::Default {
            value: "'x'".to_string()
        }
    );
    match &n.constraints[2].kind {
        ConstraintKind::Collate { collation } => assert_eq!(collation.value(), "nocase"),
        other => panic!("expected COLLATE, got {other:?}"),
    }
    assert_eq!(
        n.constraints[3].kind,
        ConstraintKind::Check {
            expr: "length(n) > 0".to_string()
        }
    );
    assert!(matches!(n.constraints[4].kind, ConstraintKind::Unique { .. }));

    let p = &t.columns[2];
    match &p.constraints[0].kind {
        ConstraintKind::ForeignKey { columns, clause } => {
            assert!(columns.is_empty());
            assert_eq!(clause.table.value(), "parent");
            assert_eq!(clause.columns.len(), 1);
            assert_eq!(
                clause.actions,
                vec![ForeignKeyAction::OnDelete(ReferentialAction::Cascade)]
            );
            assert_eq!(
                clause.deferrable,
                Some(Deferrable {
                    not: false,
                    initially_deferred: Some(true)
                })
            );
        }
        other => panic!("expected REFERENCES, got {other:?}"),
    }
}

#[test]
fn test_parse_create_table_constraints_record_position() {
    let t = create_table(
        "create table t (a int, b int, constraint u unique (a, b) on conflict ignore, \
         check (a > b), c int, foreign key (b) references other (x) match simple)",
    );

    assert_eq!(t.columns.len(), 3);
    assert_eq!(t.constraints.len(), 3);
    assert_eq!(t.constraints[0].after_column, 2);
    assert_eq!(t.constraints[1].after_column, 2);
    assert_eq!(t.constraints[2].after_column, 3);

    assert_eq!(
        t.constraints[0].constraint.name.as_ref().unwrap().value(),
        "u"
    );
    match &t.constraints[0].constraint.kind {
        ConstraintKind::Unique {
            columns,
            on_conflict,
            ..
        } => {
            assert_eq!(columns.len(), 2);
            assert_eq!(*on_conflict, Some(ConflictAction::Ignore));
        }
        other => panic!("expected UNIQUE, got {other:?}"),
    }
    match &t.constraints[2].constraint.kind {
        ConstraintKind::ForeignKey { columns, clause } => {
            assert_eq!(columns[0].value(), "b");
            assert!(matches!(clause.actions[0], ForeignKeyAction::Match(_)));
        }
        other => panic!("expected FOREIGN KEY, got {other:?}"),
    }
}

#[test]
fn test_parse_create_temp_if_not_exists_without_rowid() {
    let t = create_table("CREATE TEMP TABLE IF NOT EXISTS main.t (k text primary key) WITHOUT ROWID;");

    assert!(t.temporary);
    assert!(t.if_not_exists);
    assert!(t.without_rowid);
    assert_eq!(t.name.database.as_ref().unwrap().value(), "main");
    assert_eq!(t.name.name.value(), "t");
}

#[test]
fn test_parse_create_null_constraint_and_untyped_column() {
    let t = create_table("CREATE TABLE [Contacts] ([Id] integer primary key, Name varchar(300) NULL, note)");

    assert_eq!(t.columns[1].type_name.as_ref().unwrap().text, "varchar(300)");
    assert_eq!(t.columns[1].constraints[0].kind, ConstraintKind::Null);
    assert!(t.columns[2].type_name.is_none());
    assert!(t.columns[2].constraints.is_empty());
}

#[test]
fn test_parse_create_type_variants() {
    let t = create_table("create table t (a unsigned big int, d decimal(10, 2), v VARCHAR2(20), k key)");

    let a = t.columns[0].type_name.as_ref().unwrap();
    assert_eq!(a.name, "unsigned big int");
    assert!(a.args.is_empty());

    let d = t.columns[1].type_name.as_ref().unwrap();
    assert_eq!(d.args, vec!["10".to_string(), "2".to_string()]);
    assert_eq!(d.text, "decimal(10, 2)");

    assert_eq!(t.columns[2].type_name.as_ref().unwrap().name, "VARCHAR2");
    assert_eq!(t.columns[3].name.value(), "k");
    assert_eq!(t.columns[3].type_name.as_ref().unwrap().name, "key");
}

#[test]
fn test_parse_create_default_values() {
    let t = create_table("create table t (a int default -1, b real default (1 + 2), c text default CURRENT_TIMESTAMP)");

    let values: Vec<&str> = t
        .columns
        .iter()
        .map(|c| match &c.constraints[0].kind {
            ConstraintKind::Default { value } => value.as_str(),
            other => panic!("expected DEFAULT, got {other:?}"),
        })
        .collect();
    assert_eq!(values, vec!["-1", "(1 + 2)", "CURRENT_TIMESTAMP"]);
}

#[test]
fn test_parse_create_dollar_inside_names() {
    let t = create_table("create table my$table(a$ integer primary key, b$ integer)");

    assert_eq!(t.name.name.value(), "my$table");
    assert_eq!(t.columns[0].name.value(), "a$");
    assert_eq!(t.columns[1].name.value(), "b$");
}
