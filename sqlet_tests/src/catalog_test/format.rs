use sqlet_core::engine::format::{format_schema, index_fingerprint, table_fingerprint};

use super::*;

fn table_sql(sql: &str) -> String {
    resolve(sql).unwrap().0.to_sql()
}

#[test]
fn test_site_vars_round_trips_byte_for_byte() {
    let sql = "CREATE TABLE SITE_VARS (SITEID VARCHAR (10) NOT NULL, VARNAME VARCHAR (50) NOT NULL, VALUE VARCHAR (500))";
    assert_eq!(table_sql(sql), sql);
}

#[test]
fn test_quoting_styles_are_preserved() {
    let sql = r#"CREATE TABLE [my table] ("a b" INTEGER PRIMARY KEY, `c` TEXT, [d] NUMERIC)"#;
    assert_eq!(table_sql(sql), sql);
}

#[test]
fn test_named_composite_key_round_trips() {
    let sql = r#"CREATE TABLE "FUSION_MAP_COUNTRIES" ("ID" VARCHAR2(20) NOT NULL, "MAP" VARCHAR2(20) NOT NULL, CONSTRAINT "PK_FUSION_MAP_COUNTRIES" PRIMARY KEY ("ID", "MAP"))"#;
    assert_eq!(table_sql(sql), sql);
}

#[test]
fn test_keywords_are_normalized_to_upper_case() {
    assert_eq!(
        table_sql(
            "create table if not exists t (a int not null on conflict abort, b text, constraint pk primary key (a, b desc))"
        ),
        "CREATE TABLE IF NOT EXISTS t (a int NOT NULL ON CONFLICT ABORT, b text, CONSTRAINT pk PRIMARY KEY (a, b DESC))"
    );
    assert_eq!(
        table_sql("CREATE TABLE [Contacts] ([Id] integer primary key, Name varchar(300) NULL)"),
        "CREATE TABLE [Contacts] ([Id] integer PRIMARY KEY, Name varchar(300) NULL)"
    );
}

#[test]
fn test_defaults_checks_and_table_options() {
    assert_eq!(
        table_sql(
            "create temp table t (k text primary key, n int default -1 check (n >= -1), s text default 'a b' collate nocase) without rowid"
        ),
        "CREATE TEMP TABLE t (k text PRIMARY KEY, n int DEFAULT -1 CHECK (n >= -1), s text DEFAULT 'a b' COLLATE nocase) WITHOUT ROWID"
    );
}

#[test]
fn test_foreign_keys_render_every_clause() {
    assert_eq!(
        table_sql(
            "create table c (id integer primary key autoincrement, p int references parent (id) on delete set null on update no action not deferrable, q int, foreign key (q) references parent deferrable initially immediate)"
        ),
        "CREATE TABLE c (id integer PRIMARY KEY AUTOINCREMENT, p int REFERENCES parent (id) ON DELETE SET NULL ON UPDATE NO ACTION NOT DEFERRABLE, q int, FOREIGN KEY (q) REFERENCES parent DEFERRABLE INITIALLY IMMEDIATE)"
    );
}

#[test]
fn test_canonical_text_is_stable_when_reparsed() {
    let first = table_sql(
        "create table t ( a   int  unique on conflict replace , b text check(b <> ''), unique(a,b) )",
    );
    let second = table_sql(&first);
    assert_eq!(first, second);
    assert_eq!(
        first,
        "CREATE TABLE t (a int UNIQUE ON CONFLICT REPLACE, b text CHECK (b <> ''), UNIQUE (a, b))"
    );
}

#[test]
fn test_index_text() {
    let (catalog, _) = catalog_with(&[
        "create table t (a text, b int)",
        "create unique index if not exists i on t (a collate nocase desc, b) where b > 0",
    ]);
    assert_eq!(
        catalog.index("i").unwrap().to_sql(),
        "CREATE UNIQUE INDEX IF NOT EXISTS i ON t (a COLLATE nocase DESC, b) WHERE b > 0"
    );
}

#[test]
fn test_fingerprints_ignore_case_quoting_and_spacing() {
    let (a, _) = resolve("create table T (A Varchar(10), b int default  1)").unwrap();
    let (b, _) = resolve(r#"CREATE TABLE IF NOT EXISTS "t" ("a" VARCHAR ( 10 ), [B] INT DEFAULT 1)"#).unwrap();
    assert_eq!(table_fingerprint(&a), table_fingerprint(&b));
    assert_ne!(a.to_sql(), b.to_sql());

    let (c, _) = resolve("create table t (a varchar(10), b int default 2)").unwrap();
    assert_ne!(table_fingerprint(&a), table_fingerprint(&c));
}

#[test]
fn test_fingerprints_normalize_expression_text() {
    let (a, _) = resolve("create table t (a int CHECK (a > 0), b text DEFAULT ('x'))").unwrap();
    let (b, _) = resolve(r#"create table t (a int check(A>0), b text default( 'x' ))"#).unwrap();
    let (c, _) = resolve(r#"create table t (a int CHECK ( "a" >  0 ), b text DEFAULT ('x'))"#).unwrap();
    assert_eq!(table_fingerprint(&a), table_fingerprint(&b));
    assert_eq!(table_fingerprint(&a), table_fingerprint(&c));

    let (literal, _) = resolve("create table t (a int CHECK (a > 0), b text DEFAULT ('X'))").unwrap();
    assert_ne!(table_fingerprint(&a), table_fingerprint(&literal));
    let (bound, _) = resolve("create table t (a int CHECK (a >= 0), b text DEFAULT ('x'))").unwrap();
    assert_ne!(table_fingerprint(&a), table_fingerprint(&bound));
}

#[test]
fn test_index_fingerprint_ignores_guard() {
    let (catalog, _) = catalog_with(&[
        "create table t (a, b)",
        "create index i on t (a)",
        "create index if not exists j on t (A)",
    ]);
    let i = catalog.index("i").unwrap();
    let j = catalog.index("j").unwrap();
    assert_ne!(index_fingerprint(i), index_fingerprint(j));

    let view = SchemaView::committed(&catalog);
    let again = resolve_index(index_stmt("CREATE INDEX IF NOT EXISTS [I] ON [T] ([a])"), &view).unwrap();
    assert_eq!(index_fingerprint(i), index_fingerprint(&again));
}

#[test]
fn test_schema_dump_lists_tables_and_indices() {
    let (catalog, _) = catalog_with(&[
        "create table b (x int unique)",
        "create table a (y int)",
        "create index ix on b (x)",
    ]);
    let view = SchemaView::committed(&catalog);
    let dump = format_schema(&view.tables(), |t| view.indices_of(t));

    assert_eq!(
        dump,
        "CREATE TABLE a (y int);\n\
         CREATE TABLE b (x int UNIQUE);\n\
         CREATE INDEX ix ON b (x);\n\
         -- sqlite_autoindex_b_1 ON b (x)"
    );
}
