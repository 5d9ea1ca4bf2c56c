mod common;

use common::{TestWorkspace, fixture_path};
use datatable_migrate::{
    column::{ColumnDecision, ColumnType},
    config::MigrationConfig,
    destination::{Destination, SqlDialect, SqliteDestination},
    error::MigrationError,
    inspect::infer_file,
    source::DataTableSource,
};

#[test]
fn overrides_merge_into_existing_and_new_rows() {
    let mut source = DataTableSource::new(fixture_path("datatable_item.xml"), &MigrationConfig::default());
    source.parse().expect("parse");
    assert_eq!(source.keyed_rows().len(), 4);

    assert!(source.overrides().expect("overrides"));
    let rows = source.keyed_rows();
    assert_eq!(rows.len(), 5);
    let axe = rows.get(2).expect("row 2");
    assert_eq!(axe.get("classname"), Some("Battle Axe"));
    assert_eq!(axe.get("price"), Some("250.5"));
    assert_eq!(axe.get("tradable"), Some("NO"));
    assert_eq!(rows.get(5).and_then(|row| row.get("classname")), Some("Dagger"));
}

#[test]
fn missing_override_is_not_an_error() {
    let mut source = DataTableSource::new(fixture_path("datatable_skill.xml"), &MigrationConfig::default());
    source.parse().expect("parse");
    assert!(!source.overrides().expect("overrides"));
    assert_eq!(source.keyed_rows().len(), 4);
}

#[test]
fn malformed_override_is_a_parse_error() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_table(
        "datatable_gear.xml",
        &[[("ClassID", "1"), ("Name", "a")], [("ClassID", "2"), ("Name", "b")]],
    );
    workspace.write("USA/datatable_gear.xml", "<idspace><Class ClassID=\"2\"");

    let mut source = DataTableSource::new(&path, &MigrationConfig::default());
    source.parse().expect("parse");
    let err = source.overrides().expect_err("broken override");
    match err {
        MigrationError::Parse { path, .. } => assert!(path.ends_with("USA/datatable_gear.xml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn fixture_columns_follow_first_appearance() {
    let source = infer_file(
        &fixture_path("datatable_item.xml"),
        &MigrationConfig::default(),
        true,
    )
    .expect("infer");

    let decisions: Vec<_> = source
        .columns()
        .iter()
        .map(|column| (column.name(), column.decision()))
        .collect();
    assert_eq!(
        decisions,
        vec![
            ("classid", Some(ColumnDecision::Typed(ColumnType::Integer))),
            ("classname", Some(ColumnDecision::Typed(ColumnType::String))),
            ("price", Some(ColumnDecision::Typed(ColumnType::Float))),
            ("tradable", Some(ColumnDecision::Typed(ColumnType::Boolean))),
            ("grade", Some(ColumnDecision::Meaningless)),
            ("note", Some(ColumnDecision::Typed(ColumnType::String))),
        ]
    );
    assert!(source.columns()[5].is_nullable());
    assert!(source.columns()[4].is_nullable());
}

#[test]
fn sqlite_create_statement_uses_identity_column() {
    let source = infer_file(
        &fixture_path("datatable_skill.xml"),
        &MigrationConfig::default(),
        true,
    )
    .expect("infer");
    let create = source
        .table_spec()
        .create_statement(SqlDialect::Sqlite)
        .expect("create statement");
    assert!(create.starts_with(
        "CREATE TABLE `datatable_skill` (`classid` INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,"
    ));
}

#[test]
fn special_characters_survive_the_round_trip_into_sqlite() {
    let workspace = TestWorkspace::new();
    let path = workspace.write_table(
        "datatable_quote.xml",
        &[
            [("ClassID", "1"), ("Text", "O&apos;Brien")],
            [("ClassID", "2"), ("Text", "a &lt;b&gt; \\ c")],
        ],
    );

    let mut source = DataTableSource::new(&path, &MigrationConfig::default());
    source.parse().expect("parse");
    source.flatten_data();
    let mut destination = SqliteDestination::open_in_memory().expect("sqlite");
    let summary = source.migrate(&mut destination).expect("migrate");
    assert!(summary.created);
    assert!(destination.table_exists("datatable_quote").expect("lookup"));

    let texts: Vec<String> = {
        let mut statement = destination
            .connection()
            .prepare("SELECT text FROM datatable_quote ORDER BY classid")
            .expect("prepare");
        statement
            .query_map([], |row| row.get(0))
            .expect("query")
            .collect::<Result<_, _>>()
            .expect("rows")
    };
    assert_eq!(texts, vec!["O'Brien".to_string(), "a <b> \\ c".to_string()]);
}
