mod common;

use assert_cmd::Command;
use common::{TestWorkspace, fixture_dir, fixture_path};
use predicates::prelude::*;
use predicates::str::contains;
use rusqlite::Connection;

fn binary() -> Command {
    Command::cargo_bin("datatable-migrate").expect("binary exists")
}

#[test]
fn migrate_fills_a_sqlite_database() {
    let workspace = TestWorkspace::new();
    let database = workspace.path().join("tables.db");

    binary()
        .args(["migrate", "--folder"])
        .arg(fixture_dir())
        .arg("--database")
        .arg(&database)
        .assert()
        .success();

    let conn = Connection::open(&database).expect("open database");
    let items: i64 = conn
        .query_row("SELECT COUNT(*) FROM datatable_item", [], |row| row.get(0))
        .expect("count items");
    let skills: i64 = conn
        .query_row("SELECT COUNT(*) FROM datatable_skill", [], |row| row.get(0))
        .expect("count skills");
    assert_eq!(items, 5);
    assert_eq!(skills, 3);
}

#[test]
fn migrate_writes_a_script_to_stdout() {
    binary()
        .args(["migrate", "--script", "-", "--folder"])
        .arg(fixture_dir())
        .assert()
        .success()
        .stdout(contains("START TRANSACTION;"))
        .stdout(contains("CREATE TABLE `datatable_item`"))
        .stdout(contains("INSERT INTO `datatable_skill`"))
        .stdout(contains("item_notes").not());
}

#[test]
fn migrate_into_existing_table_fails() {
    let workspace = TestWorkspace::new();
    let database = workspace.path().join("tables.db");
    Connection::open(&database)
        .expect("open database")
        .execute_batch("CREATE TABLE datatable_item (id INTEGER);")
        .expect("seed table");

    binary()
        .args(["migrate", "--folder"])
        .arg(fixture_dir())
        .arg("--database")
        .arg(&database)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("error:"))
        .stderr(contains("Table datatable_item already exists"));
}

#[test]
fn migrate_without_destination_is_a_usage_error() {
    binary()
        .args(["migrate", "--folder"])
        .arg(fixture_dir())
        .assert()
        .failure()
        .stderr(contains("--database"));
}

#[test]
fn migrate_honours_pattern_and_config_file() {
    let workspace = TestWorkspace::new();
    workspace.write(
        "skills_a.xml",
        "<root><Row Id=\"1\" Name=\"a\"/><Row Id=\"2\" Name=\"b\"/></root>",
    );
    let config = workspace.write("migrate.yml", "record_element: Row\nidentifier_column: Id\n");

    binary()
        .args(["migrate", "--script", "-", "--pattern", "skills_?.xml", "--folder"])
        .arg(workspace.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(contains(
            "INSERT INTO `skills_a` (`id`,`name`) VALUES (1,'a'),(2,'b');",
        ));
}

#[test]
fn infer_prints_columns_with_overrides() {
    binary()
        .args(["infer", "--input"])
        .arg(fixture_path("datatable_item.xml"))
        .assert()
        .success()
        .stdout(contains("definition"))
        .stdout(contains("`classname` VARCHAR(10) NOT NULL"))
        .stdout(contains("`tradable` BIT NOT NULL"))
        .stdout(contains("meaningless"));
}

#[test]
fn infer_can_skip_overrides() {
    binary()
        .args(["infer", "--no-overrides", "--input"])
        .arg(fixture_path("datatable_item.xml"))
        .assert()
        .success()
        .stdout(contains("`classname` VARCHAR(5) NOT NULL"));
}

#[test]
fn infer_reports_malformed_input() {
    let workspace = TestWorkspace::new();
    let broken = workspace.write("datatable_broken.xml", "<root><Class ClassID=\"1\">");

    binary()
        .args(["infer", "--input"])
        .arg(&broken)
        .assert()
        .failure()
        .stderr(contains("Failed to parse"));
}
