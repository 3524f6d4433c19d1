//! End-to-end tests driving the `sqlcsv` binary against the six concrete
//! scenarios from the engine's own specification, plus the invariants that
//! informed them (literal-SUM, idempotent DISTINCT, 3+-table predicate
//! attachment).

use std::fs;
use std::path::Path;
use std::process::Command;

fn write_database(dir: &Path) {
    fs::create_dir_all(dir.join("data")).unwrap();
    fs::write(dir.join("schema.txt"), "R A B\nS C D\nT E F\n").unwrap();
    fs::write(dir.join("data/R.csv"), "1,2\n3,4\n5,6\n").unwrap();
    fs::write(dir.join("data/S.csv"), "2,10\n4,20\n7,30\n").unwrap();
    fs::write(dir.join("data/T.csv"), "1,100\n3,100\n1,200\n").unwrap();
}

/// Run a query against a freshly built R/S/T database and return its output
/// lines.
fn run_query(query: &str) -> Vec<String> {
    let dir = tempfile::tempdir().unwrap();
    write_database(dir.path());

    let query_file = dir.path().join("query.sql");
    fs::write(&query_file, query).unwrap();
    let output_file = dir.path().join("out.csv");

    let status = Command::new(env!("CARGO_BIN_EXE_sqlcsv"))
        .arg(dir.path())
        .arg(&query_file)
        .arg(&output_file)
        .status()
        .expect("failed to run sqlcsv binary");
    assert!(status.success(), "sqlcsv exited with failure for: {query}");

    let contents = fs::read_to_string(&output_file).unwrap();
    contents.lines().map(str::to_string).collect()
}

fn sorted(mut lines: Vec<String>) -> Vec<String> {
    lines.sort();
    lines
}

#[test]
fn scenario_select_star_with_predicate() {
    let lines = run_query("SELECT * FROM R WHERE R.A > 2");
    assert_eq!(sorted(lines), vec!["3, 4".to_string(), "5, 6".to_string()]);
}

#[test]
fn scenario_equi_join() {
    let lines = run_query("SELECT R.A, S.D FROM R, S WHERE R.B = S.C");
    assert_eq!(sorted(lines), vec!["1, 10".to_string(), "3, 20".to_string()]);
}

#[test]
fn scenario_distinct() {
    let lines = run_query("SELECT DISTINCT T.E FROM T");
    assert_eq!(sorted(lines), vec!["1".to_string(), "3".to_string()]);
}

#[test]
fn scenario_group_by_sum() {
    let lines = run_query("SELECT T.E, SUM(T.F) FROM T GROUP BY T.E");
    assert_eq!(sorted(lines), vec!["1, 300".to_string(), "3, 100".to_string()]);
}

#[test]
fn scenario_literal_sum() {
    let lines = run_query("SELECT SUM(1) FROM R");
    assert_eq!(lines, vec!["3".to_string()]);
}

#[test]
fn scenario_order_by_column_not_selected() {
    let lines = run_query("SELECT R.A FROM R ORDER BY R.B");
    assert_eq!(lines, vec!["1".to_string(), "3".to_string(), "5".to_string()]);
}

#[test]
fn three_table_predicate_attaches_to_deepest_join() {
    // R.A = T.E references both the R/S join output and T, a three-table
    // residual predicate that the source implementation would silently
    // drop; here it must be honored.
    let lines = run_query("SELECT R.A, S.D, T.F FROM R, S, T WHERE R.B = S.C AND R.A = T.E");
    assert_eq!(
        sorted(lines),
        vec!["1, 10, 100".to_string(), "1, 10, 200".to_string(), "3, 20, 100".to_string()]
    );
}

#[test]
fn missing_table_is_a_reported_failure() {
    let dir = tempfile::tempdir().unwrap();
    write_database(dir.path());
    let query_file = dir.path().join("query.sql");
    fs::write(&query_file, "SELECT * FROM Missing").unwrap();
    let output_file = dir.path().join("out.csv");

    let status = Command::new(env!("CARGO_BIN_EXE_sqlcsv"))
        .arg(dir.path())
        .arg(&query_file)
        .arg(&output_file)
        .status()
        .unwrap();
    assert!(!status.success());
}
