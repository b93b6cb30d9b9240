//! Integration tests: cli commands.
mod common;

use common::{write, Fixture};
use oradiag::cli::run_with_args;

fn run(fixture: &Fixture, args: &[&str]) -> Result<(), String> {
    let home = fixture.home.path().display().to_string();
    let argv = ["oradiag", "--oracle-home", home.as_str()]
        .into_iter()
        .chain(args.iter().copied());
    run_with_args(argv).map(|_| ()).map_err(|e| e.to_string())
}

fn input(fixture: &Fixture, name: &str, text: &str) -> String {
    let path = fixture.dir.path().join(name);
    write(&path, text);
    path.display().to_string()
}

#[test]
fn explain_known_code() {
    let fixture = Fixture::new();
    assert_eq!(run(&fixture, &["explain", "ORA-00001"]), Ok(()));
}

#[test]
fn explain_unknown_facility_fails() {
    let fixture = Fixture::new();
    let err = run(&fixture, &["explain", "XYZ-00001"]).unwrap_err();
    assert_eq!(err, "invalid facility: xyz");
}

#[test]
fn scan_and_report_read_a_file() {
    let fixture = Fixture::new();
    let file = input(&fixture, "out.log", "ORA-00942: table or view does not exist\n");
    assert_eq!(run(&fixture, &["scan", "--component", "rdbms", &file]), Ok(()));
    assert_eq!(
        run(&fixture, &["report", "--command", "select * from t;", &file]),
        Ok(())
    );
}

#[test]
fn scan_without_catalog_fails() {
    let fixture = Fixture::empty();
    let file = input(&fixture, "out.log", "ORA-00942\n");
    let err = run(&fixture, &["scan", &file]).unwrap_err();
    assert!(err.starts_with("cannot open"), "{err}");
}

#[test]
fn facilities_and_tagged() {
    let fixture = Fixture::new();
    assert_eq!(run(&fixture, &["facilities", "--component", "network"]), Ok(()));
    let file = input(&fixture, "rows.txt", "ROW~a~b\nnoise\nROW~c\n");
    assert_eq!(
        run(&fixture, &["tagged", "--tag", "ROW", "--min-fields", "2", &file]),
        Ok(())
    );
}

#[test]
fn unknown_sid_fails() {
    let fixture = Fixture::new();
    let oratab = input(&fixture, "oratab", "orcl:/u01/app/oracle/product/19c:N\n");
    let err = run(
        &fixture,
        &["--oratab", &oratab, "--sid", "nosuch", "explain", "ORA-00001"],
    )
    .unwrap_err();
    assert!(err.contains("nosuch"), "{err}");
}

#[test]
fn tagged_needs_no_installation() {
    let fixture = Fixture::empty();
    let file = input(&fixture, "rows.txt", "ROW~a~b\n");
    let missing = fixture.dir.path().join("no-oratab").display().to_string();
    let argv = [
        "oradiag",
        "--oratab",
        missing.as_str(),
        "--sid",
        "nosuch",
        "tagged",
        "--tag",
        "ROW",
        file.as_str(),
    ];
    assert!(run_with_args(argv).is_ok());

    let argv = [
        "oradiag",
        "--oratab",
        missing.as_str(),
        "--sid",
        "nosuch",
        "explain",
        "ORA-00001",
    ];
    assert!(run_with_args(argv).is_err());
}

#[test]
fn config_prints_file_or_section() {
    let fixture = Fixture::empty();
    let file = input(&fixture, "tools.ini", "[backup]\nretention = 7\n");
    assert_eq!(run(&fixture, &["config", &file]), Ok(()));
    assert_eq!(run(&fixture, &["config", "--section", "backup", &file]), Ok(()));
    let err = run(&fixture, &["config", "--section", "restore", &file]).unwrap_err();
    assert!(err.contains("[restore]"), "{err}");
}

#[test]
fn malformed_connect_string_fails_before_spawning() {
    let fixture = Fixture::new();
    let script = input(&fixture, "script.sql", "select 1 from dual;\n");
    let err = run(&fixture, &["run", "sqlplus", "--connect", "a/b@c@d", &script]).unwrap_err();
    assert_eq!(err, "malformed connect string");
    let err = run(&fixture, &["run", "sqlplus", "--connect", "orcl", &script]).unwrap_err();
    assert!(err.contains("username and password"), "{err}");
}
