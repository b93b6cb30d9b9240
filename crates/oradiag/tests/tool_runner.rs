//! Integration tests: tool runner.
#![cfg(unix)]

mod common;

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    sync::{Mutex, MutexGuard},
};

use common::{write, Fixture};
use oradiag::{prelude::*, runner::DbState};

// Writing an executable while another test thread forks can fail with ETXTBSY.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

fn lock() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn install_tool(fixture: &Fixture, binary: &str, body: &str) {
    let path = fixture.home.tool_path(binary);
    write(&path, &format!("#!/bin/sh\n{body}"));
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod tool");
}

const FAKE_SQLPLUS: &str = r#"echo "args: $*"
echo "home: $ORACLE_HOME"
echo "sid: ${ORACLE_SID:-none}"
cat
echo "ORA-00942: table or view does not exist" >&2
"#;

#[test]
fn run_passes_arguments_environment_and_script() -> DiagResult<()> {
    let _guard = lock();
    let fixture = Fixture::new();
    install_tool(&fixture, "sqlplus", FAKE_SQLPLUS);
    let runner = ToolRunner::new(Diagnostics::new(fixture.home.clone()));

    let output = runner.run(Tool::Sqlplus, "scott/tiger@orcl", "select 1 from dual;\n")?;
    assert!(output.status.success());
    assert!(output.output.starts_with(&format!(
        "args: -S -L scott/tiger@orcl\nhome: {}\n",
        fixture.home
    )));
    assert!(output
        .output
        .ends_with("select 1 from dual;\nORA-00942: table or view does not exist"));
    Ok(())
}

#[test]
fn run_checked_scans_with_the_tool_filter() -> DiagResult<()> {
    let _guard = lock();
    let fixture = Fixture::new();
    install_tool(&fixture, "sqlplus", FAKE_SQLPLUS);
    let runner = ToolRunner::new(Diagnostics::new(fixture.home.clone()));

    let target = Tool::Sqlplus.default_target();
    let checked = runner.run_checked(Tool::Sqlplus, target, "select * from t;\n")?;
    assert!(!checked.is_clean());
    assert_eq!(checked.outcome.error_codes(), vec!["ORA-00942"]);
    assert_eq!(checked.outcome.findings()[0].line_number(), 5);
    Ok(())
}

#[test]
fn instance_variables_reach_the_tool() -> DiagResult<()> {
    let _guard = lock();
    let fixture = Fixture::new();
    install_tool(&fixture, "sqlplus", FAKE_SQLPLUS);
    let oratab = Oratab::parse(&format!("orcl:{}:N\n", fixture.home));
    let instance = OracleEnv::resolve("orcl", &oratab)?;
    let runner = ToolRunner::new(Diagnostics::new(fixture.home.clone())).with_instance(instance);

    let output = runner.run(Tool::Sqlplus, "/", "")?;
    assert!(output.output.contains("sid: orcl\n"));
    Ok(())
}

#[test]
fn status_only_tools_are_not_scanned() -> DiagResult<()> {
    let _guard = lock();
    let fixture = Fixture::new();
    install_tool(&fixture, "dgmgrl", "echo 'ORA-16525: broker not yet available'\nexit 1\n");
    let runner = ToolRunner::new(Diagnostics::new(fixture.home.clone()));

    let checked = runner.run_checked(Tool::Dgmgrl, "/", "show configuration;")?;
    assert!(!checked.status.success());
    assert!(!checked.outcome.found());
    assert!(!checked.is_clean());
    assert_eq!(checked.output, "ORA-16525: broker not yet available");
    Ok(())
}

#[test]
fn clean_run_is_clean() -> DiagResult<()> {
    let _guard = lock();
    let fixture = Fixture::new();
    install_tool(&fixture, "tnsping", "echo \"OK (10 msec) $1\"\n");
    let runner = ToolRunner::new(Diagnostics::new(fixture.home.clone()));

    let checked = runner.run_checked(Tool::Tnsping, "orcl", "")?;
    assert!(checked.is_clean());
    assert_eq!(checked.output, "OK (10 msec) orcl");
    Ok(())
}

#[test]
fn missing_tool_is_an_io_error() {
    let _guard = lock();
    let fixture = Fixture::new();
    let runner = ToolRunner::new(Diagnostics::new(fixture.home.clone()));
    let err = runner.run(Tool::Rman, "target /", "").unwrap_err();
    assert!(matches!(err, DiagError::Io(_)));
}

#[test]
fn db_state_runs_the_status_query() -> DiagResult<()> {
    let _guard = lock();
    let fixture = Fixture::new();
    install_tool(
        &fixture,
        "sqlplus",
        "grep -q \"from v\\$instance\" && echo 'DB_STATUS!~!OPEN'\n",
    );
    let runner = ToolRunner::new(Diagnostics::new(fixture.home.clone()));
    assert_eq!(runner.db_state()?, DbState::Open);
    Ok(())
}

#[test]
fn db_state_of_a_stopped_instance() -> DiagResult<()> {
    let _guard = lock();
    let fixture = Fixture::new();
    install_tool(
        &fixture,
        "sqlplus",
        "cat >/dev/null\necho 'ORA-01034: ORACLE not available'\nexit 1\n",
    );
    let runner = ToolRunner::new(Diagnostics::new(fixture.home.clone()));
    assert_eq!(runner.db_state()?, DbState::Stopped);
    Ok(())
}

#[test]
fn tool_names_parse_case_insensitively() {
    assert_eq!("SQLPlus".parse::<Tool>().ok(), Some(Tool::Sqlplus));
    assert_eq!(Tool::Olsnodes.to_string(), "olsnodes");
    assert_eq!(Tool::Olsnodes.args("-n -i"), vec!["-n", "-i"]);
    assert!("psql".parse::<Tool>().is_err());
    assert_eq!(Tool::Dgmgrl.default_filter(), None);
    assert_eq!(Tool::Rman.default_filter(), Some(ComponentFilter::All));
}
