//! Integration tests: message resolution.
mod common;

use common::{Fixture, ORAUS_MSG};
use oradiag::{message::find_message, prelude::*};

#[test]
fn resolves_header_and_continuation_lines() -> DiagResult<()> {
    let fixture = Fixture::new();
    let entry = resolve(&fixture.home, "ora-00001")?;
    assert_eq!(
        entry.clone().into_lines(),
        vec![
            "00001, 00000, \"unique constraint (%s.%s) violated\"",
            "// *Cause: An UPDATE or INSERT statement attempted to insert a duplicate key.",
            "// *Action: Either remove the unique restriction or do not insert the key.",
        ]
    );
    assert_eq!(entry.line_count(), 3);
    assert_eq!(entry.continuation_lines().len(), 2);
    Ok(())
}

#[test]
fn code_case_does_not_matter() -> DiagResult<()> {
    let fixture = Fixture::new();
    assert_eq!(
        resolve(&fixture.home, "ORA-00001")?,
        resolve(&fixture.home, "Ora-00001")?
    );
    Ok(())
}

#[test]
fn block_ends_at_first_line_without_marker() -> DiagResult<()> {
    let fixture = Fixture::new();
    let interrupted = resolve(&fixture.home, "ORA-00017")?;
    assert_eq!(interrupted.line_count(), 3);
    assert!(interrupted.lines().all(|line| !line.contains("*Action")));

    let short = resolve(&fixture.home, "ORA-00018")?;
    assert_eq!(short.line_count(), 2);
    assert_eq!(short.continuation_lines()[0], "// *Cause:  All session state objects are in use.");
    Ok(())
}

#[test]
fn header_without_continuation_is_found() -> DiagResult<()> {
    let fixture = Fixture::new();
    let entry = resolve(&fixture.home, "ORA-00942")?;
    assert_eq!(entry.line_count(), 1);
    assert_eq!(entry.header_line(), "00942, 00000, \"table or view does not exist\"");
    Ok(())
}

#[test]
fn unpadded_header_is_found_by_retry() -> DiagResult<()> {
    let fixture = Fixture::new();
    let entry = resolve(&fixture.home, "SP2-0310")?;
    assert!(entry.header_line().starts_with("310, 0,"));
    assert_eq!(entry.line_count(), 3);

    let padded = resolve(&fixture.home, "sp2-0734")?;
    assert!(padded.header_line().starts_with("0734, 0,"));
    Ok(())
}

#[test]
fn shorter_code_matches_zero_padded_header() {
    let code: ErrorCode = "ORA-942".parse().expect("valid code");
    let entry = find_message(ORAUS_MSG, &code).expect("entry for ORA-942");
    assert!(entry.header_line().starts_with("00942,"));
}

#[test]
fn all_zero_code_resolves() {
    let code: ErrorCode = "ORA-00000".parse().expect("valid code");
    assert_eq!(code.unpadded_number(), "0");
    let entry = find_message(ORAUS_MSG, &code).expect("entry for ORA-00000");
    assert_eq!(entry.line_count(), 3);
}

#[test]
fn error_code_parts() {
    let code: ErrorCode = "SP2-0734".parse().expect("valid code");
    assert_eq!(code.facility(), "sp2");
    assert_eq!(code.number(), "0734");
    assert_eq!(code.unpadded_number(), "734");
    assert_eq!(code.to_string(), "SP2-0734");
}

#[test]
fn malformed_codes_are_rejected() {
    let fixture = Fixture::new();
    for code in ["ORA00001", "ORA-1-2", "-0001", "ORA-", ""] {
        let err = resolve(&fixture.home, code).unwrap_err();
        assert!(matches!(err, DiagError::MalformedCode(_)), "{code}: {err}");
    }
}

#[test]
fn unknown_facility_is_reported() {
    let fixture = Fixture::new();
    let err = resolve(&fixture.home, "XYZ-00001").unwrap_err();
    assert!(matches!(err, DiagError::UnknownFacility(ref facility) if facility == "xyz"));
}

#[test]
fn missing_entry_names_the_message_file() {
    let fixture = Fixture::new();
    let err = resolve(&fixture.home, "ORA-99999").unwrap_err();
    match err {
        DiagError::CodeNotFound { code, path } => {
            assert_eq!(code, "ORA-99999");
            assert_eq!(path, fixture.home.message_file_path("rdbms", "ora"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_message_file_is_unreadable() {
    let fixture = Fixture::new();
    let err = resolve(&fixture.home, "TNS-12560").unwrap_err();
    match err {
        DiagError::CatalogUnreadable { path, .. } => {
            assert_eq!(path, fixture.home.message_file_path("network", "tns"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_facility_catalog_is_unreadable() {
    let fixture = Fixture::empty();
    let err = resolve(&fixture.home, "ORA-00001").unwrap_err();
    assert!(matches!(err, DiagError::CatalogUnreadable { .. }));
}
