use std::io::{self, Write};

use tracing::warn;

use crate::{
    facility::FacilityCatalog, message::resolve_with, message::MessageEntry, scan::Finding,
    DiagResult, OracleHome,
};

/// Opening and closing line of a report.
pub const BANNER: &str = ">>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>>\
<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<";
const SECTION_SEPARATOR: &str = "----";
const EXPLANATION_RULE: &str = "---------------";

/// Writes the operator-facing report for a failed command.
///
/// Layout: blank line, banner, the command, separator, the raw output,
/// separator, then one block per finding and a closing banner. A finding whose
/// code cannot be resolved is still listed, just without its explanation.
pub fn write_report<W, F>(
    out: &mut W,
    command: &str,
    output: &str,
    findings: &[Finding],
    mut explain: F,
) -> io::Result<()>
where
    W: Write,
    F: FnMut(&str) -> DiagResult<MessageEntry>,
{
    writeln!(out)?;
    writeln!(out, "{BANNER}")?;
    writeln!(out, "{command}")?;
    writeln!(out)?;
    writeln!(out, "{SECTION_SEPARATOR}")?;
    writeln!(out, "{output}")?;
    writeln!(out, "{SECTION_SEPARATOR}")?;
    for finding in findings {
        writeln!(out)?;
        writeln!(
            out,
            "Error: {} (line {})",
            finding.error_code(),
            finding.line_number()
        )?;
        match explain(finding.error_code()) {
            Ok(entry) => {
                writeln!(out, "Explanation:")?;
                writeln!(out, "{EXPLANATION_RULE}")?;
                for line in entry.lines() {
                    writeln!(out, "{line}")?;
                }
            }
            Err(e) => warn!(code = finding.error_code(), "no explanation: {e}"),
        }
    }
    writeln!(out, "{BANNER}")?;
    writeln!(out)?;
    Ok(())
}

/// Renders the report to a string, resolving codes against `catalog`.
pub fn render_report(
    home: &OracleHome,
    catalog: &FacilityCatalog,
    command: &str,
    output: &str,
    findings: &[Finding],
) -> String {
    render_with(command, output, findings, |code| {
        resolve_with(home, catalog, code)
    })
}

/// Renders the report to a string with a caller-supplied resolver.
pub fn render_with<F>(command: &str, output: &str, findings: &[Finding], explain: F) -> String
where
    F: FnMut(&str) -> DiagResult<MessageEntry>,
{
    let mut buffer = Vec::new();
    if let Err(e) = write_report(&mut buffer, command, output, findings, explain) {
        warn!("cannot render report: {e}");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
