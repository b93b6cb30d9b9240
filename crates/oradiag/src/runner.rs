use std::{
    io::{self, Write},
    process::{Command, ExitStatus, Stdio},
    thread,
};

use oradiag_core::{OracleEnv, ORACLE_HOME_VAR};
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info};

use crate::{
    diagnostics::Diagnostics,
    facility::FacilityCatalog,
    scan::{scan_with, ComponentFilter, ScanOutcome},
    tagged::TaggedParser,
    DiagResult,
};

/// Marker selected in front of the instance status by [`db_state_script`].
pub const DB_STATUS_TAG: &str = "DB_STATUS";
const DB_STATUS_SEPARATOR: &str = "!~!";
/// Raised by every session against an instance that is not started.
pub const INSTANCE_DOWN_CODE: &str = "ORA-01034";

/// Command-line tools found under `<home>/bin`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Tool {
    /// SQL*Plus, driven with a script on stdin.
    Sqlplus,
    /// Recovery Manager.
    Rman,
    /// Data Guard broker command line.
    Dgmgrl,
    /// Cluster node listing.
    Olsnodes,
    /// Listener reachability check.
    Tnsping,
}

impl Tool {
    /// File name of the executable under `<home>/bin`.
    pub fn binary(self) -> &'static str {
        match self {
            Self::Sqlplus => "sqlplus",
            Self::Rman => "rman",
            Self::Dgmgrl => "dgmgrl",
            Self::Olsnodes => "olsnodes",
            Self::Tnsping => "tnsping",
        }
    }

    /// Arguments for a session. `target` is the connect string for the
    /// database tools, the alias for `tnsping`, and option words for
    /// `olsnodes`.
    pub fn args(self, target: &str) -> Vec<String> {
        match self {
            Self::Sqlplus => vec!["-S".into(), "-L".into(), target.into()],
            Self::Rman | Self::Tnsping => vec![target.into()],
            Self::Dgmgrl => vec!["-silent".into(), target.into()],
            Self::Olsnodes => target.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Connect string used when the caller does not give one.
    pub fn default_target(self) -> &'static str {
        match self {
            Self::Sqlplus => "/ as sysdba",
            Self::Rman => "target /",
            Self::Dgmgrl => "/",
            Self::Olsnodes | Self::Tnsping => "",
        }
    }

    /// Components whose error codes are checked in this tool's output.
    ///
    /// `None` means only the exit status is meaningful.
    pub fn default_filter(self) -> Option<ComponentFilter> {
        match self {
            Self::Sqlplus => Some(ComponentFilter::from_names([
                "sqlplus", "rdbms", "oracore",
            ])),
            Self::Rman | Self::Olsnodes | Self::Tnsping => Some(ComponentFilter::All),
            Self::Dgmgrl => None,
        }
    }
}

/// Instance state as reported by `v$instance`, or inferred from its absence.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum DbState {
    /// The instance is not started.
    #[strum(serialize = "STOPPED")]
    Stopped,
    /// Started, control file not yet mounted.
    #[strum(serialize = "STARTED")]
    Started,
    /// Mounted but not open.
    #[strum(serialize = "MOUNTED")]
    Mounted,
    /// Open for normal use.
    #[strum(serialize = "OPEN")]
    Open,
    /// Open in upgrade or downgrade mode.
    #[strum(serialize = "OPEN MIGRATE")]
    OpenMigrate,
    /// The output carried neither a status row nor a startup error.
    #[strum(serialize = "UNKNOWN")]
    Unknown,
}

/// Exit status and combined output of one tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// How the process exited.
    pub status: ExitStatus,
    /// Standard output followed by standard error, trailing whitespace removed.
    pub output: String,
}

/// A [`ToolOutput`] together with the error codes found in it.
#[derive(Debug, Clone)]
pub struct CheckedOutput {
    /// How the process exited.
    pub status: ExitStatus,
    /// Combined output, as in [`ToolOutput::output`].
    pub output: String,
    /// Error codes found in `output`.
    pub outcome: ScanOutcome,
}

impl CheckedOutput {
    /// Successful exit and no error codes in the output.
    pub fn is_clean(&self) -> bool {
        self.status.success() && !self.outcome.found()
    }
}

/// Runs tools from one installation and checks their output.
#[derive(Debug, Clone)]
pub struct ToolRunner {
    diagnostics: Diagnostics,
    instance: Option<OracleEnv>,
}

impl ToolRunner {
    /// Runner for the installation behind `diagnostics`, with no instance
    /// variables.
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            instance: None,
        }
    }

    /// Runs against a specific instance: its SID and library path are passed
    /// to every child process.
    pub fn with_instance(mut self, instance: OracleEnv) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Catalogs used to check tool output.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Spawns `tool`, feeds `script` on stdin, and waits for it to finish.
    pub fn run(&self, tool: Tool, target: &str, script: &str) -> DiagResult<ToolOutput> {
        let home = self.diagnostics.home();
        let program = home.tool_path(tool.binary());
        debug!(program = %program.display(), "spawning tool");
        let mut command = Command::new(&program);
        command
            .args(tool.args(target))
            .env(ORACLE_HOME_VAR, home.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(instance) = &self.instance {
            command.envs(instance.vars());
        }
        let mut child = command.spawn()?;
        let writer = child.stdin.take().map(|mut stdin| {
            let script = script.to_string();
            thread::spawn(move || stdin.write_all(script.as_bytes()))
        });
        let captured = child.wait_with_output()?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                // tools that never read stdin close it early
                Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(io::Error::other("stdin writer panicked").into()),
            }
        }
        let mut output = String::from_utf8_lossy(&captured.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&captured.stderr));
        output.truncate(output.trim_end().len());
        info!(%tool, status = %captured.status, "tool finished");
        Ok(ToolOutput {
            status: captured.status,
            output,
        })
    }

    /// Like [`ToolRunner::run`], then scans the output with the tool's
    /// default component filter.
    pub fn run_checked(&self, tool: Tool, target: &str, script: &str) -> DiagResult<CheckedOutput> {
        let ToolOutput { status, output } = self.run(tool, target, script)?;
        let outcome = match tool.default_filter() {
            Some(filter) => self.diagnostics.scan(&output, &filter)?,
            None => ScanOutcome::default(),
        };
        Ok(CheckedOutput {
            status,
            output,
            outcome,
        })
    }

    /// Asks the instance for its state through SQL*Plus as sysdba.
    ///
    /// The exit status is not consulted: a stopped instance makes SQL*Plus
    /// fail, and that is reported as [`DbState::Stopped`].
    pub fn db_state(&self) -> DiagResult<DbState> {
        let output = self.run(
            Tool::Sqlplus,
            Tool::Sqlplus.default_target(),
            &db_state_script(),
        )?;
        let catalog = self.diagnostics.catalog()?;
        let state = parse_db_state(&catalog, &output.output);
        info!(%state, "database state");
        Ok(state)
    }
}

/// SQL*Plus script that prints the instance status as a [`DB_STATUS_TAG`] row.
pub fn db_state_script() -> String {
    sqlplus_script(
        &format!(
            "select '{DB_STATUS_TAG}' || '{DB_STATUS_SEPARATOR}' || upper(status) from v$instance"
        ),
        DB_STATUS_SEPARATOR,
    )
}

/// Reads the instance state from the output of [`db_state_script`].
///
/// An [`INSTANCE_DOWN_CODE`] anywhere in the output means the instance is
/// stopped, whatever else was printed. Otherwise the first status row decides.
pub fn parse_db_state(catalog: &FacilityCatalog, output: &str) -> DbState {
    let outcome = scan_with(catalog, output, &ComponentFilter::from_names(["rdbms"]));
    if outcome
        .findings()
        .iter()
        .any(|finding| finding.error_code() == INSTANCE_DOWN_CODE)
    {
        return DbState::Stopped;
    }
    TaggedParser::new(DB_STATUS_TAG, DB_STATUS_SEPARATOR)
        .with_min_fields(1)
        .first_only()
        .parse(output)
        .into_values()
        .next()
        .and_then(|fields| fields.into_iter().next())
        .and_then(|status| status.trim().parse().ok())
        .unwrap_or(DbState::Unknown)
}

/// Prefixes `sql` with the session settings that make SQL*Plus print bare,
/// `separator`-delimited rows with no headings or feedback.
pub fn sqlplus_script(sql: &str, separator: &str) -> String {
    let sql = sql.trim_end();
    let terminator = if sql.ends_with(';') { "" } else { ";" };
    format!(
        "set pagesize      0\n\
         set heading     off\n\
         set lines     32767\n\
         set feedback    off\n\
         set echo        off\n\
         set colsep      '{separator}'\n\
         \n\
         {sql}{terminator}\n"
    )
}
