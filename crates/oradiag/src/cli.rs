use std::{
    env,
    ffi::OsString,
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use oradiag_core::{ConfigFile, ConnectString, OracleEnv, Oratab, ORACLE_HOME_VAR};
use serde_json::to_writer_pretty;
use tracing::debug;

use crate::{
    diagnostics::Diagnostics,
    runner::{Tool, ToolRunner},
    scan::ComponentFilter,
    tagged::TaggedParser,
    DiagError, DiagResult, OracleHome,
};

#[derive(Parser)]
#[command(name = "oradiag", version)]
struct Cli {
    /// Installation root (or env ORACLE_HOME)
    #[arg(long, env = "ORACLE_HOME", global = true)]
    oracle_home: Option<PathBuf>,

    /// Resolve the installation root from the oratab entry for this SID
    #[arg(long, global = true)]
    sid: Option<String>,

    /// Oratab file tried before /etc/oratab and /var/opt/oracle/oratab
    #[arg(long, global = true)]
    oratab: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan tool output for error codes and print the findings as JSON
    Scan {
        /// Component whose facilities are scanned for (repeatable, default: all)
        #[arg(long = "component")]
        components: Vec<String>,
        /// Output file to scan (default: stdin)
        file: Option<PathBuf>,
    },
    /// Print the explanation block for an error code, e.g. ORA-00001
    Explain { code: String },
    /// Scan tool output and print a report with explanations
    Report {
        /// Component whose facilities are scanned for (repeatable, default: all)
        #[arg(long = "component")]
        components: Vec<String>,
        /// Command text shown at the top of the report
        #[arg(long, default_value = "")]
        command: String,
        /// Output file to scan (default: stdin)
        file: Option<PathBuf>,
    },
    /// List the facility catalog as JSON
    Facilities {
        /// Only facilities owned by this component (repeatable)
        #[arg(long = "component")]
        components: Vec<String>,
    },
    /// Extract tagged rows from column-separated output as JSON
    Tagged {
        /// Marker at the start of each record line
        #[arg(long)]
        tag: String,
        /// Column separator
        #[arg(long, default_value = "~")]
        separator: String,
        /// Skip records with fewer fields than this
        #[arg(long, default_value_t = 0)]
        min_fields: usize,
        /// Input file (default: stdin)
        file: Option<PathBuf>,
    },
    /// Run a tool with a script on stdin and report any errors
    Run {
        /// sqlplus, rman, dgmgrl, olsnodes or tnsping
        tool: Tool,
        /// Connect string, tnsping alias or olsnodes options, passed as is
        #[arg(long, conflicts_with = "connect")]
        target: Option<String>,
        /// username/password[@tnsname], checked before the tool is started
        #[arg(long)]
        connect: Option<String>,
        /// Script fed to the tool (default: stdin)
        file: Option<PathBuf>,
    },
    /// Print the instance state (STOPPED, STARTED, MOUNTED, OPEN, ...)
    State,
    /// Print an INI configuration file, or one section of it as JSON
    Config {
        /// Section to print (case-sensitive)
        #[arg(long)]
        section: Option<String>,
        /// Configuration file
        file: PathBuf,
    },
}

fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Where the installation root comes from. Only subcommands that read
/// catalogs or spawn tools resolve it.
struct Installation {
    oracle_home: Option<PathBuf>,
    sid: Option<String>,
    oratab: Option<PathBuf>,
}

impl Installation {
    /// Picks the installation root: `--sid` through the oratab wins, then
    /// `--oracle-home`/`ORACLE_HOME`, then the first oratab entry.
    fn resolve(&self) -> DiagResult<(OracleHome, Option<OracleEnv>)> {
        if let Some(sid) = &self.sid {
            let oratab = Oratab::locate(self.oratab.as_deref())?;
            let instance = OracleEnv::resolve(sid, &oratab)?;
            return Ok((instance.home.clone(), Some(instance)));
        }
        if let Some(home) = &self.oracle_home {
            return Ok((OracleHome::new(home), None));
        }
        let oratab = Oratab::locate(self.oratab.as_deref())?;
        let home = oratab
            .first_home()
            .cloned()
            .ok_or(DiagError::EnvironmentUnset(ORACLE_HOME_VAR))?;
        debug!(%home, "using first oratab entry");
        Ok((home, None))
    }

    fn diagnostics(&self) -> DiagResult<Diagnostics> {
        let (home, _) = self.resolve()?;
        Ok(Diagnostics::new(home))
    }

    fn runner(&self) -> DiagResult<ToolRunner> {
        let (home, instance) = self.resolve()?;
        let runner = ToolRunner::new(Diagnostics::new(home));
        Ok(match instance {
            Some(instance) => runner.with_instance(instance),
            None => runner,
        })
    }
}

/// Runs the command line on an explicit argv, so tests can drive it.
pub fn run_with_args<I, T>(args: I) -> Result<ExitCode, Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let Cli {
        oracle_home,
        sid,
        oratab,
        command,
    } = Cli::parse_from(args);
    let installation = Installation {
        oracle_home,
        sid,
        oratab,
    };
    let stdout = io::stdout();

    match command {
        Command::Scan { components, file } => {
            let diagnostics = installation.diagnostics()?;
            let text = read_input(file.as_deref())?;
            let outcome = diagnostics.scan(&text, &ComponentFilter::from_names(components))?;
            to_writer_pretty(stdout.lock(), outcome.findings())?;
            println!();
            Ok(found_code(outcome.found()))
        }
        Command::Explain { code } => {
            let diagnostics = installation.diagnostics()?;
            let entry = diagnostics.resolve(&code)?;
            for line in entry.lines() {
                println!("{line}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Report {
            components,
            command,
            file,
        } => {
            let diagnostics = installation.diagnostics()?;
            let text = read_input(file.as_deref())?;
            let outcome = diagnostics.scan(&text, &ComponentFilter::from_names(components))?;
            if outcome.found() {
                diagnostics.write_report(&mut stdout.lock(), &command, &text, outcome.findings())?;
            }
            Ok(found_code(outcome.found()))
        }
        Command::Facilities { components } => {
            let catalog = installation.diagnostics()?.catalog()?;
            let filter = ComponentFilter::from_names(components);
            let records: Vec<_> = catalog
                .sorted_records()
                .into_iter()
                .filter(|record| filter.includes(record.component()))
                .collect();
            to_writer_pretty(stdout.lock(), &records)?;
            println!();
            Ok(ExitCode::SUCCESS)
        }
        Command::Tagged {
            tag,
            separator,
            min_fields,
            file,
        } => {
            let text = read_input(file.as_deref())?;
            let rows = TaggedParser::new(tag, separator)
                .with_min_fields(min_fields)
                .parse(&text);
            to_writer_pretty(stdout.lock(), &rows)?;
            println!();
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            tool,
            target,
            connect,
            file,
        } => {
            let target = match connect {
                Some(connect) => connect.parse::<ConnectString>()?.connect_arg()?,
                None => target.unwrap_or_else(|| tool.default_target().to_string()),
            };
            let runner = installation.runner()?;
            let script = read_input(file.as_deref())?;
            let checked = runner.run_checked(tool, &target, &script)?;
            if checked.is_clean() {
                println!("{}", checked.output);
                return Ok(ExitCode::SUCCESS);
            }
            runner.diagnostics().write_report(
                &mut stdout.lock(),
                &script,
                &checked.output,
                checked.outcome.findings(),
            )?;
            Ok(ExitCode::FAILURE)
        }
        Command::State => {
            let state = installation.runner()?.db_state()?;
            println!("{state}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { section, file } => {
            let config = ConfigFile::load(&file)?;
            match section {
                Some(section) => {
                    to_writer_pretty(stdout.lock(), config.section(&section)?)?;
                    println!();
                }
                None => config.dump(&mut stdout.lock())?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn found_code(found: bool) -> ExitCode {
    if found {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Runs the command line on the process arguments.
pub fn cli() -> Result<ExitCode, Box<dyn std::error::Error>> {
    run_with_args(env::args_os())
}
