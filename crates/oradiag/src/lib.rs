//! Correlates the text output of Oracle command-line tools with the facility
//! and message catalogs shipped in an installation.
//!
//! The flow is: run a tool (or obtain its output some other way), [`scan`] the
//! text for `<FACILITY>-nnnn` error codes belonging to the components of
//! interest, then [`report`] on the findings, which resolves each code to its
//! explanation block through the [`message`] catalog.

use std::path::PathBuf;

use oradiag_core::CoreError;
use thiserror::Error;

/// Caller-owned cache of parsed facility catalogs.
pub mod cache;
/// The `oradiag` command line.
pub mod cli;
/// Installation root plus cache, the usual entry point.
pub mod diagnostics;
/// Facility catalog (`facility.lis`) loading.
pub mod facility;
/// Error-code resolution against `<facility>us.msg` files.
pub mod message;
/// Operator-facing failure reports.
pub mod report;
/// Spawning command-line tools and checking their output.
pub mod runner;
/// Scanning tool output for facility error codes.
pub mod scan;
/// Extraction of tagged rows from column-separated output.
pub mod tagged;

pub use oradiag_core::OracleHome;

/// Convenience alias for results returned from diagnostic operations.
pub type DiagResult<T> = Result<T, DiagError>;

/// Errors that can occur while loading catalogs, scanning, or resolving codes.
#[derive(Error, Debug)]
pub enum DiagError {
    /// The installation root (or another required variable) is not available.
    #[error("{0} is not set")]
    EnvironmentUnset(&'static str),
    /// A facility or message catalog could not be opened.
    #[error("cannot open {path} for read: {source}")]
    CatalogUnreadable {
        /// Catalog file that failed to open.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// An error code did not split into exactly a facility and a number.
    #[error("invalid error code: {0}")]
    MalformedCode(String),
    /// The facility prefix of an error code is not in the facility catalog.
    #[error("invalid facility: {0}")]
    UnknownFacility(String),
    /// The message catalog was read but holds no entry for the code.
    #[error("error not found: {code} (msg file: {path})")]
    CodeNotFound {
        /// Error code as requested.
        code: String,
        /// Message catalog that was searched.
        path: PathBuf,
    },
    /// Failure unrelated to catalogs, such as spawning a tool.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Failure while resolving the instance environment.
    #[error("{0}")]
    Core(CoreError),
}

impl From<CoreError> for DiagError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::EnvironmentUnset(name) => Self::EnvironmentUnset(name),
            other => Self::Core(other),
        }
    }
}

/// Re-exports for the most common types.
pub mod prelude {
    pub use crate::{
        cache::FacilityCache,
        diagnostics::Diagnostics,
        facility::{load_facilities, FacilityCatalog, FacilityRecord},
        message::{resolve, ErrorCode, MessageEntry},
        report::{render_report, write_report},
        runner::{CheckedOutput, Tool, ToolOutput, ToolRunner},
        scan::{scan, ComponentFilter, Finding, ScanOutcome, Scanner},
        tagged::{parse_first_tagged, parse_tagged, TaggedParser},
        DiagError, DiagResult,
    };
    pub use oradiag_core::{OracleEnv, OracleHome, Oratab};
}
