//! Shared building blocks for the oradiag crates: the installation root, oratab
//! resolution, connect strings, configuration files, and small
//! output-formatting helpers.

/// INI configuration files read as section to option mappings.
pub mod config_file;
/// Parsing and rendering of `username/password@tnsname` connect strings.
pub mod connect;
/// The error type shared by this crate.
pub mod errors;
/// Byte-size, number, and date helpers for operator-facing output.
pub mod formatting;
/// The installation root and the paths derived from it.
pub mod home;
/// Oratab parsing and per-instance environment resolution.
pub mod oratab;

pub use config_file::ConfigFile;
pub use connect::ConnectString;
pub use errors::CoreError;
pub use home::OracleHome;
pub use oratab::{OracleEnv, Oratab};

/// Convenience alias for results returned from this crate.
pub type CoreResult<T> = Result<T, CoreError>;

/// Environment variable naming the active installation root.
pub const ORACLE_HOME_VAR: &str = "ORACLE_HOME";

/// Environment variable naming the active instance.
pub const ORACLE_SID_VAR: &str = "ORACLE_SID";

/// Environment variable consulted by the dynamic linker.
pub const LD_LIBRARY_PATH_VAR: &str = "LD_LIBRARY_PATH";
