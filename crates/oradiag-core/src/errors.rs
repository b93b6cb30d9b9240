use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving an installation environment.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required environment variable is unset or empty.
    #[error("{0} is not set")]
    EnvironmentUnset(&'static str),
    /// The oratab file exists but could not be read.
    #[error("cannot open oratab file {path} for read: {source}")]
    OratabUnreadable {
        /// Oratab file that failed to open.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The requested SID has no oratab entry.
    #[error("SID not found in oratab: {0}")]
    UnknownSid(String),
    /// A configuration file is missing or is not valid INI.
    #[error("cannot read configuration file {path}: {source}")]
    ConfigUnreadable {
        /// Configuration file that failed to load.
        path: PathBuf,
        /// Underlying parse or I/O failure.
        #[source]
        source: config::ConfigError,
    },
    /// The configuration file has no section by this name.
    #[error("section [{section}] not found in configuration file {path}")]
    SectionNotFound {
        /// Configuration file that was searched.
        path: PathBuf,
        /// Section as requested (case-sensitive).
        section: String,
    },
    /// A connect string has more than one `@`, or more than one `/` in a part.
    #[error("malformed connect string")]
    MalformedConnectString,
    /// A connect string lacks the username or password needed to connect.
    #[error("username and password are required when specifying a connect string")]
    IncompleteConnectString,
}
