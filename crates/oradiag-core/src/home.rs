use std::{
    env,
    fmt::Display,
    path::{Path, PathBuf},
};

use crate::{CoreError, CoreResult, ORACLE_HOME_VAR};

/// Root directory of a product installation (`$ORACLE_HOME`).
///
/// Every catalog and tool location is derived from this root, so it is passed
/// explicitly into the operations that need one rather than read from the
/// process environment at the point of use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OracleHome(PathBuf);

impl OracleHome {
    /// Wraps an installation root directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Reads the installation root from `ORACLE_HOME`.
    pub fn from_env() -> CoreResult<Self> {
        match env::var_os(ORACLE_HOME_VAR) {
            Some(value) if !value.is_empty() => Ok(Self(PathBuf::from(value))),
            _ => Err(CoreError::EnvironmentUnset(ORACLE_HOME_VAR)),
        }
    }

    /// The installation root directory itself.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// `<home>/lib/facility.lis`
    pub fn facility_catalog_path(&self) -> PathBuf {
        self.0.join("lib").join("facility.lis")
    }

    /// `<home>/<component>/mesg/<facility>us.msg`
    pub fn message_file_path(&self, component: &str, facility: &str) -> PathBuf {
        self.0
            .join(component)
            .join("mesg")
            .join(format!("{facility}us.msg"))
    }

    /// `<home>/bin/<binary>`
    pub fn tool_path(&self, binary: &str) -> PathBuf {
        self.0.join("bin").join(binary)
    }

    /// `<home>/lib`
    pub fn lib_dir(&self) -> PathBuf {
        self.0.join("lib")
    }
}

impl AsRef<Path> for OracleHome {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for OracleHome {
    fn from(value: PathBuf) -> Self {
        Self(value)
    }
}

impl Display for OracleHome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
