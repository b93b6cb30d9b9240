use std::{
    collections::HashMap,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use tracing::debug;

use crate::{
    CoreError, CoreResult, OracleHome, LD_LIBRARY_PATH_VAR, ORACLE_HOME_VAR, ORACLE_SID_VAR,
};

/// Well-known oratab locations, searched in order after any explicit path.
pub const DEFAULT_ORATAB_LOCATIONS: [&str; 2] = ["/etc/oratab", "/var/opt/oracle/oratab"];

const ASM_SID_PREFIX: &str = "+ASM";

/// SID to installation-root mapping read from an oratab file.
#[derive(Debug, Clone, Default)]
pub struct Oratab {
    path: Option<PathBuf>,
    entries: HashMap<String, OracleHome>,
}

impl Oratab {
    /// Parses the oratab file at `path`.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CoreError::OratabUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut oratab = Self::parse(&text);
        oratab.path = Some(path.to_path_buf());
        debug!(path = %path.display(), entries = oratab.entries.len(), "loaded oratab");
        Ok(oratab)
    }

    /// Loads the first oratab that exists, trying `explicit` before the
    /// well-known locations. Returns an empty oratab when none exist.
    pub fn locate(explicit: Option<&Path>) -> CoreResult<Self> {
        let candidates = explicit
            .map(Path::to_path_buf)
            .into_iter()
            .chain(DEFAULT_ORATAB_LOCATIONS.iter().map(PathBuf::from))
            .unique();
        for candidate in candidates {
            if candidate.is_file() {
                return Self::load(candidate);
            }
        }
        debug!("no oratab file found");
        Ok(Self::default())
    }

    /// Parses oratab text of the form `sid:home[:flag]`, one entry per line.
    ///
    /// Everything after `#` is ignored. Lines without a colon or with an empty
    /// SID or home are skipped, and fields past the second are ignored. A later
    /// entry for the same SID replaces the earlier one.
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            let mut fields = line.split(':');
            let (Some(sid), Some(home)) = (fields.next(), fields.next()) else {
                continue;
            };
            let (sid, home) = (sid.trim(), home.trim());
            if sid.is_empty() || home.is_empty() {
                continue;
            }
            entries.insert(sid.to_string(), OracleHome::new(home));
        }
        Self {
            path: None,
            entries,
        }
    }

    /// File this oratab was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Installation root registered for `sid`.
    pub fn home(&self, sid: &str) -> Option<&OracleHome> {
        self.entries.get(sid)
    }

    /// All SIDs in sorted order.
    pub fn sids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).sorted().collect()
    }

    /// Number of SIDs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no SID is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Home of the ASM instance: the last `+ASM*` SID in sorted order.
    pub fn asm_home(&self) -> Option<&OracleHome> {
        self.sids()
            .into_iter()
            .rev()
            .find(|sid| sid.starts_with(ASM_SID_PREFIX))
            .and_then(|sid| self.home(sid))
    }

    /// Home of the first SID in sorted order, used when nothing else names one.
    pub fn first_home(&self) -> Option<&OracleHome> {
        self.sids().first().and_then(|sid| self.home(sid))
    }
}

/// A resolved instance: its SID and the installation root serving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleEnv {
    /// Instance name.
    pub sid: String,
    /// Installation root serving the instance.
    pub home: OracleHome,
}

impl OracleEnv {
    /// Looks up `sid` in `oratab`.
    pub fn resolve(sid: &str, oratab: &Oratab) -> CoreResult<Self> {
        let home = oratab
            .home(sid)
            .ok_or_else(|| CoreError::UnknownSid(sid.to_string()))?;
        Ok(Self {
            sid: sid.to_string(),
            home: home.clone(),
        })
    }

    /// `<home>/lib` prepended to an existing library search path.
    pub fn library_path(&self, existing: Option<&str>) -> String {
        let lib = self.home.lib_dir().display().to_string();
        match existing {
            Some(rest) if !rest.is_empty() => format!("{lib}:{rest}"),
            _ => lib,
        }
    }

    /// Variables to set on a child process so it runs against this instance.
    ///
    /// The current process environment is read (for `LD_LIBRARY_PATH`) but
    /// never modified.
    pub fn vars(&self) -> Vec<(&'static str, OsString)> {
        let existing = std::env::var(LD_LIBRARY_PATH_VAR).ok();
        vec![
            (ORACLE_SID_VAR, OsString::from(&self.sid)),
            (ORACLE_HOME_VAR, self.home.path().as_os_str().to_os_string()),
            (
                LD_LIBRARY_PATH_VAR,
                OsString::from(self.library_path(existing.as_deref())),
            ),
        ]
    }
}
