use std::{io, sync::Arc};

use crate::{
    cache::FacilityCache,
    facility::FacilityCatalog,
    message::{resolve_with, MessageEntry},
    report::{render_with, write_report},
    scan::{scan_with, ComponentFilter, Finding, ScanOutcome},
    DiagResult, OracleHome,
};

/// An installation root paired with a facility cache.
///
/// This is the usual entry point when many outputs are checked against the
/// same installation: the facility catalog is read once and reused until
/// [`Diagnostics::reload`] is called.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    home: OracleHome,
    cache: FacilityCache,
}

impl Diagnostics {
    /// Handle for `home` with a cache of its own.
    pub fn new(home: OracleHome) -> Self {
        Self::with_cache(home, FacilityCache::new())
    }

    /// Shares `cache` with other handles, e.g. one per installation root.
    pub fn with_cache(home: OracleHome, cache: FacilityCache) -> Self {
        Self { home, cache }
    }

    /// Uses the installation root named by `ORACLE_HOME`.
    pub fn from_env() -> DiagResult<Self> {
        Ok(Self::new(OracleHome::from_env()?))
    }

    /// Installation root the catalogs are read from.
    pub fn home(&self) -> &OracleHome {
        &self.home
    }

    /// The cache behind [`Diagnostics::catalog`].
    pub fn cache(&self) -> &FacilityCache {
        &self.cache
    }

    /// The facility catalog of this installation, loaded on first use.
    pub fn catalog(&self) -> DiagResult<Arc<FacilityCatalog>> {
        self.cache.get_or_load(self.home.facility_catalog_path())
    }

    /// Forces the facility catalog to be read again.
    pub fn reload(&self) -> DiagResult<Arc<FacilityCatalog>> {
        self.cache.reload(self.home.facility_catalog_path())
    }

    /// Scans `text` for the facilities selected by `filter`.
    pub fn scan(&self, text: &str, filter: &ComponentFilter) -> DiagResult<ScanOutcome> {
        let catalog = self.catalog()?;
        Ok(scan_with(&catalog, text, filter))
    }

    /// Resolves `code` to its explanation block.
    pub fn resolve(&self, code: &str) -> DiagResult<MessageEntry> {
        let catalog = self.catalog()?;
        resolve_with(&self.home, &catalog, code)
    }

    /// Renders the report for `findings` to a string.
    pub fn render_report(&self, command: &str, output: &str, findings: &[Finding]) -> String {
        render_with(command, output, findings, |code| self.resolve(code))
    }

    /// Writes the report for `findings` to `out`.
    pub fn write_report<W: io::Write>(
        &self,
        out: &mut W,
        command: &str,
        output: &str,
        findings: &[Finding],
    ) -> io::Result<()> {
        write_report(out, command, output, findings, |code| self.resolve(code))
    }
}
