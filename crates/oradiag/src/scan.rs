use std::collections::BTreeSet;

use memchr::memmem::Finder;
use serde::Serialize;
use tracing::debug;

use crate::{facility::FacilityCatalog, DiagResult, OracleHome};

/// Sentinel component name that selects every facility.
pub const ALL_COMPONENTS: &str = "ALL_COMPONENTS";

/// Number of digits that must follow `<CODE>-` for a match.
pub const CODE_DIGITS: usize = 4;

/// Which components' facilities a scan looks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ComponentFilter {
    /// Every facility in the catalog.
    #[default]
    All,
    /// Only facilities owned by these components.
    Components(BTreeSet<String>),
}

impl ComponentFilter {
    /// Builds a filter from component names.
    ///
    /// An empty list, or one containing [`ALL_COMPONENTS`] (any case), selects
    /// every component.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty()
            || names
                .iter()
                .any(|name| name.eq_ignore_ascii_case(ALL_COMPONENTS))
        {
            Self::All
        } else {
            Self::Components(names)
        }
    }

    /// Whether facilities owned by `component` are scanned for.
    pub fn includes(&self, component: &str) -> bool {
        match self {
            Self::All => true,
            Self::Components(names) => names.contains(component),
        }
    }
}

/// One error code found in scanned output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub(crate) error_code: String,
    pub(crate) source_line: String,
    pub(crate) line_number: usize,
}

impl Finding {
    /// The code as it appeared, e.g. `ORA-00001`.
    pub fn error_code(&self) -> &str {
        &self.error_code
    }
    /// The full line the code was found in.
    pub fn source_line(&self) -> &str {
        &self.source_line
    }
    /// 1-based line number within the scanned text.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
    /// Facility prefix of the code, e.g. `ORA`.
    pub fn facility(&self) -> &str {
        self.error_code
            .split_once('-')
            .map_or(self.error_code.as_str(), |(facility, _)| facility)
    }
}

/// Result of scanning one piece of output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    findings: Vec<Finding>,
}

impl ScanOutcome {
    /// True when at least one error code was found.
    pub fn found(&self) -> bool {
        !self.findings.is_empty()
    }
    /// Findings in scan order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }
    /// Findings in scan order, owned.
    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
    /// Distinct error codes in order of first appearance.
    pub fn error_codes(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.findings
            .iter()
            .map(Finding::error_code)
            .filter(|code| seen.insert(*code))
            .collect()
    }
}

/// Matches `<CODE>-nnnn` for a fixed set of facility codes.
///
/// Building a scanner is separate from running it so the same facility set
/// can be applied to many outputs.
pub struct Scanner {
    needles: Vec<Finder<'static>>,
}

impl Scanner {
    /// Scanner for the facilities of `catalog` selected by `filter`.
    pub fn new(catalog: &FacilityCatalog, filter: &ComponentFilter) -> Self {
        Self::from_codes(catalog.codes_for(filter))
    }

    /// Scanner for an explicit list of facility codes (upper-cased here).
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let needles = codes
            .into_iter()
            .filter(|code| !code.as_ref().is_empty())
            .map(|code| {
                let needle = format!("{}-", code.as_ref().to_uppercase());
                Finder::new(needle.as_bytes()).into_owned()
            })
            .collect();
        Self { needles }
    }

    /// Number of facility codes being looked for.
    pub fn facility_count(&self) -> usize {
        self.needles.len()
    }

    /// Scans `text` line by line.
    ///
    /// Every occurrence of every facility is reported, so one line can yield
    /// several findings; within a line they are ordered by position. A code
    /// embedded in a longer token still counts, which means `RMAN-06054`
    /// also yields `MAN-06054` when both facilities are scanned for.
    pub fn scan(&self, text: &str) -> ScanOutcome {
        let mut findings = Vec::new();
        let mut hits: Vec<(usize, String)> = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let bytes = line.as_bytes();
            for needle in &self.needles {
                for start in needle.find_iter(bytes) {
                    if let Some(code) = match_code(line, start, needle.needle().len()) {
                        hits.push((start, code.to_string()));
                    }
                }
            }
            hits.sort_by_key(|(start, _)| *start);
            findings.extend(hits.drain(..).map(|(_, error_code)| Finding {
                error_code,
                source_line: line.to_string(),
                line_number: index + 1,
            }));
        }
        ScanOutcome { findings }
    }
}

/// Returns the code starting at `start` if the prefix of `needle_len` bytes
/// is followed by at least [`CODE_DIGITS`] digits. The whole digit run is
/// kept so the code can be resolved against the message catalog as written.
fn match_code(line: &str, start: usize, needle_len: usize) -> Option<&str> {
    let digits_start = start + needle_len;
    let digits = line.as_bytes()[digits_start..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits < CODE_DIGITS {
        return None;
    }
    Some(&line[start..digits_start + digits])
}

/// Scans `text` for the error codes of the components selected by `filter`,
/// using the facility catalog of `home`.
///
/// Failure to read the catalog is an error, never an empty outcome.
pub fn scan(home: &OracleHome, text: &str, filter: &ComponentFilter) -> DiagResult<ScanOutcome> {
    let catalog = FacilityCatalog::load(home.facility_catalog_path())?;
    Ok(scan_with(&catalog, text, filter))
}

/// Scans `text` against an already loaded catalog.
pub fn scan_with(catalog: &FacilityCatalog, text: &str, filter: &ComponentFilter) -> ScanOutcome {
    let scanner = Scanner::new(catalog, filter);
    let outcome = scanner.scan(text);
    debug!(
        facilities = scanner.facility_count(),
        findings = outcome.findings().len(),
        "scanned output"
    );
    outcome
}
