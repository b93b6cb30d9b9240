use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use serde::Serialize;
use tracing::debug;

use crate::{scan::ComponentFilter, DiagError, DiagResult};

const FIELD_SEPARATOR: char = ':';
const COMMENT_MARKER: char = '#';
const FIELD_COUNT: usize = 4;

/// One line of `facility.lis`: an error-code prefix and the component that
/// owns its message file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacilityRecord {
    pub(crate) code: String,
    pub(crate) component: String,
    pub(crate) legacy_name: String,
    pub(crate) description: String,
}

impl FacilityRecord {
    /// Facility code as written in the catalog, e.g. `ora` or `sp2`.
    pub fn code(&self) -> &str {
        &self.code
    }
    /// Owning component, which is also the directory holding the message file.
    pub fn component(&self) -> &str {
        &self.component
    }
    /// Historical alias, possibly empty or `*`.
    pub fn legacy_name(&self) -> &str {
        &self.legacy_name
    }
    /// Free-text description, possibly empty.
    pub fn description(&self) -> &str {
        &self.description
    }

    fn parse(line: &str) -> Option<Self> {
        let line = line.split(COMMENT_MARKER).next()?;
        if line.matches(FIELD_SEPARATOR).count() != FIELD_COUNT - 1 {
            return None;
        }
        let (code, component, legacy_name, description) =
            line.split(FIELD_SEPARATOR).map(str::trim).collect_tuple()?;
        if code.is_empty() {
            return None;
        }
        Some(Self {
            code: code.to_string(),
            component: component.to_string(),
            legacy_name: legacy_name.to_string(),
            description: description.to_string(),
        })
    }
}

/// Facility code to [`FacilityRecord`] mapping read from one catalog file.
///
/// Codes are case-insensitive; lookups fold to lower case.
#[derive(Debug, Clone, Default)]
pub struct FacilityCatalog {
    path: Option<PathBuf>,
    records: HashMap<String, FacilityRecord>,
}

impl FacilityCatalog {
    /// Reads and parses the catalog at `path`.
    pub fn load(path: impl AsRef<Path>) -> DiagResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DiagError::CatalogUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut catalog = Self::parse(&String::from_utf8_lossy(&bytes));
        catalog.path = Some(path.to_path_buf());
        debug!(path = %path.display(), facilities = catalog.len(), "loaded facility catalog");
        Ok(catalog)
    }

    /// Parses catalog text of the form `code:component:legacy name:description`.
    ///
    /// Blank lines and lines without exactly three colons (after dropping any
    /// `#` comment) are ignored, as are lines with an empty code. A later line
    /// for the same code replaces the earlier one.
    pub fn parse(text: &str) -> Self {
        let records = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(FacilityRecord::parse)
            .map(|record| (record.code.to_lowercase(), record))
            .collect();
        Self {
            path: None,
            records,
        }
    }

    /// File this catalog was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The record for `code`, in any case.
    pub fn get(&self, code: &str) -> Option<&FacilityRecord> {
        self.records.get(&code.to_lowercase())
    }

    /// Whether `code` is a known facility.
    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// Number of facilities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the catalog holds no facility.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &FacilityRecord> {
        self.records.values()
    }

    /// Records sorted by code.
    pub fn sorted_records(&self) -> Vec<&FacilityRecord> {
        self.records
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(_, record)| record)
            .collect()
    }

    /// Upper-cased facility codes selected by `filter`, sorted and unique.
    pub fn codes_for(&self, filter: &ComponentFilter) -> Vec<String> {
        self.records
            .values()
            .filter(|record| filter.includes(&record.component))
            .map(|record| record.code.to_uppercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct component names, sorted.
    pub fn components(&self) -> Vec<&str> {
        self.records
            .values()
            .map(|record| record.component.as_str())
            .sorted()
            .dedup()
            .collect()
    }
}

/// Loads the facility catalog at `path`.
pub fn load_facilities(path: impl AsRef<Path>) -> DiagResult<FacilityCatalog> {
    FacilityCatalog::load(path)
}
