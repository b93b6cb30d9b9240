use std::collections::BTreeMap;

use tracing::debug;

/// Pulls tagged records out of column-separated tool output.
///
/// Queries that need structured rows select a constant marker as their first
/// column (`select 'ROW', name, value from ...` with `set colsep '~'`); every
/// output line starting with that marker is one record. Fields keep their
/// original text, untrimmed and unconverted.
#[derive(Debug, Clone)]
pub struct TaggedParser {
    tag: String,
    separator: String,
    min_fields: usize,
    first_only: bool,
}

impl TaggedParser {
    /// Parser for lines starting with `tag`, split on `separator`.
    pub fn new(tag: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            separator: separator.into(),
            min_fields: 0,
            first_only: false,
        }
    }

    /// Skip records with fewer than `min_fields` fields after the tag.
    pub fn with_min_fields(mut self, min_fields: usize) -> Self {
        self.min_fields = min_fields;
        self
    }

    /// Stop after the first accepted record.
    pub fn first_only(mut self) -> Self {
        self.first_only = true;
        self
    }

    /// Records keyed by sequence number, starting at 1.
    ///
    /// Numbers are only assigned to accepted records, so they stay dense when
    /// malformed lines are skipped.
    pub fn parse(&self, text: &str) -> BTreeMap<usize, Vec<String>> {
        let mut rows = BTreeMap::new();
        if self.tag.is_empty() || self.separator.is_empty() {
            return rows;
        }
        for (index, line) in text.lines().enumerate() {
            if !line.starts_with(self.tag.as_str()) {
                continue;
            }
            let fields: Vec<String> = line
                .split(self.separator.as_str())
                .skip(1)
                .map(str::to_string)
                .collect();
            if fields.len() < self.min_fields {
                debug!(
                    line = index + 1,
                    found = fields.len(),
                    expected = self.min_fields,
                    "skipping short tagged record"
                );
                continue;
            }
            rows.insert(rows.len() + 1, fields);
            if self.first_only {
                break;
            }
        }
        rows
    }
}

/// Every record in `text` tagged with `tag`, split on `separator`.
pub fn parse_tagged(text: &str, tag: &str, separator: &str) -> BTreeMap<usize, Vec<String>> {
    TaggedParser::new(tag, separator).parse(text)
}

/// Only the first record tagged with `tag`, if any.
pub fn parse_first_tagged(text: &str, tag: &str, separator: &str) -> Option<Vec<String>> {
    TaggedParser::new(tag, separator)
        .first_only()
        .parse(text)
        .into_values()
        .next()
}
