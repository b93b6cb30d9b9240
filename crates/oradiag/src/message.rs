use std::{fmt::Display, fs, path::Path, str::FromStr};

use serde::Serialize;
use tracing::debug;

use crate::{facility::FacilityCatalog, DiagError, DiagResult, OracleHome};

const CODE_SEPARATOR: char = '-';
const CONTINUATION_MARKER: &str = "//";

/// A fully-qualified error code split into facility and number, both folded
/// to lower case (`ORA-00001` becomes `ora` / `00001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    facility: String,
    number: String,
}

impl ErrorCode {
    /// Facility prefix, lower case.
    pub fn facility(&self) -> &str {
        &self.facility
    }
    /// Numeric part exactly as written, padding included.
    pub fn number(&self) -> &str {
        &self.number
    }
    /// Numeric part without leading zeros (`"0"` if it was all zeros).
    pub fn unpadded_number(&self) -> &str {
        let trimmed = self.number.trim_start_matches('0');
        if trimmed.is_empty() {
            "0"
        } else {
            trimmed
        }
    }
}

impl FromStr for ErrorCode {
    type Err = DiagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let mut parts = lower.split(CODE_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(facility), Some(number), None) if !facility.is_empty() && !number.is_empty() => {
                Ok(Self {
                    facility: facility.to_string(),
                    number: number.to_string(),
                })
            }
            _ => Err(DiagError::MalformedCode(s.to_string())),
        }
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{CODE_SEPARATOR}{}",
            self.facility.to_uppercase(),
            self.number
        )
    }
}

/// The explanation block for one error code in a `<facility>us.msg` file.
///
/// ```text
/// 00001, 00000, "unique constraint (%s.%s) violated"
/// // *Cause: An UPDATE or INSERT statement attempted to insert a duplicate key.
/// // *Action: Either remove the unique restriction or do not insert the key.
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageEntry {
    pub(crate) header_line: String,
    pub(crate) continuation_lines: Vec<String>,
}

impl MessageEntry {
    /// The line carrying the code, its secondary code, and the message text.
    pub fn header_line(&self) -> &str {
        &self.header_line
    }
    /// The `//` lines that follow the header.
    pub fn continuation_lines(&self) -> &[String] {
        &self.continuation_lines
    }
    /// Header followed by the continuation lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.header_line.as_str())
            .chain(self.continuation_lines.iter().map(String::as_str))
    }
    /// Number of lines in the block, header included.
    pub fn line_count(&self) -> usize {
        1 + self.continuation_lines.len()
    }
    /// Header followed by the continuation lines, owned.
    pub fn into_lines(self) -> Vec<String> {
        std::iter::once(self.header_line)
            .chain(self.continuation_lines)
            .collect()
    }
}

/// True when `line` is zero or more `0`s, then `number`, then a comma.
fn is_header(line: &str, number: &str) -> bool {
    let zeros = line.len() - line.trim_start_matches('0').len();
    (0..=zeros).any(|skip| {
        line[skip..]
            .strip_prefix(number)
            .is_some_and(|rest| rest.starts_with(','))
    })
}

/// Single top-to-bottom pass: the first header for `number`, then every
/// directly following continuation line. The first other line ends the block.
fn find_block(text: &str, number: &str) -> Option<MessageEntry> {
    let mut lines = text.lines();
    let header = lines.find(|line| is_header(line, number))?;
    let continuation_lines = lines
        .take_while(|line| line.starts_with(CONTINUATION_MARKER))
        .map(|line| line.trim().to_string())
        .collect();
    Some(MessageEntry {
        header_line: header.trim().to_string(),
        continuation_lines,
    })
}

/// Finds the block for `code` in message-file text.
///
/// The number is tried as written first; if no header matches at all the
/// whole text is searched again with leading zeros removed. A header without
/// continuation lines counts as found.
pub fn find_message(text: &str, code: &ErrorCode) -> Option<MessageEntry> {
    find_block(text, code.number()).or_else(|| {
        let unpadded = code.unpadded_number();
        if unpadded == code.number() {
            None
        } else {
            find_block(text, unpadded)
        }
    })
}

/// Resolves `code` to its explanation using an already loaded catalog.
pub fn resolve_with(
    home: &OracleHome,
    catalog: &FacilityCatalog,
    code: &str,
) -> DiagResult<MessageEntry> {
    let code: ErrorCode = code.parse()?;
    let record = catalog
        .get(code.facility())
        .ok_or_else(|| DiagError::UnknownFacility(code.facility().to_string()))?;
    let path = home.message_file_path(record.component(), code.facility());
    let text = read_message_file(&path)?;
    let entry = find_message(&text, &code).ok_or_else(|| DiagError::CodeNotFound {
        code: code.to_string(),
        path: path.clone(),
    })?;
    debug!(%code, path = %path.display(), lines = entry.line_count(), "resolved error code");
    Ok(entry)
}

/// Resolves `code` (e.g. `ORA-00001`) to its explanation block, reading the
/// facility catalog of `home` first.
pub fn resolve(home: &OracleHome, code: &str) -> DiagResult<MessageEntry> {
    let catalog = FacilityCatalog::load(home.facility_catalog_path())?;
    resolve_with(home, &catalog, code)
}

fn read_message_file(path: &Path) -> DiagResult<String> {
    let bytes = fs::read(path).map_err(|source| DiagError::CatalogUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
