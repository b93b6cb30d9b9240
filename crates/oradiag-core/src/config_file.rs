use std::{
    collections::BTreeMap,
    io::{self, Write},
    path::{Path, PathBuf},
};

use config::{Config, ConfigError, File, FileFormat, Source};
use tracing::debug;

use crate::{CoreError, CoreResult};

/// Options of one `[section]`, keyed by lower-cased option name.
pub type Section = BTreeMap<String, String>;

/// An INI-style configuration file read into `section -> option -> value`.
///
/// Option names are folded to lower case; section names are kept as written.
/// Options that appear before the first section header belong to no section
/// and are dropped.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    sections: BTreeMap<String, Section>,
}

impl ConfigFile {
    /// Reads and parses the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let unreadable = |source: ConfigError| CoreError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        };
        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini))
            .build()
            .map_err(unreadable)?;
        let mut sections = BTreeMap::new();
        for (name, value) in config.collect().map_err(unreadable)? {
            let Ok(table) = value.into_table() else {
                continue;
            };
            let options = table
                .into_iter()
                .map(|(option, value)| -> Result<(String, String), ConfigError> {
                    Ok((option.to_lowercase(), value.into_string()?))
                })
                .collect::<Result<Section, ConfigError>>()
                .map_err(unreadable)?;
            sections.insert(name, options);
        }
        debug!(path = %path.display(), sections = sections.len(), "loaded configuration");
        Ok(Self {
            path: path.to_path_buf(),
            sections,
        })
    }

    /// File this configuration was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Section names in sorted order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// The options of `name`; section names are case-sensitive.
    pub fn section(&self, name: &str) -> CoreResult<&Section> {
        self.sections
            .get(name)
            .ok_or_else(|| CoreError::SectionNotFound {
                path: self.path.clone(),
                section: name.to_string(),
            })
    }

    /// One option of one section, if both exist.
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(&option.to_lowercase())
            .map(String::as_str)
    }

    /// Writes every section and option in sorted order for an operator to read.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Configuration: {}", self.path.display())?;
        writeln!(out, "{}", "-".repeat(67))?;
        for (name, options) in &self.sections {
            writeln!(out)?;
            writeln!(out, "[{name}]")?;
            for (option, value) in options {
                writeln!(out, "{option:<40} = {value}")?;
            }
        }
        Ok(())
    }
}
