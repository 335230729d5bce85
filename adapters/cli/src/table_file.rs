use std::{
    fs,
    path::{Path, PathBuf},
};

use cannon_aim_core::{ConfigurationTable, TableLoadError, TableSource};
use glam::DVec3;
use serde::Deserialize;

/// Configuration table stored as a JSON document on disk.
///
/// The document pairs offsets and labels by index:
/// `{"points": [[x, y, z], ...], "configs": ["label", ...]}`.
#[derive(Clone, Debug)]
pub(crate) struct JsonTableFile {
    path: PathBuf,
}

impl JsonTableFile {
    /// Creates a source that reads `path` each time a table is requested.
    #[must_use]
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the table document.
    #[must_use]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for JsonTableFile {
    fn load_table(&self) -> Result<ConfigurationTable, TableLoadError> {
        let bytes = fs::read(&self.path).map_err(TableLoadError::Unreadable)?;
        parse_table(&bytes)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableDocument {
    points: Vec<DVec3>,
    configs: Vec<String>,
}

/// Parses a JSON table document.
pub(crate) fn parse_table(bytes: &[u8]) -> Result<ConfigurationTable, TableLoadError> {
    let document: TableDocument =
        serde_json::from_slice(bytes).map_err(|error| TableLoadError::Malformed(Box::new(error)))?;
    ConfigurationTable::from_parts(document.points, document.configs)
}
