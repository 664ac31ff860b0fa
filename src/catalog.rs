//! Durable store for named style prompts.
//!
//! The backing file is a top-level JSON array of `{"name", "description"}`
//! objects shared with the catalog editor. Every mutation loads the file
//! fresh, rewrites the whole collection and replaces the file atomically.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde_json::Value;

use crate::error::RestyleError;
use crate::types::StyleRecord;

pub const CATALOG_FILE_NAME: &str = "art_styles.json";

pub fn default_catalog_path(root: &Path) -> PathBuf {
    root.join(CATALOG_FILE_NAME)
}

/// Creates an empty catalog file when none exists yet.
pub fn ensure_catalog_file(path: &Path) -> io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, b"[]")
}

pub struct StyleCatalog {
    path: PathBuf,
}

impl StyleCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted collection. A missing file is an empty catalog;
    /// an unreadable or malformed file is recovered as empty with a warning
    /// so a broken catalog never blocks the tool.
    pub fn load(&self) -> Vec<StyleRecord> {
        match self.read_records() {
            Ok(records) => records,
            Err(RestyleError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                tracing::warn!(
                    "failed to read style catalog {}: {}; treating as empty",
                    self.path.display(),
                    err
                );
                Vec::new()
            }
        }
    }

    pub fn find(&self, name: &str) -> Option<StyleRecord> {
        self.load().into_iter().find(|record| record.name == name)
    }

    pub fn add(&self, name: &str, description: &str) -> Result<StyleRecord, RestyleError> {
        let (name, description) = validated(name, description)?;
        let mut records = self.load();
        if records.iter().any(|record| record.name == name) {
            return Err(RestyleError::Duplicate(name));
        }
        let record = StyleRecord::new(name, description);
        records.push(record.clone());
        self.save(&records)?;
        Ok(record)
    }

    pub fn update(&self, name: &str, new_description: &str) -> Result<(), RestyleError> {
        let (name, new_description) = validated(name, new_description)?;
        let mut records = self.load();
        let record = records
            .iter_mut()
            .find(|record| record.name == name)
            .ok_or(RestyleError::NotFound(name))?;
        record.description = new_description;
        self.save(&records)
    }

    /// Idempotent: removing an absent name is a successful no-op.
    pub fn remove(&self, name: &str) -> Result<(), RestyleError> {
        let mut records = self.load();
        let before = records.len();
        records.retain(|record| record.name != name);
        if records.len() == before {
            return Ok(());
        }
        self.save(&records)
    }

    /// Remove-plus-add in a single persisted write, so the file never holds
    /// both names or neither. The renamed record moves to the end.
    pub fn rename(
        &self,
        old_name: &str,
        new_name: &str,
        new_description: &str,
    ) -> Result<(), RestyleError> {
        let (new_name, new_description) = validated(new_name, new_description)?;
        let mut records = self.load();
        let position = records
            .iter()
            .position(|record| record.name == old_name)
            .ok_or_else(|| RestyleError::NotFound(old_name.to_string()))?;
        if new_name != old_name && records.iter().any(|record| record.name == new_name) {
            return Err(RestyleError::Duplicate(new_name));
        }
        let removed = records.remove(position);
        records.push(StyleRecord {
            name: new_name,
            description: new_description,
            engine: removed.engine,
        });
        self.save(&records)
    }

    /// Replaces the whole persisted collection via write-to-temp-then-rename,
    /// so readers never observe a half-written file.
    pub fn save(&self, records: &[StyleRecord]) -> Result<(), RestyleError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent
            }
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, records)?;
        tmp.persist(&self.path)?;
        Ok(())
    }

    fn read_records(&self) -> Result<Vec<StyleRecord>, RestyleError> {
        let bytes = fs::read(&self.path)?;
        let value: Value = serde_json::from_slice(&bytes)?;
        if !value.is_array() {
            return Err(RestyleError::Format(serde_json::Error::custom(
                "top-level value is not an array",
            )));
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn validated(name: &str, description: &str) -> Result<(String, String), RestyleError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RestyleError::Validation("style name is required".into()));
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(RestyleError::Validation(
            "style description is required".into(),
        ));
    }
    Ok((name.to_string(), description.to_string()))
}
