use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;

use crate::domain::Entry;

const INDENT: &[u8] = b"    ";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode journal entries: {0}")]
    Encode(#[source] serde_json::Error),
}

impl StoreError {
    fn io(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Durable home of the whole entry collection.
///
/// Reads hand back raw JSON elements so the journal can repair whatever an
/// older or hand-edited document contains. Writes always take the complete
/// collection and replace the previous document.
pub trait EntryStore {
    /// Never fails: anything unreadable counts as an empty collection.
    fn read(&self) -> Vec<Value>;

    fn write(&mut self, entries: &[Entry]) -> Result<(), StoreError>;

    fn ensure_exists(&self) -> Result<(), StoreError>;

    fn all(&mut self) -> Vec<Value> {
        self.read()
    }
}

#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    cache: Option<Vec<Value>>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: None,
        }
    }

    /// Opens the store, creating an empty document on first use.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(path);
        store.ensure_exists()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntryStore for JsonStore {
    fn read(&self) -> Vec<Value> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                warn!("cannot read journal {}: {err}", self.path.display());
                return Vec::new();
            }
        };

        if raw.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                warn!("journal {} is not a JSON array; starting empty", self.path.display());
                Vec::new()
            }
            Err(err) => {
                warn!("journal {} is not valid JSON ({err}); starting empty", self.path.display());
                Vec::new()
            }
        }
    }

    fn write(&mut self, entries: &[Entry]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
            }
        }

        let mut buffer = Vec::new();
        let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
        entries
            .serialize(&mut serializer)
            .map_err(StoreError::Encode)?;
        fs::write(&self.path, &buffer).map_err(StoreError::io(&self.path))?;

        debug!("wrote {} entries to {}", entries.len(), self.path.display());
        self.cache = Some(entries.iter().map(Entry::to_json).collect());
        Ok(())
    }

    fn ensure_exists(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
            }
        }
        fs::write(&self.path, "[]").map_err(StoreError::io(&self.path))
    }

    fn all(&mut self) -> Vec<Value> {
        if self.cache.is_none() {
            self.cache = Some(self.read());
        }
        self.cache.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use crate::domain::Entry;

    use super::{EntryStore, JsonStore, StoreError};

    fn sample(mood: &str) -> Entry {
        let mut entry = Entry::with_defaults(NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"));
        entry.mood = mood.to_string();
        entry
    }

    #[test]
    fn open_creates_empty_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("data.json");
        let store = JsonStore::open(&path).expect("open should succeed");
        assert_eq!(fs::read_to_string(&path).expect("document"), "[]");
        assert!(store.read().is_empty());
    }

    #[test]
    fn ensure_exists_keeps_existing_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        fs::write(&path, r#"[{"mood":"Sedih"}]"#).expect("seed document");
        JsonStore::open(&path).expect("open should succeed");
        assert_eq!(fs::read_to_string(&path).expect("document"), r#"[{"mood":"Sedih"}]"#);
    }

    #[test]
    fn unreadable_content_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = JsonStore::new(dir.path().join("missing.json"));
        assert!(missing.read().is_empty());

        for (name, content) in [("corrupt.json", "{not json"), ("object.json", r#"{"a":1}"#), ("blank.json", "  \n")] {
            let path = dir.path().join(name);
            fs::write(&path, content).expect("seed document");
            assert!(JsonStore::new(&path).read().is_empty(), "{name}");
        }
    }

    #[test]
    fn writes_pretty_unicode_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        let mut store = JsonStore::open(&path).expect("open should succeed");
        store.write(&[sample("😊 senang")]).expect("write should succeed");

        let raw = fs::read_to_string(&path).expect("document");
        assert!(raw.starts_with("[\n    {\n        \"tanggal\": \"2024-01-01\","));
        assert!(raw.contains("\"mood\": \"😊 senang\""));

        let values = store.read();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["tugas"], "");
    }

    #[test]
    fn cache_follows_latest_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        let mut store = JsonStore::open(&path).expect("open should succeed");
        assert!(store.all().is_empty());

        store.write(&[sample("Biasa"), sample("Sedih")]).expect("write should succeed");
        fs::write(&path, "[]").expect("external overwrite");
        assert_eq!(store.all().len(), 2);
        assert!(store.read().is_empty());
    }

    #[test]
    fn write_failure_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonStore::new(dir.path());
        let err = store.write(&[sample("Biasa")]).expect_err("writing over a directory should fail");
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().starts_with("io error on"));
    }
}
