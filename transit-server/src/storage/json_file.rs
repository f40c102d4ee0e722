//! One pretty-printed JSON file per collection.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::{Collection, RecordStore, StorageError};

/// File-backed store rooted at a data directory.
///
/// Saves write `<file>.tmp` and rename it over the target so a crash never
/// leaves a half-written collection behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store, creating the data directory if needed.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self, collection: Collection) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(collection);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), "loaded collection");
        Ok(Some(value))
    }

    fn save(&self, collection: Collection, records: &Value) -> Result<(), StorageError> {
        let path = self.path_for(collection);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(records)?;
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), "saved collection");
        Ok(())
    }
}
