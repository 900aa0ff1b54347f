//! File-backed storage

use std::{
    collections::HashMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::{debug, warn};

use super::{KeyValueStorage, StorageError};

/// Storage persisted as a single JSON object of string keys to string values.
///
/// The file is read once on open and rewritten after every change. A missing
/// file starts empty; an unreadable or corrupt one also starts empty, with a
/// warning, and is replaced on the next write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    cache: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Name of the storage file inside a data directory.
    pub const FILE_NAME: &'static str = "storage.json";

    /// Open (or lazily create) storage at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = load_file(&path);

        debug!(path = %path.display(), entries = cache.len(), "file storage opened");

        Self {
            path,
            cache: RwLock::new(cache),
        }
    }

    /// Open storage in `dir`, using [`Self::FILE_NAME`].
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::open(dir.as_ref().join(Self::FILE_NAME))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(values)?;
        let staging = self.path.with_extension("json.tmp");

        fs::write(&staging, data)?;
        fs::rename(&staging, &self.path)?;

        Ok(())
    }
}

fn load_file(path: &Path) -> HashMap<String, String> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(source) if source.kind() == ErrorKind::NotFound => return HashMap::new(),
        Err(source) => {
            warn!(path = %path.display(), error = %source, "failed to read storage file");

            return HashMap::new();
        }
    };

    serde_json::from_str(&data).unwrap_or_else(|source| {
        warn!(path = %path.display(), error = %source, "failed to parse storage file");

        HashMap::new()
    })
}

impl KeyValueStorage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.cache.read()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut cache = self.cache.write()?;

        cache.insert(key.to_string(), value.to_string());

        self.persist(&cache)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut cache = self.cache.write()?;

        if cache.remove(key).is_none() {
            return Ok(());
        }

        self.persist(&cache)
    }
}
