//! In-memory storage

use std::{collections::HashMap, sync::RwLock};

use super::{KeyValueStorage, StorageError};

/// Storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with the given entries.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: RwLock::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.read()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .write()?
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.write()?.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn save_load_remove() -> TestResult {
        let storage = MemoryStorage::new();

        storage.save("token", "abc")?;
        assert_eq!(storage.load("token")?.as_deref(), Some("abc"));

        storage.remove("token")?;
        assert_eq!(storage.load("token")?, None);

        storage.remove("token")?;

        Ok(())
    }

    #[test]
    fn with_entries_prepopulates() -> TestResult {
        let storage = MemoryStorage::with_entries([("token", "abc")]);

        assert_eq!(storage.load("token")?.as_deref(), Some("abc"));

        Ok(())
    }
}
