//! In-process storage.
//!
//! Keeps the last saved bytes in memory.  Useful for embedding a config
//! that never touches disk and for tests.

use std::sync::{Mutex, PoisonError};

use super::{Storage, StorageError};

/// A [`Storage`] that keeps its bytes in memory.
///
/// Reports missing until the first [`Storage::save`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    bytes: Mutex<Option<Vec<u8>>>,
    save_count: Mutex<u64>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage pre-populated with `bytes`.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
            save_count: Mutex::new(0),
        }
    }

    /// Returns a copy of the stored bytes.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> u64 {
        *self.save_count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.bytes())
    }

    fn save(&self, data: &[u8]) -> Result<(), StorageError> {
        *self.bytes.lock().unwrap_or_else(PoisonError::into_inner) = Some(data.to_vec());
        *self.save_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
