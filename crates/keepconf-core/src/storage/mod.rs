//! Storage capability: raw byte persistence for a [`crate::Config`].
//!
//! A storage knows nothing about the value it holds.  It hands the config
//! core whatever bytes were last saved, or reports that nothing has been
//! saved yet.  "Nothing saved yet" is `Ok(None)` and is NOT an error: a first
//! run without a config file is the normal case.
//!
//! # Atomicity contract
//!
//! The core treats [`Storage::save`] as all-or-nothing.  An adapter must
//! either replace the previous content completely or leave it untouched;
//! the core never attempts a two-phase commit of its own.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Error type for storage operations.
///
/// "Missing" is deliberately not a variant – it is reported as `Ok(None)`
/// from [`Storage::load`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A non-file backend failed.  The inner error is displayed verbatim.
    #[error("{0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wraps an arbitrary backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Backend(err.into())
    }
}

/// Trait abstracting the backing medium of a config.
///
/// The production implementation is [`FileStorage`]; [`MemoryStorage`] and
/// test doubles implement it for in-process use.
#[cfg_attr(test, mockall::automock)]
pub trait Storage: Send + Sync {
    /// Returns the stored bytes, or `None` when the medium holds no data.
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;
    /// Replaces the stored bytes with `data`.
    fn save(&self, data: &[u8]) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).load()
    }

    fn save(&self, data: &[u8]) -> Result<(), StorageError> {
        (**self).save(data)
    }
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).load()
    }

    fn save(&self, data: &[u8]) -> Result<(), StorageError> {
        (**self).save(data)
    }
}
