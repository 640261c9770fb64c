//! The config core: a typed value kept in sync with its persisted form.
//!
//! [`Config<T>`] owns the live value, a [`Storage`] backend and a
//! [`Serializer`] for `T`.  All mutations that should reach storage go
//! through [`Config::transaction`]:
//!
//! ```text
//! lock ─▶ snapshot ─▶ mutate ─▶ serialize ─▶ storage.save ─▶ commit
//!                       │           │              │
//!                       └───────────┴──────────────┴──▶ restore snapshot
//! ```
//!
//! Any failure exit (the mutation's own error, a persistence error, or a
//! panic) restores the snapshot before the lock is released, so no caller
//! ever observes a value that differs from what storage holds.
//!
//! # Locking
//!
//! [`Config::save`] and [`Config::transaction`] hold the lock for their whole
//! duration and therefore never interleave.  [`Config::load`] reads and
//! decodes without the lock and only takes it to swap in the decoded value;
//! running it concurrently with a transaction can overwrite a freshly
//! committed value with older stored bytes.  Call it at startup or
//! synchronise externally.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::serializer::{DeserializeError, Format, SerializeError, Serializer, YamlSerializer};
use crate::storage::{FileStorage, Storage, StorageError};

/// File used by [`Config::new_minimal`], relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// JSON indentation used when a format is picked from a file extension.
const DEFAULT_JSON_INDENT: usize = 2;

/// Error type for config operations.
///
/// Storage and codec errors are transparent: their message reaches the
/// caller unchanged.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backing medium failed (distinct from "missing", which is not an error).
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The value could not be encoded.
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// Stored bytes could not be decoded into the config type.
    #[error(transparent)]
    Deserialize(#[from] DeserializeError),

    /// The transaction's mutation returned an error.
    #[error("{0}")]
    Aborted(#[source] Box<dyn Error + Send + Sync>),

    /// The mutation or the persistence step panicked.
    #[error("{0}")]
    Panicked(String),
}

/// A typed configuration value with pluggable persistence.
///
/// `T: Clone` provides the snapshot taken at the start of every
/// transaction.  The clone must be fully independent of the original; types
/// that share state through `Rc`/`Arc` interior mutability defeat rollback.
pub struct Config<T> {
    data: Mutex<T>,
    storage: Box<dyn Storage>,
    serializer: Box<dyn Serializer<T>>,
}

impl<T> Config<T> {
    /// Wires a config around `default`.  Performs no I/O.
    pub fn new<S, Z>(default: T, storage: S, serializer: Z) -> Self
    where
        S: Storage + 'static,
        Z: Serializer<T> + 'static,
    {
        Self {
            data: Mutex::new(default),
            storage: Box::new(storage),
            serializer: Box::new(serializer),
        }
    }

    /// Reads stored bytes into the live value.
    ///
    /// Missing data leaves the current value untouched and is not an error.
    /// On any failure the value is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Storage`] when the storage cannot be read and
    /// [`ConfigError::Deserialize`] when its content does not decode into `T`.
    pub fn load(&self) -> Result<(), ConfigError> {
        let Some(raw) = self.storage.load()? else {
            debug!("no stored config, keeping current value");
            return Ok(());
        };

        let value = self.serializer.deserialize_data(&raw)?;
        *self.lock() = value;
        debug!(bytes = raw.len(), "config loaded");
        Ok(())
    }

    /// Persists the current value.  The value itself is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] or [`ConfigError::Storage`]
    /// verbatim, or [`ConfigError::Panicked`] if serialization panicked.
    pub fn save(&self) -> Result<(), ConfigError> {
        let data = self.lock();
        let result = catch_panic(|| self.persist(&data));
        if result.is_ok() {
            debug!("config saved");
        }
        result
    }

    /// Runs `f` with a shared reference to the current value.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let data = self.lock();
        f(&*data)
    }

    /// Exclusive access to the value without persisting.  Follow with
    /// [`Config::save`] to write the change out.
    pub fn data_mut(&mut self) -> &mut T {
        self.data.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consumes the config and returns the current value.
    pub fn into_inner(self) -> T {
        self.data.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        // Panics are caught before they can unwind through a held guard, so
        // poisoning never carries a half-mutated value.
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, data: &T) -> Result<(), ConfigError> {
        let bytes = self.serializer.serialize_data(data)?;
        self.storage.save(&bytes)?;
        Ok(())
    }
}

impl<T: Clone> Config<T> {
    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.lock().clone()
    }

    /// Atomically mutates and persists the value.
    ///
    /// `mutate` edits the live value in place.  The change is kept only if
    /// `mutate` returns `Ok` and the new value is then serialized and saved.
    /// Otherwise the value is restored to its state before the call and
    /// storage is left as it was.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Aborted`] carrying the error `mutate` returned; no
    ///   save is attempted.
    /// - [`ConfigError::Serialize`] / [`ConfigError::Storage`] when persisting
    ///   the mutated value fails.
    /// - [`ConfigError::Panicked`] when `mutate` or persistence panicked.
    ///
    /// # Deadlocks
    ///
    /// The lock is held while `mutate` runs.  Calling [`Config::get`],
    /// [`Config::read`], [`Config::save`], another `transaction` or `{:?}`
    /// on the same config from inside `mutate` never returns; read and edit
    /// through the `&mut T` it is given.
    ///
    /// ```
    /// use keepconf_core::{Config, JsonSerializer, MemoryStorage};
    ///
    /// let config = Config::new(vec![1_u32], MemoryStorage::new(), JsonSerializer::compact());
    /// config
    ///     .transaction(|peers| {
    ///         let next = peers.last().copied().unwrap_or(0) + 1;
    ///         peers.push(next);
    ///         Ok::<_, &str>(())
    ///     })
    ///     .unwrap();
    /// assert_eq!(config.get(), vec![1, 2]);
    /// ```
    pub fn transaction<F, E>(&self, mutate: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut T) -> Result<(), E>,
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let mut data = self.lock();
        let mut guard = RollbackGuard::arm(&mut *data);

        let result = catch_panic(|| {
            mutate(guard.value_mut()).map_err(|e| ConfigError::Aborted(e.into()))?;
            self.persist(guard.value())
        });

        match result {
            Ok(()) => {
                guard.disarm();
                debug!("transaction committed");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }
}

impl<T> Config<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    /// Config stored as YAML in [`DEFAULT_CONFIG_FILE`] inside the current
    /// working directory.
    pub fn new_minimal(default: T) -> Self {
        Self::new(default, FileStorage::new(DEFAULT_CONFIG_FILE), YamlSerializer)
    }

    /// Config stored in `path`, with the format picked from the file
    /// extension (YAML when the extension is not recognised).
    pub fn with_file(default: T, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = Format::from_extension(&path).unwrap_or_default();
        Self {
            data: Mutex::new(default),
            storage: Box::new(FileStorage::new(path)),
            serializer: format.serializer(DEFAULT_JSON_INDENT),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Config<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("data", &*self.lock())
            .finish_non_exhaustive()
    }
}

// ── Rollback ──────────────────────────────────────────────────────────────────

/// Restores a snapshot into the live value on drop unless disarmed.
struct RollbackGuard<'a, T: Clone> {
    live: &'a mut T,
    snapshot: Option<T>,
}

impl<'a, T: Clone> RollbackGuard<'a, T> {
    fn arm(live: &'a mut T) -> Self {
        let snapshot = Some(live.clone());
        Self { live, snapshot }
    }

    fn value(&self) -> &T {
        self.live
    }

    fn value_mut(&mut self) -> &mut T {
        self.live
    }

    fn disarm(mut self) {
        self.snapshot = None;
    }
}

impl<T: Clone> Drop for RollbackGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.live = snapshot;
        }
    }
}

// ── Panic conversion ──────────────────────────────────────────────────────────

fn catch_panic<F>(f: F) -> Result<(), ConfigError>
where
    F: FnOnce() -> Result<(), ConfigError>,
{
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(ConfigError::Panicked(panic_message(payload))))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return (*s).to_string();
    }
    match payload.downcast::<String>() {
        Ok(s) => *s,
        Err(payload) => match payload.downcast::<Box<dyn Error + Send + Sync>>() {
            Ok(err) => err.to_string(),
            Err(_) => "unknown panic".to_string(),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
