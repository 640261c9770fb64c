//! # keepconf-core
//!
//! In-process configuration holder that keeps a typed value in memory,
//! persists it through a pluggable [`Storage`] backend using a pluggable
//! [`Serializer`] format, and mutates it atomically.
//!
//! # Architecture overview
//!
//! - **`storage`** – Raw byte load/save against a backing medium.  A storage
//!   reports "missing" (`Ok(None)`) distinctly from an I/O failure.
//!   [`FileStorage`] is the default, [`MemoryStorage`] keeps bytes in-process.
//!
//! - **`serializer`** – Encodes/decodes the typed value.  YAML (the default),
//!   JSON and TOML adapters are provided.
//!
//! - **`config`** – [`Config<T>`] owns the live value and coordinates load,
//!   save and [`Config::transaction`]: snapshot, mutate, persist, and restore
//!   the snapshot on any failure so memory and storage never diverge.
//!
//! ```rust
//! use keepconf_core::{Config, JsonSerializer, MemoryStorage};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
//! struct Settings {
//!     volume: u8,
//! }
//!
//! let config = Config::new(Settings::default(), MemoryStorage::new(), JsonSerializer::compact());
//! config
//!     .transaction(|s| {
//!         s.volume = 7;
//!         Ok::<_, std::io::Error>(())
//!     })
//!     .unwrap();
//! assert_eq!(config.get().volume, 7);
//! ```

pub mod config;
pub mod serializer;
pub mod storage;

pub use config::{Config, ConfigError, DEFAULT_CONFIG_FILE};
pub use serializer::{
    DeserializeError, Format, JsonSerializer, SerializeError, Serializer, TomlSerializer,
    YamlSerializer,
};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
