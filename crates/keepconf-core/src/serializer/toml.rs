//! TOML adapter.
//!
//! TOML documents are tables, so the config type must serialize to a map or
//! struct at the top level.  Scalars and sequences at the root are rejected
//! with a [`SerializeError::Toml`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{DeserializeError, SerializeError, Serializer};

/// Stores config as TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TomlSerializer {
    /// Use `toml::to_string_pretty` (multi-line arrays) instead of the
    /// compact form.
    pub pretty: bool,
}

impl Default for TomlSerializer {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl<T> Serializer<T> for TomlSerializer
where
    T: Serialize + DeserializeOwned,
{
    fn serialize_data(&self, data: &T) -> Result<Vec<u8>, SerializeError> {
        let text = if self.pretty {
            toml::to_string_pretty(data)
        } else {
            toml::to_string(data)
        };
        text.map(String::into_bytes).map_err(SerializeError::Toml)
    }

    fn deserialize_data(&self, raw: &[u8]) -> Result<T, DeserializeError> {
        let text = std::str::from_utf8(raw)?;
        toml::from_str(text).map_err(DeserializeError::Toml)
    }
}
