//! Serializer capability: typed value ⇄ bytes.
//!
//! Each adapter is a small struct implementing [`Serializer<T>`] for every
//! `T: Serialize + DeserializeOwned`.  Decoding never touches shared state:
//! on failure the caller's value is left exactly as it was.
//!
//! | Adapter              | Format | Notes                                  |
//! |----------------------|--------|----------------------------------------|
//! | [`YamlSerializer`]   | YAML   | default; 4-space nested indentation     |
//! | [`JsonSerializer`]   | JSON   | `indent == 0` means compact             |
//! | [`TomlSerializer`]   | TOML   | top-level value must be a table         |

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

pub mod json;
pub mod toml;
pub mod yaml;

pub use self::json::JsonSerializer;
pub use self::toml::TomlSerializer;
pub use self::yaml::YamlSerializer;

/// Error returned when a value cannot be encoded.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error(transparent)]
    Yaml(serde_yaml::Error),
    #[error(transparent)]
    Json(serde_json::Error),
    #[error(transparent)]
    Toml(::toml::ser::Error),
    /// Raised by adapters outside this crate.
    #[error("{0}")]
    Custom(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Error returned when bytes cannot be decoded into the target type.
///
/// Covers both malformed input and shape mismatches (e.g. a string where a
/// bool is expected).
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error(transparent)]
    Yaml(serde_yaml::Error),
    #[error(transparent)]
    Json(serde_json::Error),
    #[error(transparent)]
    Toml(::toml::de::Error),
    #[error("config is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// Raised by adapters outside this crate.
    #[error("{0}")]
    Custom(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Encodes and decodes a config value of type `T`.
pub trait Serializer<T>: Send + Sync {
    /// Encodes `data` into bytes ready for storage.
    fn serialize_data(&self, data: &T) -> Result<Vec<u8>, SerializeError>;
    /// Decodes `raw` into a fresh value.
    fn deserialize_data(&self, raw: &[u8]) -> Result<T, DeserializeError>;
}

impl<T, S: Serializer<T> + ?Sized> Serializer<T> for Box<S> {
    fn serialize_data(&self, data: &T) -> Result<Vec<u8>, SerializeError> {
        (**self).serialize_data(data)
    }

    fn deserialize_data(&self, raw: &[u8]) -> Result<T, DeserializeError> {
        (**self).deserialize_data(raw)
    }
}

/// On-disk formats known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Guesses the format from a file extension (`yaml`/`yml`, `json`, `toml`).
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Returns a boxed serializer for this format.
    ///
    /// `json_indent` only applies to [`Format::Json`].
    pub fn serializer<T>(self, json_indent: usize) -> Box<dyn Serializer<T>>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + 'static,
    {
        match self {
            Self::Yaml => Box::new(YamlSerializer),
            Self::Json => Box::new(JsonSerializer::new(json_indent)),
            Self::Toml => Box::new(TomlSerializer::default()),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        })
    }
}

/// Error returned when parsing an unknown format name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown config format: {0} (expected yaml, json or toml)")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension(Path::new("a/config.yaml")), Some(Format::Yaml));
        assert_eq!(Format::from_extension(Path::new("config.YML")), Some(Format::Yaml));
        assert_eq!(Format::from_extension(Path::new("config.json")), Some(Format::Json));
        assert_eq!(Format::from_extension(Path::new("config.toml")), Some(Format::Toml));
        assert_eq!(Format::from_extension(Path::new("config.ini")), None);
        assert_eq!(Format::from_extension(Path::new("config")), None);
    }

    #[test]
    fn test_format_parses_and_displays() {
        assert_eq!("JSON".parse::<Format>(), Ok(Format::Json));
        assert_eq!("yml".parse::<Format>(), Ok(Format::Yaml));
        assert_eq!(Format::Toml.to_string(), "toml");
        assert_eq!(
            "xml".parse::<Format>(),
            Err(UnknownFormat("xml".to_string()))
        );
    }

    #[test]
    fn test_boxed_serializer_from_format_encodes() {
        let serializer: Box<dyn Serializer<Vec<u32>>> = Format::Json.serializer(0);
        assert_eq!(serializer.serialize_data(&vec![1, 2]).unwrap(), b"[1,2]".to_vec());
    }
}
