//! JSON adapter.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{DeserializeError, SerializeError, Serializer};

/// Stores config as JSON.
///
/// `indent == 0` writes compact JSON; any other value pretty-prints with that
/// many spaces per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonSerializer {
    pub indent: usize,
}

impl JsonSerializer {
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    /// Single-line output.
    pub fn compact() -> Self {
        Self { indent: 0 }
    }
}

impl<T> Serializer<T> for JsonSerializer
where
    T: Serialize + DeserializeOwned,
{
    fn serialize_data(&self, data: &T) -> Result<Vec<u8>, SerializeError> {
        if self.indent == 0 {
            return serde_json::to_vec(data).map_err(SerializeError::Json);
        }

        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        data.serialize(&mut ser).map_err(SerializeError::Json)?;
        Ok(buf)
    }

    fn deserialize_data(&self, raw: &[u8]) -> Result<T, DeserializeError> {
        serde_json::from_slice(raw).map_err(DeserializeError::Json)
    }
}
