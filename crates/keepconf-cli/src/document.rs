//! Dotted key-path access into a dynamic config document.
//!
//! The CLI does not know the shape of the file it edits, so it works on a
//! `serde_json::Value`.  Paths are dot-separated mapping keys
//! (`network.control_port`); sequences are not addressable.

use serde_json::{Map, Value};
use thiserror::Error;

/// Error type for key-path operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("key path must not be empty")]
    Empty,

    #[error("key path {0:?} contains an empty segment")]
    EmptySegment(String),

    #[error("key not found: {0}")]
    NotFound(String),

    /// An intermediate value exists but is not a mapping.
    #[error("{0} is not a mapping")]
    NotAMapping(String),
}

fn segments(path: &str) -> Result<Vec<&str>, PathError> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(PathError::EmptySegment(path.to_string()));
    }
    Ok(parts)
}

/// Returns the value at `path`.
pub fn get<'a>(doc: &'a Value, path: &str) -> Result<&'a Value, PathError> {
    let mut current = doc;
    for segment in segments(path)? {
        current = current
            .as_object()
            .and_then(|map| map.get(segment))
            .ok_or_else(|| PathError::NotFound(path.to_string()))?;
    }
    Ok(current)
}

/// Sets the value at `path`, creating intermediate mappings as needed.
///
/// A `null` document or intermediate value is replaced by an empty mapping.
/// Any other non-mapping value on the way is an error and `doc` is left as
/// it was.
pub fn set(doc: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    let parts = segments(path)?;
    let (last, parents) = parts.split_last().ok_or(PathError::Empty)?;

    let mut current = doc;
    for (depth, segment) in parents.iter().enumerate() {
        let map = as_mapping(current, &parts[..depth])?;
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    as_mapping(current, parents)?.insert(last.to_string(), value);
    Ok(())
}

/// Removes the key at `path` and returns its value.
pub fn unset(doc: &mut Value, path: &str) -> Result<Value, PathError> {
    let parts = segments(path)?;
    let (last, parents) = parts.split_last().ok_or(PathError::Empty)?;

    let mut current = doc;
    for segment in parents {
        current = current
            .as_object_mut()
            .and_then(|map| map.get_mut(*segment))
            .ok_or_else(|| PathError::NotFound(path.to_string()))?;
    }
    current
        .as_object_mut()
        .and_then(|map| map.shift_remove(*last))
        .ok_or_else(|| PathError::NotFound(path.to_string()))
}

fn as_mapping<'a>(value: &'a mut Value, at: &[&str]) -> Result<&'a mut Map<String, Value>, PathError> {
    if value.is_null() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => Ok(map),
        _ if at.is_empty() => Err(PathError::NotAMapping("document root".to_string())),
        _ => Err(PathError::NotAMapping(at.join("."))),
    }
}

/// Parses a command-line value as a YAML scalar or flow collection so
/// `true`, `11` and `[1, 2]` keep their types.
///
/// Anything else, including text that only parses as a block mapping or
/// block sequence (`time: 10:30`, `- a`), is taken as a plain string.
pub fn parse_value(raw: &str) -> Value {
    let text = Value::String(raw.to_string());
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return text;
    }
    let flow = trimmed.starts_with('[') || trimmed.starts_with('{');
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Array(_) | Value::Object(_))) if flow => value,
        Ok(Value::Array(_) | Value::Object(_)) | Err(_) => text,
        Ok(scalar) => scalar,
    }
}
