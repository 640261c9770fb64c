//! Command runner for `keepconf`.
//!
//! Each subcommand loads the file into a `Config<serde_json::Value>` and,
//! for edits, applies the change inside [`Config::transaction`] so a failed
//! edit leaves both the file and the in-memory document untouched.

use std::io::Write;

use anyhow::{Context, Result};
use keepconf_core::{Config, FileStorage, Format, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::cli::{Cli, Command};
use crate::document;

/// Runs the parsed command, writing user-facing output to `out`.
///
/// # Errors
///
/// Returns an error when the file cannot be read, decoded or written, or
/// when the key path is invalid for the requested edit.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let format = cli.resolved_format();
    debug!(file = %cli.file.display(), %format, "opening config");

    let config = Config::new(
        Value::Object(Map::new()),
        FileStorage::new(&cli.file),
        format.serializer::<Value>(cli.indent),
    );

    if cli.command != Command::Init {
        config
            .load()
            .with_context(|| format!("failed to load {}", cli.file.display()))?;
    }

    match &cli.command {
        Command::Init if cli.file.exists() => {
            info!(file = %cli.file.display(), "config already exists");
        }
        Command::Init => {
            config
                .save()
                .with_context(|| format!("failed to create {}", cli.file.display()))?;
        }
        Command::Show => {
            let text = config.read(|doc| render(doc, format, cli.indent))?;
            write_line(out, &text)?;
        }
        Command::Get { path } => {
            let text = config.read(|doc| -> Result<String> {
                let value = document::get(doc, path)?;
                render(value, format, cli.indent)
            })?;
            write_line(out, &text)?;
        }
        Command::Set { path, value } => {
            let value = document::parse_value(value);
            config
                .transaction(|doc| document::set(doc, path, value))
                .with_context(|| format!("failed to set {path}"))?;
            info!(%path, "value set");
        }
        Command::Unset { path } => {
            config
                .transaction(|doc| document::unset(doc, path).map(drop))
                .with_context(|| format!("failed to unset {path}"))?;
            info!(%path, "value removed");
        }
    }
    Ok(())
}

/// Scalars print bare; composites print in the file's format, falling back
/// to JSON when the format cannot represent them (e.g. a TOML array).
fn render(value: &Value, format: Format, indent: usize) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.to_string()),
        Value::Array(_) | Value::Object(_) => {
            let bytes = match format.serializer::<Value>(indent).serialize_data(value) {
                Ok(bytes) => bytes,
                Err(err) => {
                    debug!(%err, "falling back to JSON output");
                    Format::Json.serializer::<Value>(indent).serialize_data(value)?
                }
            };
            String::from_utf8(bytes).context("rendered config is not UTF-8")
        }
    }
}

fn write_line(out: &mut impl Write, text: &str) -> Result<()> {
    if text.ends_with('\n') {
        out.write_all(text.as_bytes())?;
    } else {
        writeln!(out, "{text}")?;
    }
    Ok(())
}
