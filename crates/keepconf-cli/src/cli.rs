//! Command-line arguments for `keepconf`.
//!
//! Every option can also be supplied through a `KEEPCONF_*` environment
//! variable; explicit flags win.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keepconf_core::{Format, DEFAULT_CONFIG_FILE};

/// Inspect and edit a config file with rollback-safe writes.
#[derive(Debug, Parser)]
#[command(name = "keepconf", version, about)]
pub struct Cli {
    /// Config file to operate on.
    #[arg(short, long, env = "KEEPCONF_FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub file: PathBuf,

    /// File format (yaml, json or toml).  Defaults to the file extension.
    #[arg(long, env = "KEEPCONF_FORMAT")]
    pub format: Option<Format>,

    /// Indentation width for JSON output; 0 writes compact JSON.
    #[arg(long, env = "KEEPCONF_INDENT", default_value_t = 2)]
    pub indent: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the whole document.
    Show,
    /// Print the value at a dotted key path (e.g. `network.port`).
    Get { path: String },
    /// Set the value at a dotted key path.  The value is parsed as YAML, so
    /// `true`, `11` and `[1, 2]` keep their types.
    Set { path: String, value: String },
    /// Remove the key at a dotted key path.
    Unset { path: String },
    /// Create the file with an empty document if it does not exist.
    Init,
}

impl Cli {
    /// The explicit `--format`, else the one implied by the file extension,
    /// else YAML.
    pub fn resolved_format(&self) -> Format {
        self.format
            .or_else(|| Format::from_extension(&self.file))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["keepconf", "show"]).unwrap();

        assert_eq!(cli.file, PathBuf::from("config.yaml"));
        assert_eq!(cli.indent, 2);
        assert_eq!(cli.command, Command::Show);
        assert_eq!(cli.resolved_format(), Format::Yaml);
    }

    #[test]
    fn test_format_follows_extension_unless_overridden() {
        let by_ext = Cli::try_parse_from(["keepconf", "-f", "app.toml", "show"]).unwrap();
        let forced =
            Cli::try_parse_from(["keepconf", "-f", "app.toml", "--format", "json", "show"]).unwrap();

        assert_eq!(by_ext.resolved_format(), Format::Toml);
        assert_eq!(forced.resolved_format(), Format::Json);
    }

    #[test]
    fn test_set_takes_path_and_value() {
        let cli = Cli::try_parse_from(["keepconf", "set", "sub.key2", "11"]).unwrap();

        assert_eq!(
            cli.command,
            Command::Set {
                path: "sub.key2".to_string(),
                value: "11".to_string(),
            }
        );
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["keepconf", "--format", "xml", "show"]).is_err());
    }
}
