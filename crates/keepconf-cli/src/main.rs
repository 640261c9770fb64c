//! `keepconf` entry point.
//!
//! Parses arguments, installs logging and hands off to
//! [`keepconf_cli::app::run`].  Logs go to stderr so stdout only carries the
//! requested values.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use keepconf_cli::app;
use keepconf_cli::cli::Cli;

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    app::run(&cli, &mut stdout.lock())
}
