//! keepconf-cli library entry point.
//!
//! Holds the argument model, the key-path document helpers and the command
//! runner so that unit tests and the `keepconf` binary share the same code.

pub mod app;
pub mod cli;
pub mod document;
