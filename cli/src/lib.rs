//! qcheck command line: argument parsing, configuration overrides, run wiring.

pub mod app;
pub mod commands;
pub mod error;
