//! CLI module for synthloop - command-line interface and report output.

pub mod commands;
pub mod report;

pub use commands::Cli;
