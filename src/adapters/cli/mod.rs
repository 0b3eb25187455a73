//! CLI Adapter
//!
//! Command-line interface for the Bags Index service.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    execute, render_details, render_table, CliApp, Command, DetailsCmd, ScanCmd, ServeCmd,
};
