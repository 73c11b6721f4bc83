//! CLI module for easyindex
//!
//! Provides command-line inspection of saved stores:
//! - inspect: print matching records
//! - schema: print column domains

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{inspect, parse_filter, run, run_cli, run_command, schema};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
