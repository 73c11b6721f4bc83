//! easyindex CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, reports errors as a JSON
//! line on stdout plus a plain line on stderr, and exits non-zero on failure.

use easyindex::cli;

fn main() {
    if let Err(e) = cli::run() {
        let _ = cli::write_error(e.code_str(), e.message());
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
