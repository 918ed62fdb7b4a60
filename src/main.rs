//! `tabclean` command-line entry point.
//!
//! ```bash
//! tabclean run                          # every file in the data directory
//! tabclean run --source sales.csv --steps remove_duplicates,fill_missing_values
//! tabclean validate --data-dir ./incoming
//! tabclean metrics --json
//! ```

#![expect(clippy::print_stdout)]

mod cli;

use anyhow::Result;
use clap::Parser as _;

#[expect(clippy::print_stderr)]
fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    if let Err(e) = tabclean::logging::init() {
        eprintln!("Logging disabled: {e:#}");
    }

    cli::run_command(cli.command)
}
