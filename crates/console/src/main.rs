use std::process::ExitCode;

use clap::Parser;
use console::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::start(cli)
}
