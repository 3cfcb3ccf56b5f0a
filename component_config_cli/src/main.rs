//! CLI entrypoint for `compose`.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use component_config_cli::cli::Args;
use component_config_cli::commands;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let mut stdout = io::stdout().lock();
    match commands::run(&args, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "compose failed");
            let _ignored = writeln!(io::stderr(), "error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
