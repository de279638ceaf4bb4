//! `colis` command-line front end.
//!
//! # Responsibility
//! - Parse flags, bootstrap logging and the database, dispatch one command.
//! - Map every failure to a single stderr line and exit code 1.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use cli::Cli;
use colis_core::{default_log_level, init_logging, open_db};
use error::{CliError, CliResult};
use log::error;
use output::OutputMode;
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error!("event=cli_command module=cli status=error error={err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &absolute_dir(log_dir)?)?;
    }

    let conn = open_db(&cli.db)?;
    commands::run(&conn, cli.command, OutputMode::from_flag(cli.json))
}

fn absolute_dir(path: &Path) -> CliResult<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    absolute
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("log directory `{}` is not valid UTF-8", absolute.display()),
            ))
        })
}
