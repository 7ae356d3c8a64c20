//! romfill CLI
//!
//! Fills the gaps a MAME audit report lists by downloading the missing ROM
//! archives, disk images and samples from an authenticated HTTP origin.

mod cli_types;
mod commands;
mod error;
mod format;

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;

/// Print an empty line through the logger so `--quiet` suppresses it too.
pub(crate) fn log_blank() {
    log::info!("");
}

fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).target(env_logger::Target::Stdout);

    if verbose {
        builder.format_timestamp_millis();
    } else {
        // Library chatter stays out of the way of the progress display.
        builder
            .filter_module("romfill_core", LevelFilter::Warn)
            .filter_module("romfill_fetch", LevelFilter::Warn)
            .format(|buf, record| writeln!(buf, "{}", record.args()));
    }

    builder.filter_module("hyper", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Warn);
    builder.parse_default_env();
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Fetch {
            job,
            filter,
            dry_run,
            no_cleanup,
        } => commands::fetch::run_fetch(job, filter, dry_run, no_cleanup, cli.quiet),
        Commands::Parse { report, filter } => {
            commands::parse::run_parse(report, filter).map(|()| ExitCode::SUCCESS)
        }
        Commands::Config { action } => {
            let result = match action {
                ConfigAction::Show => commands::config::run_config_show(),
                ConfigAction::Setup => commands::config::run_config_setup(),
                ConfigAction::Path => commands::config::run_config_path(),
            };
            result.map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
