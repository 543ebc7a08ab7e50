//! nlib CLI
//!
//! One-shot sync commands, the scheduler daemon, and catalog inspection.

mod cli_types;
mod commands;
mod error;

use std::io::Write;

use clap::Parser;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = run(&cli);
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let ctx = commands::Context::load(cli)?;

    match &cli.command {
        Commands::Sync { target } => commands::sync::run_sync(&ctx, *target),
        Commands::Daemon => commands::daemon::run_daemon(&ctx),
        Commands::Status => commands::status::run_status(&ctx),
        Commands::Log { limit } => commands::status::run_log(&ctx, *limit),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&ctx),
            ConfigAction::Path => commands::config::run_config_path(&ctx),
            ConfigAction::Init { force } => commands::config::run_config_init(&ctx, *force),
        },
    }
}

/// Plain messages by default; timestamps and module targets with `--verbose`.
/// `RUST_LOG` overrides the level either way.
fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if !verbose {
        builder.format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "{}: {}", level, record.args()),
        });
    }

    builder.init();
}

/// Emit an empty log line.
pub(crate) fn log_blank() {
    log::info!("");
}
