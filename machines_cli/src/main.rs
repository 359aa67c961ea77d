mod cli;
mod commands;
mod error_fmt;
mod logging;

use clap::Parser;
use machines_core::ApiSettings;

use crate::cli::{Cli, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let mut guard = None;
    let code = match run(&cli, &mut guard) {
        Ok(()) => 0,
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            if cli.json {
                println!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    // Flush the file writer before exiting.
    drop(guard);
    std::process::exit(code);
}

fn run(
    cli: &Cli,
    guard: &mut Option<tracing_appender::non_blocking::WorkerGuard>,
) -> eyre::Result<()> {
    let mut cfg = machines_config::load_file(&cli.config)?;
    if let Some(url) = &cli.backend_url {
        cfg.api.backend_url = url.clone();
    }
    cfg.validate()
        .map_err(|e| eyre::eyre!("invalid configuration in {}: {e}", cli.config.display()))?;

    let level = cli
        .log_level
        .as_deref()
        .or(cfg.logging.level.as_deref())
        .unwrap_or("warn");
    *guard = logging::init(level, cli.json, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), sim = cli.sim, "starting");

    let settings = ApiSettings::from(&cfg.api);
    let mut ctx = commands::Context::new(settings, cli.sim, &cfg.session.token_file)?;
    commands::run(&mut ctx, &cli.cmd)
}
