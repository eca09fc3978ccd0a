mod analyze;
mod cli;
mod error_fmt;
mod export;

use std::fs;
use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use plateau_config::{Config, Logging};
use plateau_core::PlateauError;

use crate::analyze::{AnalyzeArgs, run_analyze, run_channels};
use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    color_eyre::install()?;
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;

    match cli.cmd {
        Commands::Analyze {
            inputs,
            out,
            tolerance,
            num_points,
            step_size,
            plateau_threshold,
            explicit,
            plot,
            no_sync,
        } => {
            let args = AnalyzeArgs {
                inputs,
                out,
                tolerance,
                num_points,
                step_size,
                plateau_threshold,
                explicit,
                plot,
                no_sync,
            };
            run_analyze(&cfg, &args)
        }
        Commands::Channels { file } => run_channels(&cfg, &file),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
    let cfg = plateau_config::load_toml(&content)
        .wrap_err_with(|| format!("Failed to parse config file {}", path.display()))?;
    // Same exit code as the equivalent bad command-line value.
    cfg.validate().map_err(|e| {
        PlateauError::InvalidParameter(format!("{} ({e})", path.display()))
    })?;
    Ok(cfg)
}

fn init_tracing(json: bool, level: &str, logging: &Logging) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let console_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    // Logs go to stderr; stdout carries results.
    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
            let appender = match logging.rotation.as_deref().unwrap_or("never") {
                "daily" => tracing_appender::rolling::daily(dir, name),
                "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let file_filter = EnvFilter::try_new(logging.level.as_deref().unwrap_or(level))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_filter(file_filter)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file_layer)
        .try_init()
        .wrap_err("failed to initialize logging")?;
    Ok(())
}
