#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! `repcount` binary: run a counting session, self-check a config, or
//! inspect the device profile.

mod cli;
mod error_fmt;
mod render;
mod run;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::WrapErr;
use repcount_core::error::RepError;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::run::RunOptions;

fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("warning: failed to install error reporter: {e}");
    }
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        tracing::debug!(error = ?err, "command failed");
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

    match cli.cmd {
        Commands::Run {
            source,
            trace,
            frames,
            fps,
            trigger,
            window,
            volume,
            quiet,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = shutdown.clone();
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install Ctrl-C handler")?;

            let opts = RunOptions {
                source,
                trace,
                frames,
                fps,
                trigger,
                window,
                volume,
                quiet,
            };
            let summary = run::run_session(&cfg, &opts, cli.json, shutdown)?;
            if cli.json {
                println!("{}", run::summary_json(&summary));
            } else {
                println!("{}", run::summary_text(&summary));
            }
        }
        Commands::SelfCheck => {
            run::self_check(&cfg)?;
            if cli.json {
                println!("{}", serde_json::json!({ "status": "ok" }));
            } else {
                println!("OK");
            }
        }
        Commands::Device { gpu, mobile } => {
            let (profile, model) = run::device_report(gpu, mobile);
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "cores": profile.cores,
                        "memory_gib": profile.memory_gib,
                        "gpu": profile.gpu,
                        "mobile": profile.mobile,
                        "class": format!("{:?}", profile.class()),
                        "model": model.name(),
                    })
                );
            } else {
                println!(
                    "cores={} memory={}GiB gpu={} mobile={} class={:?} model={}",
                    profile.cores,
                    profile.memory_gib,
                    profile.gpu,
                    profile.mobile,
                    profile.class(),
                    model
                );
            }
        }
    }
    Ok(())
}

/// Read, parse and validate the config; built-in defaults without a path.
fn load_config(path: Option<&Path>) -> eyre::Result<repcount_config::Config> {
    let cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).map_err(|e| {
                eyre::Report::new(RepError::Config(format!("read config {}: {e}", p.display())))
            })?;
            repcount_config::load_toml(&text).map_err(|e| {
                eyre::Report::new(RepError::Config(format!("parse {}: {e}", p.display())))
            })?
        }
        None => repcount_config::Config::default(),
    };
    cfg.validate()
        .map_err(|e| eyre::Report::new(RepError::Config(e.to_string())))?;
    Ok(cfg)
}

fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &repcount_config::Logging,
) -> eyre::Result<()> {
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    let level = cli_level.or(logging.level.as_deref()).unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| eyre::Report::new(RepError::Config(format!("invalid log level {level:?}: {e}"))))?;

    // Console logs go to stderr so stdout carries only frames and summaries.
    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).with_target(false).boxed()
    };

    let file = match &logging.file {
        Some(file) => {
            use tracing_appender::rolling::{RollingFileAppender, Rotation};
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path.file_name().ok_or_else(|| {
                eyre::Report::new(RepError::Config(format!("logging.file {file:?} has no file name")))
            })?;
            let rotation = match logging.rotation.as_deref() {
                Some("daily") => Rotation::DAILY,
                Some("hourly") => Rotation::HOURLY,
                _ => Rotation::NEVER,
            };
            let (writer, guard) =
                tracing_appender::non_blocking(RollingFileAppender::new(rotation, dir, name));
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))
}
