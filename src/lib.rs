pub mod types;
pub mod error;
pub mod config;
pub mod seeding;
pub mod bracket;
pub mod advance;
pub mod document;
pub mod commands;
pub mod command_line;

pub use advance::{advance_winner, ready_matches, reset_match, set_scores, with_winner};
pub use bracket::{create_bracket, BracketBuilder};
pub use error::BracketError;
pub use seeding::generate_seed_order;
pub use types::*;

use clap::Parser;
use command_line::{Args, Command};
use config::*;
use std::fs;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

// ── Logging ────────────────────────────────────────────────────────────

/// Logs go to a daily file under `log_dir` when one is configured, stderr
/// otherwise. Keep the returned guard alive until exit.
fn init_tracing(config: &AppConfig, debug: bool) -> Option<WorkerGuard> {
    let level = if debug { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if config.log_dir.trim().is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let logs_dir = resolve_repo_path(&config.log_dir);
    fs::create_dir_all(&logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "bracket.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    Some(guard)
}

// ── Entry point ────────────────────────────────────────────────────────

pub fn run() -> Result<(), String> {
    load_env_file();
    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => load_config_from(path)?,
        None => load_config_inner()?,
    };
    let _guard = init_tracing(&config, args.debug);
    info!("bracket-engine starting");
    log_config_warnings(&config);

    let result = dispatch(&config, args.command);
    if let Err(e) = &result {
        error!("{e}");
    }
    result
}

fn dispatch(config: &AppConfig, command: Command) -> Result<(), String> {
    match command {
        Command::Seeds { size } => {
            println!("{}", commands::seeds_command(size));
        }
        Command::Create { name, created_by, description, out, participants } => {
            let doc = commands::create_command(
                config,
                &name,
                created_by.as_deref(),
                description.as_deref(),
                &participants,
            )?;
            match out {
                Some(path) => {
                    commands::write_document(&path, &doc, config)?;
                    info!("wrote {}", path.display());
                }
                None => println!("{}", commands::render_document(&doc, config)?),
            }
        }
        Command::Advance { file, match_id, winner, score1, score2, dry_run } => {
            let doc = commands::advance_command(config, &file, &match_id, &winner, score1, score2, dry_run)?;
            print!("{}", commands::show_command(&doc));
        }
        Command::Reset { file, match_id, dry_run } => {
            let doc = commands::reset_command(config, &file, &match_id, dry_run)?;
            print!("{}", commands::show_command(&doc));
        }
        Command::Show { file } => {
            let doc = commands::read_document(&file)?;
            print!("{}", commands::show_command(&doc));
        }
    }
    Ok(())
}
