mod app;
mod classify;
mod cli;
mod commands;
mod config;
mod geometry;
mod logging;
mod model;
mod scene;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;
use logging::LogTarget;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    let config = config::Config::load()?;

    let target = match args.log.as_deref().or(config.log.as_deref()) {
        Some(raw) => LogTarget::parse(raw),
        None if matches!(command, cli::Command::Tui) => config::default_log_path()
            .map(LogTarget::File)
            .unwrap_or(LogTarget::Off),
        None => LogTarget::Stderr,
    };
    logging::init_or_off(target, args.verbose);

    let session = commands::Session::new(config, args.file, args.no_save, args.mapping);
    match command {
        cli::Command::Tui => commands::tui(session),
        cli::Command::Add {
            text,
            urgent,
            important,
        } => commands::add(&session, text, urgent, important),
        cli::Command::List { category } => commands::list(&session, category),
        cli::Command::Toggle { category, index } => commands::toggle(&session, category, index),
        cli::Command::Clear => commands::clear(&session),
        cli::Command::Path => commands::path(&session),
    }
}
