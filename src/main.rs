// File: main.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use govbid::cli::{Cli, Commands};
use govbid::commands;
use govbid::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    SimpleLogger::new()
        .with_level(cli.level_filter())
        .with_module_level("hyper_util", LevelFilter::Warn)
        .with_module_level("reqwest", LevelFilter::Warn)
        .init()
        .map_err(|e| anyhow!("Failed to initialise logger: {}", e))?;

    let settings = Settings::from_env().context("Failed to load configuration")?;

    match &cli.command {
        Commands::Search(args) => commands::handle_search_command(args, &settings).await,
        Commands::Harvest(args) => commands::handle_harvest_command(args, &settings).await,
        Commands::Compact(args) => commands::handle_compact_command(args, &settings),
    }
}
