// File: mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::Result;
use colored::*;

use crate::cli::{CompactArgs, HarvestArgs, SearchArgs};
use crate::config::Settings;

pub mod compact;
pub mod harvest;
pub mod search;

pub async fn handle_search_command(args: &SearchArgs, settings: &Settings) -> Result<()> {
    search::execute(args, settings).await
}

pub async fn handle_harvest_command(args: &HarvestArgs, settings: &Settings) -> Result<()> {
    harvest::execute(args, settings).await
}

pub fn handle_compact_command(args: &CompactArgs, settings: &Settings) -> Result<()> {
    compact::execute(args, settings)
}

fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

fn format_codes(codes: &[String]) -> String {
    if codes.is_empty() {
        "none".to_string()
    } else {
        codes.join(", ")
    }
}
