// File: search.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{Context, Result};
use colored::*;

use super::{format_codes, print_info, print_success};
use crate::cli::SearchArgs;
use crate::config::Settings;
use crate::models::Opportunity;
use crate::search::SamClient;

pub async fn execute(args: &SearchArgs, settings: &Settings) -> Result<()> {
    let range = args.date_range()?;
    let (naics, pscs) = args.codes(settings);

    if !args.json {
        print_info(&format!("Target NAICS codes: {}", format_codes(&naics)));
        print_info(&format!("Target PSC codes: {}", format_codes(&pscs)));
        print_info(&format!(
            "Searching opportunities from {} to {}...",
            range.from, range.to
        ));
    }

    let client = SamClient::from_settings(settings)
        .context("Failed to set up SAM.gov client")?
        .with_page_size(args.limit);

    let opportunities = client.search(range, &naics, &pscs).await;

    if args.json {
        for opportunity in &opportunities {
            println!("{}", serde_json::to_string(opportunity)?);
        }
        return Ok(());
    }

    if opportunities.is_empty() {
        print_info("No new opportunities found for the specified criteria.");
        return Ok(());
    }

    print_success(&format!("Found {} new opportunities", opportunities.len()));
    println!();
    for opportunity in &opportunities {
        print_opportunity(opportunity);
    }

    Ok(())
}

fn print_opportunity(opportunity: &Opportunity) {
    println!(
        "  {} {}",
        format!("[{}]", opportunity.notice_id).bright_black(),
        opportunity.title.bold()
    );
    if let Some(department) = &opportunity.department {
        println!("    {}", department);
    }
    if let Some(deadline) = &opportunity.response_deadline {
        println!("    Deadline: {}", deadline.yellow());
    }
    if let Some(link) = &opportunity.ui_link {
        println!("    {}", link.cyan());
    }
}
