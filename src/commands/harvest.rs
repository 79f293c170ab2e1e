// File: harvest.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{bail, Context, Result};
use colored::*;
use std::time::Duration;

use super::{print_error, print_info, print_success};
use crate::cli::HarvestArgs;
use crate::config::Settings;
use crate::errors::GovBidResult;
use crate::harvester::Harvester;
use crate::models::Notice;

pub async fn execute(args: &HarvestArgs, settings: &Settings) -> Result<()> {
    let settings = settings.clone();
    let once = args.once;
    let interval = Duration::from_secs(args.interval.unwrap_or(settings.harvest_interval()));

    // blocking client: keep it, and its drop, off the async workers
    let outcome = tokio::task::spawn_blocking(move || -> GovBidResult<Option<Vec<Notice>>> {
        let harvester = Harvester::from_settings(&settings)?;
        if once {
            Ok(harvester.run_cycle())
        } else {
            harvester.run_forever(interval)
        }
    })
    .await
    .context("Harvester task failed")??;

    let Some(notices) = outcome else {
        print_error("Failed to fetch notices.");
        bail!("Canada Buys feed could not be fetched");
    };

    if notices.is_empty() {
        print_info("No matching tender notices in the current feed.");
        return Ok(());
    }

    print_success(&format!("Found {} matching tender notices", notices.len()));
    println!();
    for notice in &notices {
        println!("  {}", notice.title().unwrap_or("No Title").bold());
        println!("    UNSPSC: {}", notice.unspsc().unwrap_or_default().replace('\n', " "));
        println!("    {}", notice.notice_url().unwrap_or("No URL").cyan());
    }
    Ok(())
}
