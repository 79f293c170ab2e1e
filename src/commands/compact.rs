// File: compact.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{Context, Result};

use super::{print_info, print_success, print_warning};
use crate::archive::Archive;
use crate::cli::CompactArgs;
use crate::config::Settings;
use crate::history::HistoryLog;

pub fn execute(args: &CompactArgs, settings: &Settings) -> Result<()> {
    let days = args.days.unwrap_or(settings.retention_days());
    print_info(&format!("Removing data older than {} days", days));

    let history = HistoryLog::new(settings.sam_history_file())
        .context("Failed to open history log")?;
    let stats = history
        .compact(days)
        .with_context(|| format!("Failed to compact {}", history.path().display()))?;
    print_success(&format!(
        "History compacted: removed {} entries, kept {}",
        stats.removed, stats.kept
    ));

    let archives = [
        Archive::sam(settings.sam_raw_data_dir()),
        Archive::canada_buys(settings.raw_data_dir()),
    ];
    for archive in &archives {
        match archive.cleanup(days) {
            Ok(0) => print_info(&format!("No expired files in {}", archive.dir().display())),
            Ok(removed) => print_success(&format!(
                "Deleted {} old files from {}",
                removed,
                archive.dir().display()
            )),
            Err(e) => print_warning(&format!(
                "Cleanup of {} failed: {}",
                archive.dir().display(),
                e
            )),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_compact_command_rewrites_history() {
        let temp_dir = TempDir::new().unwrap();
        let history_file = temp_dir.path().join("history.jsonl");
        fs::write(
            &history_file,
            "{\"noticeId\":\"old\",\"timestamp\":1000.0}\nnot json\n",
        )
        .unwrap();

        let mut settings = Settings::new("key");
        settings.set_sam_history_file(&history_file);
        settings.set_sam_raw_data_dir(temp_dir.path().join("sam"));
        settings.set_raw_data_dir(temp_dir.path().join("csv"));

        execute(&CompactArgs { days: Some(30) }, &settings).unwrap();

        assert_eq!(fs::read_to_string(&history_file).unwrap(), "");
    }
}
