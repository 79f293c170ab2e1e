// File: history.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::errors::GovBidResult;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One line of the history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "noticeId")]
    pub notice_id: String,
    pub timestamp: f64,
}

impl HistoryEntry {
    pub fn now(notice_id: impl Into<String>) -> Self {
        Self {
            notice_id: notice_id.into(),
            timestamp: unix_now(),
        }
    }
}

#[derive(Deserialize)]
struct SeenLine {
    #[serde(rename = "noticeId")]
    notice_id: String,
}

#[derive(Deserialize)]
struct TimestampLine {
    #[serde(default)]
    timestamp: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Compaction {
    pub kept: usize,
    pub removed: usize,
}

/// Append-only JSON-lines log of notice ids already reported.
///
/// The log does no locking of its own: appends must be sequenced by the
/// caller, and only one process may use a given file.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    /// Opens the log at `path`, creating its parent directory if needed.
    pub fn new(path: impl Into<PathBuf>) -> GovBidResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every id that appears on a parsable line. Malformed lines are skipped.
    pub fn load_seen(&self) -> GovBidResult<HashSet<String>> {
        let Some(content) = self.read()? else {
            return Ok(HashSet::new());
        };

        Ok(content
            .lines()
            .filter_map(|line| serde_json::from_str::<SeenLine>(line).ok())
            .map(|entry| entry.notice_id)
            .collect())
    }

    pub fn mark_seen(&self, notice_id: &str) -> GovBidResult<()> {
        let mut line = serde_json::to_string(&HistoryEntry::now(notice_id))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    /// Drops entries older than `retention_days`.
    pub fn compact(&self, retention_days: u32) -> GovBidResult<Compaction> {
        let cutoff = unix_now() - f64::from(retention_days) * SECONDS_PER_DAY;
        self.compact_before(cutoff)
    }

    /// Rewrites the log keeping lines whose timestamp is `>= cutoff`, copied
    /// verbatim. The new content replaces the file atomically.
    pub fn compact_before(&self, cutoff: f64) -> GovBidResult<Compaction> {
        let Some(content) = self.read()? else {
            return Ok(Compaction::default());
        };

        let mut stats = Compaction::default();
        let mut kept = String::with_capacity(content.len());
        for line in content.lines() {
            let Ok(entry) = serde_json::from_str::<TimestampLine>(line) else {
                continue;
            };
            if entry.timestamp >= cutoff {
                kept.push_str(line);
                kept.push('\n');
                stats.kept += 1;
            } else {
                stats.removed += 1;
            }
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(kept.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        if stats.removed > 0 {
            info!(
                "Cleaned up history: Removed {} old entries, kept {}.",
                stats.removed, stats.kept
            );
        }
        Ok(stats)
    }

    // Lossy so that a torn write cannot make the whole log unreadable.
    fn read(&self) -> GovBidResult<Option<String>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Seconds since the Unix epoch with microsecond precision.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
