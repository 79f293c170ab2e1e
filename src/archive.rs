// File: archive.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use chrono::Local;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::errors::GovBidResult;

const SECONDS_PER_DAY: u64 = 86_400;

/// A directory of raw response bodies named `<prefix>_<timestamp>.<extension>`.
#[derive(Debug, Clone)]
pub struct Archive {
    dir: PathBuf,
    prefix: String,
    extension: String,
}

impl Archive {
    pub fn new(dir: impl Into<PathBuf>, prefix: &str, extension: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.to_string(),
            extension: extension.to_string(),
        }
    }

    /// Archive for SAM.gov search pages.
    pub fn sam(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, "sam_opps", "json")
    }

    /// Archive for Canada Buys CSV downloads.
    pub fn canada_buys(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, "canada_buys_tenders", "csv")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, content: &str) -> GovBidResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S_%6f");
        let path = self
            .dir
            .join(format!("{}_{}.{}", self.prefix, timestamp, self.extension));
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Deletes regular files last modified more than `retention_days` ago and
    /// returns how many were removed. A missing directory removes nothing.
    pub fn cleanup(&self, retention_days: u32) -> GovBidResult<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let max_age = Duration::from_secs(u64::from(retention_days) * SECONDS_PER_DAY);
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            if metadata.modified()? >= cutoff {
                continue;
            }

            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!("Deleted old archive file: {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Error deleting {}: {}", path.display(), e),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn age_file(path: &Path, days: u64) {
        let file = File::options().write(true).open(path).unwrap();
        let past = SystemTime::now() - Duration::from_secs(days * SECONDS_PER_DAY);
        file.set_modified(past).unwrap();
    }

    #[test]
    fn test_save_writes_verbatim_body() {
        let temp_dir = TempDir::new().unwrap();
        let archive = Archive::sam(temp_dir.path().join("raw"));

        let path = archive.save(r#"{"opportunitiesData":[]}"#).unwrap();

        assert!(path.starts_with(temp_dir.path().join("raw")));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("sam_opps_"));
        assert!(name.ends_with(".json"));
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"opportunitiesData":[]}"#);
    }

    #[test]
    fn test_consecutive_saves_do_not_collide() {
        let temp_dir = TempDir::new().unwrap();
        let archive = Archive::canada_buys(temp_dir.path());

        let first = archive.save("a").unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let second = archive.save("b").unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_cleanup_removes_only_expired_files() {
        let temp_dir = TempDir::new().unwrap();
        let archive = Archive::sam(temp_dir.path());

        let fresh = archive.save("fresh").unwrap();
        let stale = temp_dir.path().join("sam_opps_old.json");
        fs::write(&stale, "stale").unwrap();
        age_file(&stale, 61);
        fs::create_dir(temp_dir.path().join("nested")).unwrap();

        let removed = archive.cleanup(60).unwrap();

        assert_eq!(removed, 1);
        assert!(fresh.exists());
        assert!(!stale.exists());
        assert!(temp_dir.path().join("nested").exists());
    }

    #[test]
    fn test_cleanup_missing_directory_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let archive = Archive::sam(temp_dir.path().join("does-not-exist"));
        assert_eq!(archive.cleanup(60).unwrap(), 0);
    }
}
