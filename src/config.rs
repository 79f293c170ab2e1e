// File: config.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::{GovBidError, GovBidResult};

pub const DEFAULT_SAM_BASE_URL: &str = "https://api.sam.gov/prod/opportunities/v2/search";
pub const DEFAULT_CANADA_BUYS_CSV_URL: &str =
    "https://canadabuys.canada.ca/opendata/pub/newTenderNotice-nouvelAvisAppelOffres.csv";

// 541511 custom programming, 541512 systems design, 541519 other computer services
const DEFAULT_TARGET_NAICS: &[&str] = &["541511", "541512", "541519"];
// DA01 application development support (labor), DA10 application development SaaS
const DEFAULT_TARGET_PSCS: &[&str] = &["DA01", "DA10"];
// 8111 computer services
const DEFAULT_UNSPSC_PREFIXES: &[&str] = &["8111"];

/// Runtime settings, sourced from the environment (and an optional `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    sam_api_key: String,
    target_naics: Vec<String>,
    target_pscs: Vec<String>,
    sam_base_url: String,
    canada_buys_csv_url: String,
    target_unspsc_prefixes: Vec<String>,
    raw_data_dir: PathBuf,
    sam_raw_data_dir: PathBuf,
    sam_history_file: PathBuf,
    retention_days: u32,
    request_timeout: u64,
    harvest_interval: u64,
}

impl Settings {
    pub fn new(sam_api_key: impl Into<String>) -> Self {
        Self {
            sam_api_key: sam_api_key.into(),
            target_naics: to_owned_list(DEFAULT_TARGET_NAICS),
            target_pscs: to_owned_list(DEFAULT_TARGET_PSCS),
            sam_base_url: DEFAULT_SAM_BASE_URL.to_string(),
            canada_buys_csv_url: DEFAULT_CANADA_BUYS_CSV_URL.to_string(),
            target_unspsc_prefixes: to_owned_list(DEFAULT_UNSPSC_PREFIXES),
            raw_data_dir: PathBuf::from("data/canada_buys_raw"),
            sam_raw_data_dir: PathBuf::from("data/sam_gov_raw"),
            sam_history_file: PathBuf::from("data/sam_history.jsonl"),
            retention_days: 60,
            request_timeout: 30,
            harvest_interval: 7200,
        }
    }

    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> GovBidResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> GovBidResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("SAM_API_KEY")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| GovBidError::Config("SAM_API_KEY is required".to_string()))?;

        let mut settings = Self::new(api_key);

        if let Some(raw) = lookup("TARGET_NAICS") {
            settings.target_naics = parse_list(&raw);
        }
        if let Some(raw) = lookup("TARGET_PSCS") {
            settings.target_pscs = parse_list(&raw);
        }
        if let Some(raw) = lookup("TARGET_UNSPSC_PREFIXES") {
            settings.target_unspsc_prefixes = parse_list(&raw);
        }
        if let Some(url) = lookup("SAM_BASE_URL") {
            settings.sam_base_url = url;
        }
        if let Some(url) = lookup("CANADA_BUYS_CSV_URL") {
            settings.canada_buys_csv_url = url;
        }
        if let Some(dir) = lookup("RAW_DATA_DIR") {
            settings.raw_data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("SAM_RAW_DATA_DIR") {
            settings.sam_raw_data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("SAM_HISTORY_FILE") {
            settings.sam_history_file = PathBuf::from(file);
        }
        if let Some(raw) = lookup("RETENTION_DAYS") {
            settings.retention_days = parse_number("RETENTION_DAYS", &raw)?;
        }
        if let Some(raw) = lookup("REQUEST_TIMEOUT_SECS") {
            settings.request_timeout = parse_number("REQUEST_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = lookup("HARVEST_INTERVAL_SECS") {
            settings.harvest_interval = parse_number("HARVEST_INTERVAL_SECS", &raw)?;
        }

        Ok(settings)
    }

    pub fn sam_api_key(&self) -> &str {
        &self.sam_api_key
    }

    pub fn target_naics(&self) -> &[String] {
        &self.target_naics
    }

    pub fn set_target_naics(&mut self, codes: Vec<String>) {
        self.target_naics = codes;
    }

    pub fn target_pscs(&self) -> &[String] {
        &self.target_pscs
    }

    pub fn set_target_pscs(&mut self, codes: Vec<String>) {
        self.target_pscs = codes;
    }

    pub fn sam_base_url(&self) -> &str {
        &self.sam_base_url
    }

    pub fn set_sam_base_url(&mut self, url: impl Into<String>) {
        self.sam_base_url = url.into();
    }

    pub fn canada_buys_csv_url(&self) -> &str {
        &self.canada_buys_csv_url
    }

    pub fn set_canada_buys_csv_url(&mut self, url: impl Into<String>) {
        self.canada_buys_csv_url = url.into();
    }

    pub fn target_unspsc_prefixes(&self) -> &[String] {
        &self.target_unspsc_prefixes
    }

    pub fn set_target_unspsc_prefixes(&mut self, prefixes: Vec<String>) {
        self.target_unspsc_prefixes = prefixes;
    }

    pub fn raw_data_dir(&self) -> &Path {
        &self.raw_data_dir
    }

    pub fn set_raw_data_dir(&mut self, dir: impl Into<PathBuf>) {
        self.raw_data_dir = dir.into();
    }

    pub fn sam_raw_data_dir(&self) -> &Path {
        &self.sam_raw_data_dir
    }

    pub fn set_sam_raw_data_dir(&mut self, dir: impl Into<PathBuf>) {
        self.sam_raw_data_dir = dir.into();
    }

    pub fn sam_history_file(&self) -> &Path {
        &self.sam_history_file
    }

    pub fn set_sam_history_file(&mut self, file: impl Into<PathBuf>) {
        self.sam_history_file = file.into();
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    pub fn set_retention_days(&mut self, days: u32) {
        self.retention_days = days;
    }

    /// Per-request network timeout in seconds.
    pub fn request_timeout(&self) -> u64 {
        self.request_timeout
    }

    pub fn set_request_timeout(&mut self, timeout: u64) {
        self.request_timeout = timeout;
    }

    /// Poll interval of the harvester loop in seconds.
    pub fn harvest_interval(&self) -> u64 {
        self.harvest_interval
    }

    pub fn set_harvest_interval(&mut self, interval: u64) {
        self.harvest_interval = interval;
    }
}

fn to_owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Accepts a JSON array (`["a","b"]`) or a comma-separated list.
pub(crate) fn parse_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        if let Ok(values) = serde_json::from_str::<Vec<String>>(trimmed) {
            return values;
        }
    }
    trimmed
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> GovBidResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| GovBidError::Config(format!("{} must be a number, got '{}'", key, raw)))
}
