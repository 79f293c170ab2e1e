// File: harvester.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use log::{error, info, warn};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;

use crate::archive::Archive;
use crate::config::Settings;
use crate::errors::GovBidResult;
use crate::models::Notice;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Polls the Canada Buys "New Tender Notices" CSV feed.
///
/// Uses a blocking client; from async code run it on a blocking thread.
#[derive(Debug)]
pub struct Harvester {
    client: Client,
    csv_url: String,
    prefixes: Vec<String>,
    archive: Archive,
    retention_days: u32,
}

impl Harvester {
    pub fn new(
        csv_url: impl Into<String>,
        prefixes: Vec<String>,
        archive: Archive,
        timeout: Duration,
    ) -> GovBidResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            csv_url: csv_url.into(),
            prefixes,
            archive,
            retention_days: 60,
        })
    }

    pub fn from_settings(settings: &Settings) -> GovBidResult<Self> {
        Ok(Self::new(
            settings.canada_buys_csv_url(),
            settings.target_unspsc_prefixes().to_vec(),
            Archive::canada_buys(settings.raw_data_dir()),
            Duration::from_secs(settings.request_timeout()),
        )?
        .with_retention_days(settings.retention_days()))
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Downloads the feed. Any failure is logged and yields `None`.
    pub fn fetch(&self) -> Option<String> {
        let response = match self.client.get(&self.csv_url).header(ACCEPT, "*/*").send() {
            Ok(response) => response,
            Err(e) => {
                error!("Error fetching Canada Buys CSV: {}", e);
                return None;
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                error!("Error fetching Canada Buys CSV: {}", e);
                return None;
            }
        };

        let bytes = match response.bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Error reading Canada Buys CSV body: {}", e);
                return None;
            }
        };

        match decode_body(&bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                error!("Canada Buys CSV is not valid UTF-8: {}", e);
                None
            }
        }
    }

    /// Parses CSV text into notices; a malformed document yields nothing.
    pub fn parse(content: &str) -> Vec<Notice> {
        match parse_notices(content) {
            Ok(notices) => notices,
            Err(e) => {
                error!("Error parsing CSV content: {}", e);
                Vec::new()
            }
        }
    }

    pub fn filter(&self, notices: Vec<Notice>) -> Vec<Notice> {
        filter_notices(notices, &self.prefixes)
    }

    /// cleanup, fetch, archive, parse, filter and report. Returns the
    /// matching notices, or `None` when the feed could not be fetched.
    pub fn run_cycle(&self) -> Option<Vec<Notice>> {
        info!("Starting cycle...");

        if let Err(e) = self.archive.cleanup(self.retention_days) {
            error!("Error during cleanup of old files: {}", e);
        }

        let Some(content) = self.fetch() else {
            warn!("Failed to fetch notices.");
            return None;
        };

        match self.archive.save(&content) {
            Ok(path) => info!("Archived raw CSV to: {}", path.display()),
            Err(e) => error!("Failed to archive raw CSV: {}", e),
        }

        let notices = Self::parse(&content);
        info!("Fetched {} notices.", notices.len());

        let matches = self.filter(notices);
        info!("Found {} software engineering opportunities.", matches.len());
        report(&matches);

        Some(matches)
    }

    pub fn run_forever(&self, interval: Duration) -> ! {
        info!(
            "Starting Canada Buys Harvester. Polling every {} seconds.",
            interval.as_secs()
        );
        info!(
            "Archiving to {} (Retention: {} days)",
            self.archive.dir().display(),
            self.retention_days
        );

        loop {
            self.run_cycle();
            std::thread::sleep(interval);
        }
    }
}

fn report(notices: &[Notice]) {
    for notice in notices {
        info!(
            "  - {} (UNSPSC: {})",
            notice.title().unwrap_or("No Title"),
            notice.unspsc().unwrap_or_default().replace('\n', " ")
        );
        info!("    Link: {}", notice.notice_url().unwrap_or("No URL"));
    }
}

/// UTF-8 decode with an optional byte-order mark removed.
pub fn decode_body(bytes: &[u8]) -> Result<String, std::str::Utf8Error> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    std::str::from_utf8(bytes).map(str::to_string)
}

pub fn parse_notices(content: &str) -> GovBidResult<Vec<Notice>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = reader.headers()?.clone();

    let mut notices: Vec<Notice> = Vec::new();
    for record in reader.records() {
        let record = record?;
        notices.push(headers.iter().zip(record.iter()).collect());
    }
    Ok(notices)
}

pub fn matches_prefix(notice: &Notice, prefixes: &[String]) -> bool {
    notice
        .classification_codes()
        .any(|code| prefixes.iter().any(|prefix| code.starts_with(prefix.as_str())))
}

/// Keeps notices with at least one UNSPSC code starting with a prefix.
pub fn filter_notices(notices: Vec<Notice>, prefixes: &[String]) -> Vec<Notice> {
    notices
        .into_iter()
        .filter(|notice| matches_prefix(notice, prefixes))
        .collect()
}
