// File: search.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use futures::future::join_all;
use log::{error, info, warn};
use std::collections::HashSet;
use std::time::Duration;

use crate::archive::Archive;
use crate::config::Settings;
use crate::errors::GovBidResult;
use crate::fetcher::{Fetcher, RetryPolicy};
use crate::history::HistoryLog;
use crate::models::Opportunity;
use crate::pager::{CodeFilter, Pager, SearchQuery, DEFAULT_PAGE_SIZE};

/// Inclusive range of posting dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// The `days` days up to and including today, or `None` when the start
    /// falls before the earliest representable date.
    pub fn last_days(days: u32) -> Option<Self> {
        let today = Local::now().date_naive();
        let from = today.checked_sub_signed(ChronoDuration::days(i64::from(days)))?;
        Some(Self::new(from, today))
    }
}

/// Fans one paged query out per target code and returns only records that
/// have never been returned before.
#[derive(Debug, Clone)]
pub struct SamClient {
    pager: Pager,
    history: HistoryLog,
    retention_days: u32,
    page_size: u32,
}

impl SamClient {
    pub fn new(pager: Pager, history: HistoryLog) -> Self {
        Self {
            pager,
            history,
            retention_days: 60,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn from_settings(settings: &Settings) -> GovBidResult<Self> {
        let fetcher = Fetcher::new(
            Duration::from_secs(settings.request_timeout()),
            RetryPolicy::default(),
        )?;
        let pager = Pager::new(fetcher, settings.sam_base_url(), settings.sam_api_key())
            .with_archive(Archive::sam(settings.sam_raw_data_dir()));
        let history = HistoryLog::new(settings.sam_history_file())?;

        Ok(Self::new(pager, history).with_retention_days(settings.retention_days()))
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// One query per NAICS and PSC code, or a single unfiltered query when
    /// both lists are empty.
    pub fn queries(&self, range: DateRange, naics: &[String], pscs: &[String]) -> Vec<SearchQuery> {
        let base = SearchQuery::new(range.from, range.to, self.page_size);

        let mut queries: Vec<SearchQuery> = naics
            .iter()
            .map(|code| base.clone().with_filter(CodeFilter::Naics(code.clone())))
            .chain(
                pscs.iter()
                    .map(|code| base.clone().with_filter(CodeFilter::Psc(code.clone()))),
            )
            .collect();

        if queries.is_empty() {
            queries.push(base);
        }
        queries
    }

    pub async fn search(
        &self,
        range: DateRange,
        naics: &[String],
        pscs: &[String],
    ) -> Vec<Opportunity> {
        self.run_maintenance().await;

        let queries = self.queries(range, naics, pscs);
        info!(
            "Searching opportunities from {} to {} ({} queries)",
            range.from,
            range.to,
            queries.len()
        );

        let handles: Vec<_> = queries
            .into_iter()
            .map(|query| {
                let pager = self.pager.clone();
                tokio::spawn(async move { pager.page_all(&query).await })
            })
            .collect();

        let mut merged = Vec::new();
        for result in join_all(handles).await {
            match result {
                Ok(mut batch) => merged.append(&mut batch),
                Err(e) => error!("One of the search tasks failed: {}", e),
            }
        }

        self.deduplicate(merged)
    }

    /// Drops records already in the history log or already emitted earlier
    /// in `candidates`. Each survivor is appended to the log before it is
    /// added to the result.
    pub fn deduplicate(&self, candidates: Vec<Opportunity>) -> Vec<Opportunity> {
        let seen = match self.history.load_seen() {
            Ok(seen) => seen,
            Err(e) => {
                error!("Error loading history file: {}", e);
                HashSet::new()
            }
        };

        let mut emitted = HashSet::new();
        let mut unique = Vec::new();
        for opportunity in candidates {
            if seen.contains(&opportunity.notice_id)
                || !emitted.insert(opportunity.notice_id.clone())
            {
                continue;
            }
            if let Err(e) = self.history.mark_seen(&opportunity.notice_id) {
                error!("Error writing to history file: {}", e);
            }
            unique.push(opportunity);
        }
        unique
    }

    // Compaction rewrites the whole log, so keep it off the async workers.
    async fn run_maintenance(&self) {
        let history = self.history.clone();
        let archive = self.pager.archive().cloned();
        let retention_days = self.retention_days;

        let task = tokio::task::spawn_blocking(move || {
            if let Err(e) = history.compact(retention_days) {
                error!("Error cleaning up history: {}", e);
            }
            if let Some(archive) = archive {
                if let Err(e) = archive.cleanup(retention_days) {
                    warn!("Error during archive cleanup: {}", e);
                }
            }
        });
        if let Err(e) = task.await {
            error!("Maintenance task failed: {}", e);
        }
    }
}
