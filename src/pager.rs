// File: pager.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use chrono::NaiveDate;
use log::{debug, error, warn};
use std::fmt;

use crate::archive::Archive;
use crate::fetcher::Fetcher;
use crate::models::{Opportunity, SearchResponse};

pub const DEFAULT_PAGE_SIZE: u32 = 1000;
/// Paging stops once the next offset would pass this many records.
pub const SAFETY_OFFSET_LIMIT: u32 = 10_000;

const API_DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeFilter {
    Naics(String),
    Psc(String),
}

impl CodeFilter {
    fn param(&self) -> (&'static str, &str) {
        match self {
            Self::Naics(code) => ("ncode", code),
            Self::Psc(code) => ("ccode", code),
        }
    }
}

impl fmt::Display for CodeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, code) = self.param();
        write!(f, "{}={}", name, code)
    }
}

/// One paged query against the search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    posted_from: NaiveDate,
    posted_to: NaiveDate,
    limit: u32,
    filter: Option<CodeFilter>,
}

impl SearchQuery {
    pub fn new(posted_from: NaiveDate, posted_to: NaiveDate, limit: u32) -> Self {
        Self {
            posted_from,
            posted_to,
            limit: limit.max(1),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: CodeFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn filter(&self) -> Option<&CodeFilter> {
        self.filter.as_ref()
    }

    pub fn params(&self, api_key: &str, offset: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api_key", api_key.to_string()),
            ("postedFrom", self.posted_from.format(API_DATE_FORMAT).to_string()),
            ("postedTo", self.posted_to.format(API_DATE_FORMAT).to_string()),
            ("limit", self.limit.to_string()),
            ("active", "yes".to_string()),
        ];
        if let Some(filter) = &self.filter {
            let (name, code) = filter.param();
            params.push((name, code.to_string()));
        }
        params.push(("offset", offset.to_string()));
        params
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(filter) => write!(f, "{}", filter),
            None => write!(f, "unfiltered"),
        }
    }
}

/// Walks the offsets of a [`SearchQuery`] until the data runs out.
#[derive(Debug, Clone)]
pub struct Pager {
    fetcher: Fetcher,
    base_url: String,
    api_key: String,
    archive: Option<Archive>,
    offset_limit: u32,
}

impl Pager {
    pub fn new(fetcher: Fetcher, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            api_key: api_key.into(),
            archive: None,
            offset_limit: SAFETY_OFFSET_LIMIT,
        }
    }

    pub fn with_archive(mut self, archive: Archive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn with_offset_limit(mut self, offset_limit: u32) -> Self {
        self.offset_limit = offset_limit;
        self
    }

    pub fn archive(&self) -> Option<&Archive> {
        self.archive.as_ref()
    }

    /// Collects every page of `query`. Never fails: a failed fetch or an
    /// unreadable page ends the sequence and whatever was gathered is returned.
    pub async fn page_all(&self, query: &SearchQuery) -> Vec<Opportunity> {
        let mut results = Vec::new();
        let limit = query.limit();
        let mut offset = 0u32;

        loop {
            let params = query.params(&self.api_key, offset);
            let response = match self.fetcher.fetch(&self.base_url, &params).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Error fetching opportunities page ({}, offset {}): {}", query, offset, e);
                    break;
                }
            };

            self.archive_page(response.body());

            let page: SearchResponse = match response.json() {
                Ok(page) => page,
                Err(e) => {
                    error!("Unexpected search response ({}, offset {}): {}", query, offset, e);
                    break;
                }
            };

            let count = page.opportunities_data.len();
            results.extend(page.opportunities_data);
            if count < limit as usize {
                break;
            }

            offset = offset.saturating_add(limit);
            if offset > self.offset_limit {
                warn!(
                    "Reached safety limit of {} records for {}, stopping.",
                    self.offset_limit, query
                );
                break;
            }
        }

        debug!("Collected {} opportunities for {}", results.len(), query);
        results
    }

    fn archive_page(&self, body: &str) {
        let Some(archive) = &self.archive else {
            return;
        };
        match archive.save(body) {
            Ok(path) => debug!("Archived search page to {}", path.display()),
            Err(e) => warn!("Failed to archive SAM JSON: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_params_unfiltered() {
        let query = SearchQuery::new(date(2024, 1, 5), date(2024, 2, 4), 1000);
        let params = query.params("secret", 0);

        assert_eq!(
            params,
            vec![
                ("api_key", "secret".to_string()),
                ("postedFrom", "01/05/2024".to_string()),
                ("postedTo", "02/04/2024".to_string()),
                ("limit", "1000".to_string()),
                ("active", "yes".to_string()),
                ("offset", "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_with_code_filters() {
        let base = SearchQuery::new(date(2024, 1, 1), date(2024, 1, 31), 50);

        let naics = base.clone().with_filter(CodeFilter::Naics("541511".into()));
        let psc = base.with_filter(CodeFilter::Psc("DA01".into()));

        assert!(naics.params("k", 100).contains(&("ncode", "541511".to_string())));
        assert!(naics.params("k", 100).contains(&("offset", "100".to_string())));
        assert!(psc.params("k", 0).contains(&("ccode", "DA01".to_string())));
        assert!(!psc.params("k", 0).iter().any(|(name, _)| *name == "ncode"));
    }

    #[test]
    fn test_zero_limit_is_clamped() {
        let query = SearchQuery::new(date(2024, 1, 1), date(2024, 1, 31), 0);
        assert_eq!(query.limit(), 1);
    }

    #[test]
    fn test_query_display() {
        let query = SearchQuery::new(date(2024, 1, 1), date(2024, 1, 31), 10);
        assert_eq!(query.to_string(), "unfiltered");
        let query = query.with_filter(CodeFilter::Psc("DA10".into()));
        assert_eq!(query.to_string(), "ccode=DA10");
    }
}
