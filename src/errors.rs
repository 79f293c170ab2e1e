// File: errors.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum GovBidError {
    /// The server asked us to wait longer than the configured ceiling.
    RateLimitExceeded { url: String, wait: Duration },
    RetriesExhausted { url: String },
    /// Non-retryable status, i.e. a 4xx other than 429.
    HttpStatus { url: String, status: u16 },
    Http(reqwest::Error),
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    Config(String),
}

impl fmt::Display for GovBidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimitExceeded { url, wait } => write!(
                f,
                "Rate limit exceeded for {}. Try again after {:.0}s",
                url,
                wait.as_secs_f64()
            ),
            Self::RetriesExhausted { url } => write!(f, "Max retries exceeded for url: {}", url),
            Self::HttpStatus { url, status } => write!(f, "HTTP status {} for url: {}", status, url),
            Self::Http(e) => write!(f, "HTTP error: {}", e),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
            Self::Csv(e) => write!(f, "CSV error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for GovBidError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Csv(e) => Some(e),
            Self::RateLimitExceeded { .. }
            | Self::RetriesExhausted { .. }
            | Self::HttpStatus { .. }
            | Self::Config(_) => None,
        }
    }
}

impl From<reqwest::Error> for GovBidError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error)
    }
}

impl From<std::io::Error> for GovBidError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<serde_json::Error> for GovBidError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

impl From<csv::Error> for GovBidError {
    fn from(error: csv::Error) -> Self {
        Self::Csv(error)
    }
}

pub type GovBidResult<T> = Result<T, GovBidError>;
