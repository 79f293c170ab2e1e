// File: fetcher.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::errors::{GovBidError, GovBidResult};
use crate::response::ApiResponse;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Pacing and retry knobs of the [`Fetcher`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    min_request_delay: Duration,
    max_request_delay: Duration,
    max_jitter: Duration,
    max_rate_limit_wait: Duration,
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(2),
            min_request_delay: Duration::from_secs(2),
            max_request_delay: Duration::from_secs(4),
            max_jitter: Duration::from_secs(1),
            max_rate_limit_wait: Duration::from_secs(60),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn set_max_retries(&mut self, max_retries: u32) {
        self.max_retries = max_retries;
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn set_base_delay(&mut self, delay: Duration) {
        self.base_delay = delay;
    }

    pub fn set_request_delay(&mut self, min: Duration, max: Duration) {
        self.min_request_delay = min;
        self.max_request_delay = max;
    }

    pub fn set_max_jitter(&mut self, jitter: Duration) {
        self.max_jitter = jitter;
    }

    pub fn max_rate_limit_wait(&self) -> Duration {
        self.max_rate_limit_wait
    }

    pub fn set_max_rate_limit_wait(&mut self, wait: Duration) {
        self.max_rate_limit_wait = wait;
    }

    /// `base_delay * 2^attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn request_delay(&self) -> Duration {
        random_between(self.min_request_delay, self.max_request_delay)
    }

    pub fn jittered_backoff(&self, attempt: u32) -> Duration {
        self.backoff(attempt)
            .saturating_add(random_between(Duration::ZERO, self.max_jitter))
    }

    /// How long to wait after a 429, honouring `Retry-After` when it parses.
    pub fn rate_limit_wait(&self, headers: &HeaderMap, attempt: u32) -> Duration {
        let Some(value) = headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok()) else {
            return self.jittered_backoff(attempt);
        };
        let value = value.trim();

        if let Ok(secs) = value.parse::<f64>() {
            if secs.is_finite() {
                return seconds_to_duration(secs.max(0.0));
            }
        }

        match DateTime::parse_from_rfc2822(value) {
            Ok(date) => {
                let remaining = date.with_timezone(&Utc) - Utc::now();
                let secs = remaining.num_milliseconds() as f64 / 1000.0;
                seconds_to_duration(secs.max(1.0))
            }
            Err(e) => {
                warn!("Failed to parse Retry-After header '{}': {}", value, e);
                self.jittered_backoff(attempt)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

// Values past what `Duration` can hold saturate, so the ceiling check rejects them.
fn seconds_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

fn random_between(low: Duration, high: Duration) -> Duration {
    if high <= low {
        return low;
    }
    let secs = rand::thread_rng().gen_range(low.as_secs_f64()..=high.as_secs_f64());
    Duration::from_secs_f64(secs)
}

/// HTTP GET client that lets exactly one request (including its retries) run
/// at a time across all clones.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    gate: Arc<Mutex<()>>,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(timeout: Duration, policy: RetryPolicy) -> GovBidResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client, policy))
    }

    pub fn with_client(client: reqwest::Client, policy: RetryPolicy) -> Self {
        Fetcher {
            client,
            gate: Arc::new(Mutex::new(())),
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn fetch(&self, url: &str, params: &[(&str, String)]) -> GovBidResult<ApiResponse> {
        let _permit = self.gate.lock().await;
        let max_retries = self.policy.max_retries;

        for attempt in 0..max_retries {
            let last_attempt = attempt + 1 == max_retries;
            tokio::time::sleep(self.policy.request_delay()).await;

            debug!("GET {} (attempt {}/{})", url, attempt + 1, max_retries);
            let response = match self.client.get(url).query(params).send().await {
                Ok(response) => response,
                Err(e) => {
                    // the request URL carries the api key
                    let e = e.without_url();
                    let wait = self.policy.backoff(attempt);
                    warn!(
                        "Request to {} failed: {}. Retrying in {:.1}s...",
                        url,
                        e,
                        wait.as_secs_f64()
                    );
                    if !last_attempt {
                        tokio::time::sleep(wait).await;
                    }
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                let wait = self.policy.rate_limit_wait(response.headers(), attempt);
                if wait > self.policy.max_rate_limit_wait {
                    error!(
                        "Rate limit wait time too long: {:.2}s. Aborting.",
                        wait.as_secs_f64()
                    );
                    return Err(GovBidError::RateLimitExceeded {
                        url: url.to_string(),
                        wait,
                    });
                }
                warn!(
                    "Rate limited (429). Waiting {:.2}s before retry {}/{}...",
                    wait.as_secs_f64(),
                    attempt + 1,
                    max_retries
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if status.is_server_error() {
                let wait = self.policy.backoff(attempt);
                warn!(
                    "Server error {}. Retrying in {:.1}s...",
                    status.as_u16(),
                    wait.as_secs_f64()
                );
                if !last_attempt {
                    tokio::time::sleep(wait).await;
                }
                continue;
            }

            if !status.is_success() {
                return Err(GovBidError::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            match response.text().await {
                Ok(body) => return Ok(ApiResponse::new(body, status.as_u16())),
                Err(e) => {
                    warn!("Failed to read body from {}: {}. Retrying...", url, e.without_url());
                    if !last_attempt {
                        tokio::time::sleep(self.policy.backoff(attempt)).await;
                    }
                }
            }
        }

        Err(GovBidError::RetriesExhausted {
            url: url.to_string(),
        })
    }
}
