// File: common/mod.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(dead_code)]

use govbid::archive::Archive;
use govbid::fetcher::{Fetcher, RetryPolicy};
use govbid::history::HistoryLog;
use govbid::pager::Pager;
use govbid::search::SamClient;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use wiremock::{MockServer, ResponseTemplate};

pub const SEARCH_PATH: &str = "/opportunities/v2/search";

pub const MOCK_CSV_CONTENT: &str = "title-titre-eng,unspsc,noticeURL-URLavis-eng\n\
\"Test Software Job\",\"*81111705\",\"http://example.com/software\"\n\
\"Test Cleaning Job\",\"*78101809\",\"http://example.com/cleaning\"\n\
\"Another Software Job\",\"81110000\",\"http://example.com/software2\"\n\
\"Multiline Match Job\",\"*78101809\n*81111500\",\"http://example.com/multiline\"\n";

/// No pacing, no jitter, three attempts.
pub fn fast_policy() -> RetryPolicy {
    let mut policy = RetryPolicy::new();
    policy.set_max_retries(3);
    policy.set_base_delay(Duration::ZERO);
    policy.set_request_delay(Duration::ZERO, Duration::ZERO);
    policy.set_max_jitter(Duration::ZERO);
    policy
}

pub fn fast_fetcher() -> Fetcher {
    Fetcher::new(Duration::from_secs(5), fast_policy()).unwrap()
}

pub fn search_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), SEARCH_PATH)
}

pub fn pager_for(server: &MockServer, archive_dir: &Path) -> Pager {
    Pager::new(fast_fetcher(), search_url(server), "test-key")
        .with_archive(Archive::sam(archive_dir))
}

pub fn client_for(server: &MockServer, work_dir: &Path, page_size: u32) -> SamClient {
    let history = HistoryLog::new(work_dir.join("history.jsonl")).unwrap();
    SamClient::new(pager_for(server, &work_dir.join("raw")), history).with_page_size(page_size)
}

pub fn opportunity(id: &str) -> Value {
    json!({"noticeId": id, "title": format!("Opportunity {}", id), "postedDate": "2024-01-01"})
}

pub fn sam_page(ids: &[&str]) -> Value {
    json!({
        "totalRecords": ids.len(),
        "opportunitiesData": ids.iter().map(|id| opportunity(id)).collect::<Vec<_>>(),
    })
}

pub fn create_json_response(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/json")
        .set_body_string(data.to_string())
}

pub fn files_in(dir: &Path) -> Vec<std::path::PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

/// A URI nothing is listening on. Pooled mock servers keep listening after
/// drop, so reserve and release a raw port instead.
pub fn closed_server_uri() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
