// File: response.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use serde::de::DeserializeOwned;

use crate::errors::GovBidResult;

/// A fully read, successful response from the search API.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    body: String,
    status: u16,
}

impl ApiResponse {
    pub fn new(body: String, status: u16) -> Self {
        ApiResponse { body, status }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn json<T: DeserializeOwned>(&self) -> GovBidResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
