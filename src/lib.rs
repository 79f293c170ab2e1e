// File: lib.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::new_without_default)]

pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod harvester;
pub mod history;
pub mod models;
pub mod pager;
pub mod response;
pub mod search;


pub use errors::{GovBidError, GovBidResult};
