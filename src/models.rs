// File: models.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

pub const NOTICE_TITLE_COLUMN: &str = "title-titre-eng";
pub const NOTICE_UNSPSC_COLUMN: &str = "unspsc";
pub const NOTICE_URL_COLUMN: &str = "noticeURL-URLavis-eng";

/// A SAM.gov opportunity as returned by the search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub notice_id: String,
    pub title: String,
    #[serde(default)]
    pub solicitation_number: Option<String>,
    #[serde(default, rename = "fullParentPathName", alias = "department")]
    pub department: Option<String>,
    #[serde(default)]
    pub sub_tier: Option<String>,
    #[serde(default)]
    pub office: Option<String>,
    #[serde(default)]
    pub posted_date: Option<String>,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub base_type: Option<String>,
    #[serde(default)]
    pub archive_type: Option<String>,
    #[serde(default)]
    pub archive_date: Option<String>,
    #[serde(default)]
    pub type_of_set_aside_description: Option<String>,
    #[serde(default)]
    pub type_of_set_aside: Option<String>,
    #[serde(default, rename = "responseDeadLine")]
    pub response_deadline: Option<String>,
    #[serde(default)]
    pub naics_code: Option<String>,
    #[serde(default)]
    pub naics_codes: Option<Vec<String>>,
    #[serde(default)]
    pub classification_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub active: Option<bool>,
    #[serde(default)]
    pub organization_type: Option<String>,
    #[serde(default)]
    pub resource_links: Option<Vec<String>>,
    #[serde(default)]
    pub ui_link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Opportunity {
    pub fn new(notice_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            notice_id: notice_id.into(),
            title: title.into(),
            solicitation_number: None,
            department: None,
            sub_tier: None,
            office: None,
            posted_date: None,
            r#type: None,
            base_type: None,
            archive_type: None,
            archive_date: None,
            type_of_set_aside_description: None,
            type_of_set_aside: None,
            response_deadline: None,
            naics_code: None,
            naics_codes: None,
            classification_code: None,
            active: None,
            organization_type: None,
            resource_links: None,
            ui_link: None,
            description: None,
        }
    }
}

/// One page of the search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub total_records: u64,
    pub opportunities_data: Vec<Opportunity>,
}

// The API reports `active` as "Yes"/"No" while older payloads use booleans.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(value)) => Some(value),
        Some(Flag::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" | "1" => Some(true),
            "no" | "n" | "false" | "0" => Some(false),
            _ => None,
        },
        None => None,
    })
}

/// A row of the Canada Buys tender notice feed, keyed by column header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Notice {
    fields: HashMap<String, String>,
}

impl Notice {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    pub fn title(&self) -> Option<&str> {
        self.get(NOTICE_TITLE_COLUMN)
    }

    pub fn unspsc(&self) -> Option<&str> {
        self.get(NOTICE_UNSPSC_COLUMN)
    }

    pub fn notice_url(&self) -> Option<&str> {
        self.get(NOTICE_URL_COLUMN)
    }

    /// UNSPSC codes of the notice, one per line, with `*` markers stripped.
    pub fn classification_codes(&self) -> impl Iterator<Item = &str> {
        self.unspsc()
            .unwrap_or_default()
            .lines()
            .map(|code| code.trim().trim_start_matches('*'))
    }
}

impl<K, V> FromIterator<(K, V)> for Notice
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
