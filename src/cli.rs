// File: cli.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use anyhow::{bail, Result};
use chrono::{Duration, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use crate::config::Settings;
use crate::search::DateRange;

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = env!("CARGO_PKG_DESCRIPTION"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long = "log-level", default_value = "info", global = true)]
    pub log_level: String,

    #[arg(
        short = 'v',
        long = "verbose",
        help = "Enable debug logging",
        global = true
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long = "quiet",
        help = "Only log warnings and errors",
        global = true
    )]
    pub quiet: bool,

    #[arg(long = "no-color", help = "Disable colored output", global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search SAM.gov for opportunities not reported before
    Search(SearchArgs),
    /// Poll the Canada Buys tender notice feed
    Harvest(HarvestArgs),
    /// Compact the history log and prune old archives
    Compact(CompactArgs),
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[arg(
        short = 'd',
        long = "days",
        default_value_t = 30,
        help = "Search the last N days when --from is not given"
    )]
    pub days: u32,

    #[arg(long = "from", help = "Start date (YYYY-MM-DD or MM/DD/YYYY)")]
    pub from: Option<String>,

    #[arg(long = "to", help = "End date (YYYY-MM-DD or MM/DD/YYYY)")]
    pub to: Option<String>,

    #[arg(long = "naics", value_delimiter = ',', help = "NAICS codes to search")]
    pub naics: Vec<String>,

    #[arg(long = "psc", value_delimiter = ',', help = "PSC codes to search")]
    pub psc: Vec<String>,

    #[arg(long = "no-filter", help = "Run a single query without code filters")]
    pub no_filter: bool,

    #[arg(short = 'l', long = "limit", default_value_t = 1000, help = "Page size")]
    pub limit: u32,

    #[arg(long = "json", help = "Print results as JSON lines")]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct HarvestArgs {
    #[arg(long = "once", help = "Run a single cycle and exit")]
    pub once: bool,

    #[arg(short = 'i', long = "interval", help = "Seconds between polls")]
    pub interval: Option<u64>,
}

#[derive(Args, Debug)]
pub struct CompactArgs {
    #[arg(long = "days", help = "Retention window in days")]
    pub days: Option<u32>,
}

impl Cli {
    pub fn level_filter(&self) -> LevelFilter {
        if self.verbose {
            return LevelFilter::Debug;
        }
        if self.quiet {
            return LevelFilter::Warn;
        }
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

impl SearchArgs {
    pub fn date_range(&self) -> Result<DateRange> {
        let to = match &self.to {
            Some(raw) => parse_date_string(raw)?,
            None => Local::now().date_naive(),
        };
        let from = match &self.from {
            Some(raw) => parse_date_string(raw)?,
            None => match to.checked_sub_signed(Duration::days(i64::from(self.days))) {
                Some(from) => from,
                None => bail!("--days {} reaches before the earliest supported date", self.days),
            },
        };

        if from > to {
            bail!("Start date {} is after end date {}", from, to);
        }
        Ok(DateRange::new(from, to))
    }

    /// NAICS and PSC codes to query: explicit flags win over configured targets.
    pub fn codes(&self, settings: &Settings) -> (Vec<String>, Vec<String>) {
        if self.no_filter {
            return (Vec::new(), Vec::new());
        }
        if !self.naics.is_empty() || !self.psc.is_empty() {
            return (self.naics.clone(), self.psc.clone());
        }
        (
            settings.target_naics().to_vec(),
            settings.target_pscs().to_vec(),
        )
    }
}

fn parse_date_string(date_str: &str) -> Result<NaiveDate> {
    let date_str = date_str.trim();
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(date);
        }
    }
    bail!("Invalid date '{}', expected YYYY-MM-DD or MM/DD/YYYY", date_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_args(argv: &[&str]) -> SearchArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Search(args) => args,
            other => panic!("expected search command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_date_string() {
        assert_eq!(
            parse_date_string("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            parse_date_string("01/15/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date_string("invalid").is_err());
    }

    #[test]
    fn test_default_date_range() {
        let args = search_args(&["govbid", "search"]);
        let range = args.date_range().unwrap();
        assert_eq!(range.to, Local::now().date_naive());
        assert_eq!((range.to - range.from).num_days(), 30);
    }

    #[test]
    fn test_explicit_date_range() {
        let args = search_args(&["govbid", "search", "--from", "2024-01-01", "--to", "2024-01-31"]);
        let range = args.date_range().unwrap();
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.to, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_reversed_date_range_is_rejected() {
        let args = search_args(&["govbid", "search", "--from", "2024-02-01", "--to", "2024-01-01"]);
        assert!(args.date_range().is_err());
    }

    #[test]
    fn test_oversized_days_is_rejected() {
        let args = search_args(&["govbid", "search", "--days", "4294967295"]);
        let err = args.date_range().unwrap_err();
        assert!(err.to_string().contains("4294967295"));
    }

    #[test]
    fn test_codes_default_to_settings() {
        let settings = Settings::new("key");
        let args = search_args(&["govbid", "search"]);
        let (naics, pscs) = args.codes(&settings);
        assert_eq!(naics, settings.target_naics());
        assert_eq!(pscs, settings.target_pscs());
    }

    #[test]
    fn test_codes_from_flags() {
        let settings = Settings::new("key");
        let args = search_args(&["govbid", "search", "--naics", "541511,541512"]);
        let (naics, pscs) = args.codes(&settings);
        assert_eq!(naics, vec!["541511", "541512"]);
        assert!(pscs.is_empty());
    }

    #[test]
    fn test_no_filter_clears_codes() {
        let settings = Settings::new("key");
        let args = search_args(&["govbid", "search", "--no-filter", "--psc", "DA01"]);
        let (naics, pscs) = args.codes(&settings);
        assert!(naics.is_empty() && pscs.is_empty());
    }

    #[test]
    fn test_level_filter() {
        let cli = Cli::try_parse_from(["govbid", "-v", "compact"]).unwrap();
        assert_eq!(cli.level_filter(), LevelFilter::Debug);

        let cli = Cli::try_parse_from(["govbid", "--log-level", "error", "compact"]).unwrap();
        assert_eq!(cli.level_filter(), LevelFilter::Error);

        let cli = Cli::try_parse_from(["govbid", "harvest", "--once", "-q"]).unwrap();
        assert_eq!(cli.level_filter(), LevelFilter::Warn);
    }
}
