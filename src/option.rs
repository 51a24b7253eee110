//! Command-line options and their validation.

use std::collections::HashSet;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::error::UsageError;
use crate::percentile::{parse_percentile_set, Percentile, DEFAULT_PERCENTILE_SET};

/// Direction of router traffic to report.
#[derive(ValueEnum, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Item {
    In,
    Out,
}

/// Reports router traffic averages and percentiles as JSON.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Number of latest monitor points averaged per router
    #[arg(long, default_value_t = 3)]
    pub time: u32,

    /// Item name
    #[arg(long, value_enum, default_value_t = Item::In)]
    pub item: Item,

    /// Prefix for router names; accepts more than one
    #[arg(long = "prefix", required = true)]
    pub prefixes: Vec<String>,

    /// Zone name; accepts more than one
    #[arg(long = "zone", required = true)]
    pub zones: Vec<String>,

    /// Percentiles to display
    #[arg(long, default_value = DEFAULT_PERCENTILE_SET)]
    pub percentile_set: String,

    /// jq style query applied to the result
    #[arg(long)]
    pub query: Option<String>,
}

/// Validated options consumed by the pipeline.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Settings {
    pub time: u32,
    pub item: Item,
    pub prefixes: Vec<String>,
    pub zones: Vec<String>,
    #[serde(skip)]
    pub percentiles: Vec<Percentile>,
    pub query: Option<String>,
}

impl Options {
    pub fn validate(self) -> Result<Settings, UsageError> {
        if self.prefixes.is_empty() {
            return Err(UsageError::NoPrefix);
        }
        if self.zones.is_empty() {
            return Err(UsageError::NoZone);
        }

        check_duplicated_zone(&self.zones)?;
        let percentiles = parse_percentile_set(&self.percentile_set)?;

        Ok(Settings {
            time: self.time.max(1),
            item: self.item,
            prefixes: self.prefixes,
            zones: self.zones,
            percentiles,
            query: self.query.filter(|query| !query.is_empty()),
        })
    }
}

fn check_duplicated_zone(zones: &[String]) -> Result<(), UsageError> {
    let mut seen = HashSet::new();
    for zone in zones {
        if !seen.insert(zone.as_str()) {
            return Err(UsageError::DuplicatedZone(zone.clone()));
        }
    }
    Ok(())
}
