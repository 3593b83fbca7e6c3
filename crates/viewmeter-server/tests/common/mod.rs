#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use viewmeter_core::Category;
use viewmeter_server::config::{MeterConfig, StoreSection};

pub fn config_with_store(path: PathBuf) -> MeterConfig {
    MeterConfig {
        store: StoreSection { path },
        ..MeterConfig::default()
    }
}

/// One parsed `<category>:<timestamp> {views: n, clicks: n}` line.
#[derive(Debug)]
pub struct Record {
    pub category: Category,
    pub views: u64,
    pub clicks: u64,
}

pub fn read_records(path: &Path) -> Vec<Record> {
    fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| parse_record(line).unwrap_or_else(|| panic!("malformed record: {line}")))
        .collect()
}

fn parse_record(line: &str) -> Option<Record> {
    let (name, rest) = line.split_once(':')?;
    let category = *Category::ALL.iter().find(|c| c.as_str() == name)?;
    let body = rest.split_once(" {views: ")?.1;
    let (views, rest) = body.split_once(", clicks: ")?;
    let clicks = rest.strip_suffix('}')?;
    Some(Record {
        category,
        views: views.parse().ok()?,
        clicks: clicks.parse().ok()?,
    })
}
