// Test fixtures - reusable test data
// Records, ranges and day items shared by the integration tests

#![allow(dead_code)]

use calendar_grid::models::range::VisibleRange;
use calendar_grid::models::record::RawRecord;
use calendar_grid::models::settings::LegendSettings;
use calendar_grid::models::style::TimeGranularity;
use calendar_grid::services::recurrence::RRuleExpander;
use calendar_grid::services::splitter::{DayEventSplitter, DayItems, EventCollector};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde_json::json;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Mid-April 2025, used as "today" throughout.
pub fn today() -> NaiveDate {
    date(2025, 4, 15)
}

/// April 2025 in UTC, weeks starting on Sunday.
pub fn april() -> VisibleRange {
    VisibleRange::for_month(2025, 4, Tz::UTC, today(), 0).unwrap()
}

/// A record with one start/end value in UTC storage.
pub fn record(id: i64, start: &str, end: &str) -> RawRecord {
    serde_json::from_value(json!({
        "entity_id": id,
        "bundle": "event",
        "values": [{ "value": start, "end_value": end }]
    }))
    .unwrap()
}

/// A weekly recurring record.
pub fn recurring(id: i64, start: &str, end: &str, rule: &str) -> RawRecord {
    serde_json::from_value(json!({
        "entity_id": id,
        "values": [{ "value": start, "end_value": end, "rrule": rule }]
    }))
    .unwrap()
}

/// Collect records into day items with default settings.
pub fn collect(records: &[RawRecord], range: &VisibleRange) -> DayItems {
    let expander = RRuleExpander::new();
    let legend = LegendSettings::default();
    let splitter = DayEventSplitter::new(&expander, TimeGranularity::Second, 1);
    EventCollector::new(splitter, &legend).collect(records, range)
}
