// Record module
// Raw entity records as supplied by the storage/query layer

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::models::occurrence::{date_id, EventOccurrence, Stripe};
use crate::utils::date::{day_end_naive, resolve_local, start_of_day};

/// A taxonomy term referenced by a record, used for legend stripes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRef {
    pub id: String,
    pub label: String,
}

/// One delta of a date field, in storage form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFieldValue {
    pub value: Option<String>,
    pub end_value: Option<String>,
    /// RRULE body, e.g. `FREQ=WEEKLY;COUNT=4`
    pub rrule: Option<String>,
    /// Excluded recurrence starts, in the same storage forms as `value`
    pub exceptions: Vec<String>,
}

fn default_kind() -> String {
    "node".to_string()
}

fn default_field() -> String {
    "field_date".to_string()
}

fn default_storage_timezone() -> String {
    "UTC".to_string()
}

/// A raw record with its date field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub entity_id: i64,
    #[serde(default = "default_kind")]
    pub entity_kind: String,
    /// Bundle or content type, used for type legend stripes
    #[serde(default)]
    pub bundle: Option<String>,
    #[serde(default = "default_field")]
    pub field_name: String,
    #[serde(default = "default_storage_timezone")]
    pub storage_timezone: String,
    #[serde(default)]
    pub values: Vec<DateFieldValue>,
    #[serde(default)]
    pub rendered_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub stripes: Vec<Stripe>,
    #[serde(default)]
    pub terms: Vec<TermRef>,
}

/// Which end of an interval a storage value describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueBound {
    Start,
    End,
}

/// Parse a storage value into an instant.
///
/// Date-only values are anchored in the display time zone: a start becomes
/// `00:00:00` and an end becomes `23:59:59` of that day. Naive date-times are
/// read in the storage time zone.
pub fn parse_storage_value(
    value: &str,
    bound: ValueBound,
    storage_tz: Tz,
    display_tz: Tz,
) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.bytes().all(|b| b.is_ascii_digit()) && value.len() != 8 {
        let seconds: i64 = value.parse().ok()?;
        return Utc.timestamp_opt(seconds, 0).single();
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(resolve_local(storage_tz, naive));
        }
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .ok()?;
    Some(match bound {
        ValueBound::Start => start_of_day(date, display_tz),
        ValueBound::End => resolve_local(display_tz, day_end_naive(date)),
    })
}

impl RawRecord {
    pub fn storage_tz(&self) -> Result<Tz> {
        self.storage_timezone.parse::<Tz>().map_err(|_| {
            GridError::DataAnomaly(format!(
                "Record {} has unknown storage time zone {}",
                self.entity_id, self.storage_timezone
            ))
        })
    }

    /// Kind used to look up type legend colors.
    pub fn legend_type(&self) -> &str {
        self.bundle.as_deref().unwrap_or(&self.entity_kind)
    }

    /// Build the unsplit occurrence for one date field delta.
    ///
    /// A value without a parseable start is a data anomaly. A missing end,
    /// or an end before the start, collapses onto the start.
    pub fn occurrence(&self, delta: usize, display_tz: Tz) -> Result<EventOccurrence> {
        let field = self.values.get(delta).ok_or_else(|| {
            GridError::DataAnomaly(format!("Record {} has no value at delta {}", self.entity_id, delta))
        })?;
        let storage_tz = self.storage_tz()?;

        let start = field
            .value
            .as_deref()
            .and_then(|v| parse_storage_value(v, ValueBound::Start, storage_tz, display_tz))
            .ok_or_else(|| {
                GridError::DataAnomaly(format!(
                    "Record {} delta {} has no usable start date",
                    self.entity_id, delta
                ))
            })?;

        let mut builder = EventOccurrence::builder()
            .entity(self.entity_id, self.entity_kind.clone())
            .date_id(date_id(self.entity_id, &self.field_name, delta))
            .start(start)
            .timezone(display_tz)
            .rendered_fields(self.rendered_fields.clone())
            .stripes(self.stripes.clone());

        if let Some(end) = field
            .end_value
            .as_deref()
            .and_then(|v| parse_storage_value(v, ValueBound::End, storage_tz, display_tz))
        {
            builder = builder.end(end);
        }

        if let Some(rule) = field.rrule.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            let exceptions = field
                .exceptions
                .iter()
                .filter_map(|v| parse_storage_value(v, ValueBound::Start, storage_tz, display_tz))
                .collect();
            builder = builder.recurrence_rule(rule).recurrence_exceptions(exceptions);
        }

        builder.build().map_err(GridError::DataAnomaly)
    }
}
