// Occurrence module
// One calendar appearance of an entity, before and after day splitting

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::utils::date::to_local;

/// Namespace prefix of every date id.
pub const DATE_ID_NAMESPACE: &str = "calendar";

/// Legend decoration carried through to the templating layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stripe {
    pub label: String,
    pub color: String,
}

/// The part of an occurrence that falls on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySegment {
    pub date: NaiveDate,
    /// Days since the occurrence's true start date
    pub position: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Build the `<namespace>.<entity>.<field>.<delta>` prefix of a date id.
pub fn date_id(entity_id: i64, field_name: &str, delta: usize) -> String {
    format!("{}.{}.{}.{}", DATE_ID_NAMESPACE, entity_id, field_name, delta)
}

/// One calendar appearance of an entity on a contiguous span.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventOccurrence {
    pub entity_id: i64,
    pub entity_kind: String,
    /// Correlation key; gains a `.<position>` suffix once split by day
    pub date_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timezone: Tz,
    pub all_day: bool,
    pub multi_day: bool,
    pub continuation: bool,
    pub continues: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recurrence_exceptions: Vec<DateTime<Utc>>,
    pub rendered_fields: BTreeMap<String, String>,
    pub stripes: Vec<Stripe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<DaySegment>,
}

impl EventOccurrence {
    /// Create a builder for constructing occurrences with optional fields
    pub fn builder() -> OccurrenceBuilder {
        OccurrenceBuilder::new()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence_rule.is_some()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    pub fn local_start(&self) -> NaiveDateTime {
        to_local(self.start, self.timezone).naive_local()
    }

    pub fn local_end(&self) -> NaiveDateTime {
        to_local(self.end, self.timezone).naive_local()
    }

    /// Date id without the per-day position suffix.
    pub fn base_date_id(&self) -> &str {
        match self.segment {
            Some(_) => self
                .date_id
                .rsplit_once('.')
                .map(|(base, _)| base)
                .unwrap_or(&self.date_id),
            None => &self.date_id,
        }
    }

    /// Key identifying one logical occurrence across its day fragments.
    pub fn slot_key(&self) -> String {
        format!("{}@{}", self.base_date_id(), self.start.timestamp())
    }

    /// Calendar day of the true start in the display time zone.
    pub fn first_day(&self) -> NaiveDate {
        self.local_start().date()
    }

    /// Last calendar day the occurrence actually covers.
    ///
    /// An end at exactly `00:00:00` after a positive duration only touches
    /// that day, so the day before is the last one covered.
    pub fn last_day(&self) -> NaiveDate {
        let end = self.local_end();
        let first = self.first_day();
        if self.end > self.start && end.time() == NaiveTime::default() && end.date() > first {
            end.date().pred_opt().unwrap_or(first)
        } else {
            end.date()
        }
    }

    /// Calendar day this fragment is placed on.
    pub fn day(&self) -> NaiveDate {
        match &self.segment {
            Some(segment) => segment.date,
            None => self.local_start().date(),
        }
    }

    /// Wall-clock start used for ordering within a day.
    pub fn sort_key(&self) -> NaiveDateTime {
        match &self.segment {
            Some(segment) => segment.start,
            None => self.local_start(),
        }
    }

    /// Whether this fragment belongs in the multi-day band rows.
    pub fn wants_band(&self, multi_day_theme: bool) -> bool {
        multi_day_theme && (self.multi_day || self.all_day)
    }
}

/// Builder for creating occurrences with optional fields
pub struct OccurrenceBuilder {
    entity_id: i64,
    entity_kind: String,
    date_id: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    timezone: Tz,
    recurrence_rule: Option<String>,
    recurrence_exceptions: Vec<DateTime<Utc>>,
    rendered_fields: BTreeMap<String, String>,
    stripes: Vec<Stripe>,
}

impl OccurrenceBuilder {
    pub fn new() -> Self {
        Self {
            entity_id: 0,
            entity_kind: "event".to_string(),
            date_id: None,
            start: None,
            end: None,
            timezone: Tz::UTC,
            recurrence_rule: None,
            recurrence_exceptions: Vec::new(),
            rendered_fields: BTreeMap::new(),
            stripes: Vec::new(),
        }
    }

    pub fn entity(mut self, id: i64, kind: impl Into<String>) -> Self {
        self.entity_id = id;
        self.entity_kind = kind.into();
        self
    }

    pub fn date_id(mut self, date_id: impl Into<String>) -> Self {
        self.date_id = Some(date_id.into());
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn recurrence_rule(mut self, rule: impl Into<String>) -> Self {
        self.recurrence_rule = Some(rule.into());
        self
    }

    pub fn recurrence_exceptions(mut self, exceptions: Vec<DateTime<Utc>>) -> Self {
        self.recurrence_exceptions = exceptions;
        self
    }

    pub fn rendered_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.rendered_fields.insert(name.into(), value.into());
        self
    }

    pub fn rendered_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.rendered_fields = fields;
        self
    }

    pub fn stripe(mut self, label: impl Into<String>, color: impl Into<String>) -> Self {
        self.stripes.push(Stripe {
            label: label.into(),
            color: color.into(),
        });
        self
    }

    pub fn stripes(mut self, stripes: Vec<Stripe>) -> Self {
        self.stripes = stripes;
        self
    }

    /// Build the occurrence. A missing end defaults to the start, and an end
    /// before the start collapses onto it.
    pub fn build(self) -> Result<EventOccurrence, String> {
        let start = self.start.ok_or("Occurrence start is required")?;
        let end = self.end.filter(|end| *end >= start).unwrap_or(start);
        let entity_id = self.entity_id;
        let id = self
            .date_id
            .unwrap_or_else(|| date_id(entity_id, "date", 0));

        Ok(EventOccurrence {
            entity_id: self.entity_id,
            entity_kind: self.entity_kind,
            date_id: id,
            start,
            end,
            timezone: self.timezone,
            all_day: false,
            multi_day: false,
            continuation: false,
            continues: false,
            recurrence_rule: self.recurrence_rule,
            recurrence_exceptions: self.recurrence_exceptions,
            rendered_fields: self.rendered_fields,
            stripes: self.stripes,
            segment: None,
        })
    }
}

impl Default for OccurrenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
