// Recurrence service
// Expands RRULE-based occurrences into concrete (start, end) pairs

use chrono::{DateTime, Duration, TimeZone, Utc};
use log::{debug, warn};
use rrule::RRuleSet;

use crate::error::{GridError, Result};
use crate::models::occurrence::EventOccurrence;

/// Hard cap on generated instances per rule and render.
pub const MAX_OCCURRENCES: u16 = 1000;

/// Produces the concrete intervals of a recurring occurrence.
#[cfg_attr(test, mockall::automock)]
pub trait RecurrenceExpander {
    /// Intervals of `occurrence` that intersect `[range_start, range_end]`.
    fn occurrences(
        &self,
        occurrence: &EventOccurrence,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>>;
}

/// RFC 5545 expansion backed by the `rrule` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RRuleExpander;

impl RRuleExpander {
    pub fn new() -> Self {
        Self
    }

    fn rule_set(occurrence: &EventOccurrence, rule: &str) -> Result<RRuleSet> {
        let local = occurrence.local_start();
        let body = rule.trim().trim_start_matches("RRULE:");
        let source = format!(
            "DTSTART;TZID={}:{}\nRRULE:{}",
            occurrence.timezone.name(),
            local.format("%Y%m%dT%H%M%S"),
            body
        );

        source
            .parse::<RRuleSet>()
            .map_err(|e| GridError::Recurrence(format!("{} ({})", e, body)))
    }
}

impl RecurrenceExpander for RRuleExpander {
    fn occurrences(
        &self,
        occurrence: &EventOccurrence,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>> {
        let Some(rule) = occurrence.recurrence_rule.as_deref() else {
            return Ok(vec![(occurrence.start, occurrence.end)]);
        };
        if rule.trim().is_empty() || rule == "None" {
            return Ok(vec![(occurrence.start, occurrence.end)]);
        }

        let duration = occurrence.duration();
        // Instances starting before the range can still reach into it.
        let window_start = range_start - duration - Duration::seconds(1);
        let window_end = range_end + Duration::seconds(1);

        let set = Self::rule_set(occurrence, rule)?
            .after(rrule::Tz::UTC.from_utc_datetime(&window_start.naive_utc()))
            .before(rrule::Tz::UTC.from_utc_datetime(&window_end.naive_utc()));

        let result = set.all(MAX_OCCURRENCES);
        if result.limited {
            warn!(
                "Recurrence for {} truncated at {} instances",
                occurrence.date_id, MAX_OCCURRENCES
            );
        }

        let pairs: Vec<_> = result
            .dates
            .into_iter()
            .map(|start| start.with_timezone(&Utc))
            .filter(|start| !occurrence.recurrence_exceptions.contains(start))
            .map(|start| (start, start + duration))
            .filter(|(start, end)| *end >= range_start && *start <= range_end)
            .collect();

        debug!("Expanded {} into {} instances", occurrence.date_id, pairs.len());
        Ok(pairs)
    }
}
