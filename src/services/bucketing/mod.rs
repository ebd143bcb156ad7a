// Time bucketing service
// Maps an event start to the time-of-day group it is listed under

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use log::debug;

use crate::utils::date::to_local;

/// A normalized, configured group boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Boundary {
    seconds: u32,
    label: String,
}

/// Sorted time-of-day boundaries used to group same-day items.
///
/// Boundaries that do not parse as `HH:MM` or `HH:MM:SS` are dropped, so a
/// bad configuration degrades to fewer buckets instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketBoundaries {
    boundaries: Vec<Boundary>,
}

impl BucketBoundaries {
    pub fn parse<S: AsRef<str>>(groups: &[S]) -> Self {
        let mut boundaries: Vec<Boundary> = groups
            .iter()
            .filter_map(|group| {
                let normalized = normalize_group_time(group.as_ref());
                if normalized.is_none() && !group.as_ref().trim().is_empty() {
                    debug!("Dropping unparseable group boundary {:?}", group.as_ref());
                }
                normalized
            })
            .collect();

        boundaries.sort_by_key(|b| b.seconds);
        boundaries.dedup_by_key(|b| b.seconds);
        Self { boundaries }
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.boundaries.iter().map(|b| b.label.as_str())
    }

    /// Label of the last boundary not later than `time`.
    ///
    /// Times before the first boundary fall into the first bucket. Without
    /// boundaries the exact `HH:MM:SS` of `time` is returned.
    pub fn floor_label(&self, time: NaiveTime) -> String {
        let Some(first) = self.boundaries.first() else {
            return format_time(time);
        };

        let seconds = time.num_seconds_from_midnight();
        self.boundaries
            .iter()
            .take_while(|b| b.seconds <= seconds)
            .last()
            .unwrap_or(first)
            .label
            .clone()
    }
}

fn format_time(time: NaiveTime) -> String {
    format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second())
}

fn normalize_group_time(group: &str) -> Option<Boundary> {
    let group = group.trim();
    if group.is_empty() {
        return None;
    }

    let format = if group.len() == 5 { "%H:%M" } else { "%H:%M:%S" };
    let time = NaiveTime::parse_from_str(group, format).ok()?;
    Some(Boundary {
        seconds: time.num_seconds_from_midnight(),
        label: format_time(time),
    })
}

/// Bucket label for an instant, read on the display time zone's wall clock.
///
/// Only the wall-clock time of day matters, so two instants showing the same
/// local time land in the same bucket even across a DST change.
pub fn bucket_floor(instant: DateTime<Utc>, boundaries: &BucketBoundaries, tz: Tz) -> String {
    boundaries.floor_label(to_local(instant, tz).time())
}
