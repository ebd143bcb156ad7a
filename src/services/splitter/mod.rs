// Day splitting service
// Turns raw records into per-day occurrence fragments for one render pass

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, NaiveTime};
use log::{debug, warn};

use crate::models::occurrence::{DaySegment, EventOccurrence, Stripe};
use crate::models::range::VisibleRange;
use crate::models::record::RawRecord;
use crate::models::settings::{LegendMode, LegendSettings, EMPTY_STRIPE};
use crate::models::style::TimeGranularity;
use crate::services::recurrence::RecurrenceExpander;
use crate::utils::date::{day_end_naive, days_between, is_all_day};

/// Day fragments keyed by calendar day, each day ordered by wall-clock start.
pub type DayItems = BTreeMap<NaiveDate, Vec<EventOccurrence>>;

/// Splits one logical event into per-day fragments.
pub struct DayEventSplitter<'a> {
    expander: &'a dyn RecurrenceExpander,
    granularity: TimeGranularity,
    increment: u32,
}

impl<'a> DayEventSplitter<'a> {
    pub fn new(expander: &'a dyn RecurrenceExpander, granularity: TimeGranularity, increment: u32) -> Self {
        Self {
            expander,
            granularity,
            increment,
        }
    }

    /// Expand `occurrence` into fragments for every visible day it covers.
    ///
    /// Recurring occurrences are first expanded into concrete instances.
    /// Fragments come back ordered by day and never fall outside `range`.
    pub fn split_by_day(&self, occurrence: &EventOccurrence, range: &VisibleRange) -> Vec<EventOccurrence> {
        if !occurrence.is_recurring() {
            return self.split_pair(occurrence, range);
        }

        let pairs = match self.expander.occurrences(occurrence, range.min, range.max) {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!("Skipping {}: {}", occurrence.date_id, e);
                return Vec::new();
            }
        };

        let mut fragments = Vec::new();
        for (start, end) in pairs {
            let mut instance = occurrence.clone();
            instance.start = start;
            instance.end = end.max(start);
            instance.recurrence_rule = None;
            instance.recurrence_exceptions.clear();
            fragments.extend(self.split_pair(&instance, range));
        }
        fragments.sort_by_key(|fragment| fragment.day());
        fragments
    }

    fn split_pair(&self, occurrence: &EventOccurrence, range: &VisibleRange) -> Vec<EventOccurrence> {
        let mut occurrence = occurrence.clone();
        occurrence.timezone = range.timezone;

        let local_start = occurrence.local_start();
        let local_end = occurrence.local_end();
        let true_first = occurrence.first_day();
        let first = true_first.max(range.min_date());
        let last = occurrence.last_day().min(range.max_date());
        let instantaneous = occurrence.start == occurrence.end;

        if first > last {
            return Vec::new();
        }

        let mut fragments = Vec::new();
        for date in first.iter_days().take_while(|day| *day <= last) {
            let day_start = date.and_time(NaiveTime::default());
            let segment_start = local_start.max(day_start);
            let segment_end = local_end.min(day_end_naive(date));

            if segment_start > segment_end {
                continue;
            }
            if segment_start == segment_end && segment_end == day_start && !instantaneous && date != true_first {
                debug!("Skipping zero-length day {} of {}", date, occurrence.date_id);
                continue;
            }

            let position = days_between(true_first, date).max(0) as u32;
            let mut fragment = occurrence.clone();
            fragment.all_day = is_all_day(segment_start, segment_end, self.granularity, self.increment);
            fragment.multi_day = last > first;
            fragment.continuation = true_first < date;
            fragment.continues = occurrence.last_day() > date;
            fragment.date_id = format!("{}.{}", occurrence.date_id, position);
            fragment.segment = Some(DaySegment {
                date,
                position,
                start: segment_start,
                end: segment_end,
            });
            fragments.push(fragment);
        }

        fragments
    }
}

/// Gathers every record of a render pass into day buckets.
///
/// Owns the already-rendered id set, so a record seen twice in one pass is
/// only emitted once.
pub struct EventCollector<'a> {
    splitter: DayEventSplitter<'a>,
    legend: &'a LegendSettings,
    rendered_ids: HashSet<i64>,
}

impl<'a> EventCollector<'a> {
    pub fn new(splitter: DayEventSplitter<'a>, legend: &'a LegendSettings) -> Self {
        Self {
            splitter,
            legend,
            rendered_ids: HashSet::new(),
        }
    }

    /// Mark `id` as rendered; false if it already was.
    pub fn mark_rendered(&mut self, id: i64) -> bool {
        self.rendered_ids.insert(id)
    }

    pub fn collect(&mut self, records: &[RawRecord], range: &VisibleRange) -> DayItems {
        let mut items = DayItems::new();

        for record in records {
            if !self.mark_rendered(record.entity_id) {
                debug!("Record {} already rendered in this pass", record.entity_id);
                continue;
            }

            for delta in 0..record.values.len() {
                let occurrence = match record.occurrence(delta, range.timezone) {
                    Ok(occurrence) => occurrence,
                    Err(e) => {
                        debug!("Skipping value: {}", e);
                        continue;
                    }
                };

                for mut fragment in self.splitter.split_by_day(&occurrence, range) {
                    apply_legend(&mut fragment, record, self.legend);
                    items.entry(fragment.day()).or_default().push(fragment);
                }
            }
        }

        for day in items.values_mut() {
            day.sort_by_key(|fragment| fragment.sort_key());
        }
        items
    }
}

/// Append the legend stripes configured for this record.
pub fn apply_legend(occurrence: &mut EventOccurrence, record: &RawRecord, legend: &LegendSettings) {
    match legend.mode {
        LegendMode::None => {}
        LegendMode::Type => {
            let kind = record.legend_type();
            if let Some(color) = legend.type_colors.get(kind) {
                if color != EMPTY_STRIPE {
                    let label = legend.type_labels.get(kind).cloned().unwrap_or_else(|| kind.to_string());
                    occurrence.stripes.push(stripe(label, color));
                }
            }
        }
        LegendMode::Taxonomy => {
            for term in &record.terms {
                match legend.taxonomy_colors.get(&term.id) {
                    Some(color) if color != EMPTY_STRIPE => {
                        occurrence.stripes.push(stripe(term.label.clone(), color));
                    }
                    _ => {}
                }
            }
        }
    }
}

fn stripe(label: String, color: &str) -> Stripe {
    Stripe {
        label,
        color: color.to_string(),
    }
}
