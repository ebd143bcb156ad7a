// Property-based tests for bucketing, packing and splitting
// Checks layout invariants over random inputs

#[path = "../fixtures/mod.rs"]
mod fixtures;

use calendar_grid::models::occurrence::EventOccurrence;
use calendar_grid::models::style::{MaxItemsBehavior, StyleOptions, TimeGranularity};
use calendar_grid::services::bucketing::{bucket_floor, BucketBoundaries};
use calendar_grid::services::grid::GridAssembler;
use calendar_grid::services::packer::{Placement, WeekSlotPacker};
use calendar_grid::services::recurrence::RRuleExpander;
use calendar_grid::services::splitter::DayEventSplitter;
use calendar_grid::utils::date::days_between;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use fixtures::{april, collect, date, record};
use proptest::prelude::*;

fn occurrence(id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> EventOccurrence {
    EventOccurrence::builder()
        .entity(id, "node")
        .date_id(format!("calendar.{}.field_date.0", id))
        .start(start)
        .end(end)
        .build()
        .unwrap()
}

proptest! {
    /// Property: the same wall-clock time lands in the same bucket in winter and summer
    #[test]
    fn prop_bucket_ignores_utc_offset(
        hour in 0..24u32,
        minute in 0..60u32,
        second in 0..60u32,
        slots in proptest::collection::vec(0..48u32, 0..10),
    ) {
        let tz: Tz = "America/New_York".parse().unwrap();
        let labels: Vec<String> = slots
            .iter()
            .map(|slot| format!("{:02}:{:02}:00", slot / 2, (slot % 2) * 30))
            .collect();
        let boundaries = BucketBoundaries::parse(&labels);

        let winter = tz.with_ymd_and_hms(2024, 1, 15, hour, minute, second).single().unwrap();
        let summer = tz.with_ymd_and_hms(2024, 7, 15, hour, minute, second).single().unwrap();
        prop_assert_eq!(
            bucket_floor(winter.with_timezone(&Utc), &boundaries, tz),
            bucket_floor(summer.with_timezone(&Utc), &boundaries, tz)
        );
    }

    /// Property: bands in one row never share a column, and spans stay inside the row and event
    #[test]
    fn prop_bands_do_not_overlap(
        events in proptest::collection::vec((0..9i64, 0..24i64, 1..200i64), 1..12),
    ) {
        let week_start = date(2025, 4, 6);
        let visible_last = date(2025, 4, 30);
        let base = Utc.with_ymd_and_hms(2025, 4, 4, 0, 0, 0).unwrap();
        let occurrences: Vec<_> = events
            .iter()
            .enumerate()
            .map(|(i, (day, hour, hours))| {
                let start = base + Duration::days(*day) + Duration::hours(*hour);
                occurrence(i as i64, start, start + Duration::hours(*hours) + Duration::minutes(1))
            })
            .collect();

        let mut packer = WeekSlotPacker::new(0);
        packer.start_week();
        let mut bands = Vec::new();
        for column in 0..7usize {
            let day = week_start + Duration::days(column as i64);
            for (id, occ) in occurrences.iter().enumerate() {
                if occ.first_day() > day || occ.last_day() < day {
                    continue;
                }
                if let Placement::Band { row, colspan, .. } = packer.place(occ, day, visible_last) {
                    prop_assert!(colspan >= 1);
                    prop_assert!(colspan as i64 <= days_between(day, occ.last_day()) + 1);
                    prop_assert!(column + colspan <= 7);
                    bands.push((row, column, column + colspan, id));
                }
            }
        }

        for (i, a) in bands.iter().enumerate() {
            for b in bands.iter().skip(i + 1) {
                if a.0 == b.0 && a.3 != b.3 {
                    prop_assert!(a.2 <= b.1 || b.2 <= a.1, "overlap {:?} {:?}", a, b);
                }
            }
        }
    }

    /// Property: one fragment per visible day between the clamped start and end
    #[test]
    fn prop_split_covers_every_day(
        start_minutes in 0..(60 * 24 * 50i64),
        length_minutes in 0..(60 * 24 * 20i64),
    ) {
        let origin = Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap();
        let start = origin + Duration::minutes(start_minutes);
        let end = start + Duration::minutes(length_minutes);
        prop_assume!(length_minutes == 0 || end.time() != NaiveTime::default());

        let range = april();
        let expander = RRuleExpander::new();
        let splitter = DayEventSplitter::new(&expander, TimeGranularity::Second, 1);
        let fragments = splitter.split_by_day(&occurrence(1, start, end), &range);

        let first = start.date_naive().max(range.min_date());
        let last = end.date_naive().min(range.max_date());
        let expected = if first > last { 0 } else { days_between(first, last) + 1 };
        prop_assert_eq!(fragments.len() as i64, expected);

        for (i, fragment) in fragments.iter().enumerate() {
            prop_assert_eq!(fragment.day(), first + Duration::days(i as i64));
        }
    }

    /// Property: max-items keeps k items plus a more link, or only the link when hiding
    #[test]
    fn prop_max_items_truncation(n in 2..12i64, k in 1..11u32, hide in any::<bool>()) {
        prop_assume!((k as i64) < n);
        let records: Vec<_> = (0..n)
            .map(|i| record(
                i,
                &format!("2025-04-17T{:02}:00:00", 8 + i),
                &format!("2025-04-17T{:02}:30:00", 8 + i),
            ))
            .collect();
        let range = april();
        let items = collect(&records, &range);
        let style = StyleOptions {
            max_items: k,
            max_items_behavior: if hide { MaxItemsBehavior::Hide } else { MaxItemsBehavior::More },
            ..Default::default()
        };
        let assembler = GridAssembler::new(&style, &range, &items, "calendar");
        let weeks = assembler.pack_weeks();

        let column = &weeks[2].single_day[4];
        let more = column.more.as_ref().unwrap();
        if hide {
            prop_assert_eq!(column.item_count(), 0);
            prop_assert_eq!(more.count, n as usize);
        } else {
            prop_assert_eq!(column.item_count(), k as usize);
            prop_assert_eq!(more.count, (n - k as i64) as usize);
            prop_assert_eq!(more.hidden_ids.len(), more.count);
        }
    }
}
