// Integration tests for full render passes
mod fixtures;

use calendar_grid::models::grid::{CalendarGrid, CellContent};
use calendar_grid::models::range::Granularity;
use calendar_grid::models::style::{GroupByTimes, MaxItemsBehavior, StyleOptions};
use calendar_grid::services::grid::{GridAssembler, MultiDayCell};
use calendar_grid::services::settings::SettingsService;
use calendar_grid::{CalendarRenderer, CalendarSettings, RRuleExpander, RenderStage};
use fixtures::{april, collect, date, record, recurring, today};
use pretty_assertions::assert_eq;

#[test]
fn test_ungrouped_times_are_not_merged() {
    let range = april();
    let items = collect(
        &[
            record(1, "2025-04-01T09:00:00", "2025-04-01T10:00:00"),
            record(2, "2025-04-01T09:30:00", "2025-04-01T09:45:00"),
            record(3, "2025-04-01T09:40:00", "2025-04-01T09:50:00"),
        ],
        &range,
    );
    let style = StyleOptions {
        group_by_times: GroupByTimes::None,
        ..Default::default()
    };
    let assembler = GridAssembler::new(&style, &range, &items, "calendar");
    let weeks = assembler.pack_weeks();

    let tuesday = &weeks[0].single_day[2];
    let labels: Vec<_> = tuesday.buckets.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["09:00:00", "09:30:00", "09:40:00"]);
    assert_eq!(tuesday.item_count(), 3);
}

#[test]
fn test_six_day_event_wraps_the_week() {
    let range = april();
    let items = collect(&[record(1, "2025-04-03T09:00:00", "2025-04-08T17:00:00")], &range);

    let days: Vec<_> = items.keys().copied().collect();
    assert_eq!(days, (3..=8).map(|d| date(2025, 4, d)).collect::<Vec<_>>());

    let style = StyleOptions::default();
    let assembler = GridAssembler::new(&style, &range, &items, "calendar");
    let weeks = assembler.pack_weeks();

    match &weeks[0].multi_day[4][0] {
        MultiDayCell::Entry { occurrence, colspan } => {
            assert_eq!(*colspan, 3);
            assert!(occurrence.continues);
            assert!(!occurrence.continuation);
        }
        other => panic!("expected a band, got {:?}", other),
    }
    match &weeks[1].multi_day[0][0] {
        MultiDayCell::Entry { occurrence, colspan } => {
            assert_eq!(*colspan, 3);
            assert!(occurrence.continuation);
            assert!(!occurrence.continues);
        }
        other => panic!("expected a band, got {:?}", other),
    }
}

#[test]
fn test_single_boundary_collects_every_item() {
    let range = april();
    let items = collect(
        &[
            record(1, "2025-04-22T01:00:00", "2025-04-22T02:00:00"),
            record(2, "2025-04-22T13:15:00", "2025-04-22T14:00:00"),
            record(3, "2025-04-22T22:59:00", "2025-04-22T23:10:00"),
        ],
        &range,
    );
    let style = StyleOptions {
        group_by_times: GroupByTimes::Custom(vec!["00:00:00".to_string()]),
        ..Default::default()
    };
    let assembler = GridAssembler::new(&style, &range, &items, "calendar");
    let weeks = assembler.pack_weeks();

    let column = &weeks[3].single_day[2];
    assert_eq!(column.buckets.len(), 1);
    assert_eq!(column.buckets[0].label, "00:00:00");
    assert_eq!(column.buckets[0].items.len(), 3);
}

#[test]
fn test_recurring_record_lands_on_each_instance() {
    let range = april();
    let items = collect(
        &[recurring(7, "2025-04-01T18:00:00", "2025-04-01T19:00:00", "FREQ=WEEKLY;COUNT=10")],
        &range,
    );

    let days: Vec<_> = items.keys().copied().collect();
    assert_eq!(
        days,
        vec![date(2025, 4, 1), date(2025, 4, 8), date(2025, 4, 15), date(2025, 4, 22), date(2025, 4, 29)]
    );
}

#[test]
fn test_month_render_serializes() {
    let settings = CalendarSettings::default();
    let expander = RRuleExpander::new();
    let records = vec![
        record(1, "2025-04-03T09:00:00", "2025-04-08T17:00:00"),
        record(2, "2025-04-10", "2025-04-10"),
    ];
    let output = CalendarRenderer::new(&settings, &expander).render(&records, Some("2025-04"), today());
    assert_eq!(output.stage, RenderStage::Rendered);

    let value = serde_json::to_value(&output).unwrap();
    assert_eq!(value["stage"], "rendered");
    assert_eq!(value["grid"]["type"], "month");
    assert_eq!(value["grid"]["weeks"].as_array().map(Vec::len), Some(5));
}

#[test]
fn test_week_render_aligns_to_first_day() {
    let settings = CalendarSettings {
        calendar_type: Granularity::Week,
        ..Default::default()
    };
    let expander = RRuleExpander::new();
    let records = vec![record(1, "2025-04-09T10:00:00", "2025-04-09T11:00:00")];
    let output = CalendarRenderer::new(&settings, &expander).render(&records, Some("202515"), today());

    let CalendarGrid::Week(week) = output.grid else {
        panic!("expected a week grid");
    };
    assert_eq!(week.week.start, date(2025, 4, 6));
    assert_eq!(week.header.cells.len(), 7);
    let date_boxes: Vec<_> = week.week.rows[0].cells.iter().filter_map(|c| c.date).collect();
    assert_eq!(date_boxes.first(), Some(&date(2025, 4, 6)));
    assert_eq!(date_boxes.last(), Some(&date(2025, 4, 12)));
}

#[test]
fn test_day_render() {
    let settings = CalendarSettings {
        calendar_type: Granularity::Day,
        ..Default::default()
    };
    let expander = RRuleExpander::new();
    let records = vec![
        record(1, "2025-04-10T10:20:00", "2025-04-10T11:00:00"),
        record(2, "2025-04-10", "2025-04-10"),
    ];
    let output = CalendarRenderer::new(&settings, &expander).render(&records, Some("2025-04-10"), today());

    let CalendarGrid::Day(day) = output.grid else {
        panic!("expected a day grid");
    };
    assert_eq!(day.all_day.len(), 1);
    assert_eq!(day.buckets.len(), 1);
    assert_eq!(day.buckets[0].label, "10:00:00");
    assert!(!day.empty);
}

#[test]
fn test_year_render_flags_event_days() {
    let settings = CalendarSettings {
        calendar_type: Granularity::Year,
        ..Default::default()
    };
    let expander = RRuleExpander::new();
    let records = vec![record(1, "2025-11-05T08:00:00", "2025-11-05T09:00:00")];
    let output = CalendarRenderer::new(&settings, &expander).render(&records, Some("2025"), today());

    let CalendarGrid::Year { months, .. } = output.grid else {
        panic!("expected a year grid");
    };
    let flagged: Vec<_> = months
        .iter()
        .flat_map(|m| m.weeks.iter())
        .flat_map(|w| w.rows[0].cells.iter())
        .filter(|c| matches!(c.content, CellContent::Mini { has_events: true, .. }))
        .filter_map(|c| c.date)
        .collect();
    assert_eq!(flagged, vec![date(2025, 11, 5)]);
}

#[test]
fn test_max_items_policies() {
    let records: Vec<_> = (0..6)
        .map(|i| {
            record(
                i,
                &format!("2025-04-17T{:02}:00:00", 8 + i),
                &format!("2025-04-17T{:02}:30:00", 8 + i),
            )
        })
        .collect();
    let expander = RRuleExpander::new();

    for (behavior, shown, count) in [(MaxItemsBehavior::More, 2, 4), (MaxItemsBehavior::Hide, 0, 6)] {
        let mut settings = CalendarSettings::default();
        settings.style.max_items = 2;
        settings.style.max_items_behavior = behavior;
        let output = CalendarRenderer::new(&settings, &expander).render(&records, Some("2025-04"), today());

        let CalendarGrid::Month(month) = output.grid else {
            panic!("expected a month grid");
        };
        let cell = month
            .weeks
            .iter()
            .flat_map(|w| w.rows.iter().skip(1))
            .flat_map(|r| r.cells.iter())
            .find(|c| c.date == Some(date(2025, 4, 17)))
            .unwrap();
        let CellContent::SingleDay { buckets, more } = &cell.content else {
            panic!("expected a single-day cell");
        };
        let visible: usize = buckets.iter().map(|b| b.items.len()).sum();
        assert_eq!(visible, shown);
        assert_eq!(more.as_ref().map(|m| m.count), Some(count));
    }
}

#[test]
fn test_configuration_errors_produce_empty_grid() {
    let settings = SettingsService::parse_str("calendar_type = \"month\"\n").unwrap();
    let expander = RRuleExpander::new();
    let output = CalendarRenderer::new(&settings, &expander).render(&[], Some("April"), today());

    assert_eq!(output.stage, RenderStage::Idle);
    assert!(output.grid.is_empty());
    assert_eq!(output.messages.len(), 1);
}
