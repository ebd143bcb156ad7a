// Benchmark for month layout
// Measures splitting, packing and assembly of a busy month

use calendar_grid::models::record::RawRecord;
use calendar_grid::{CalendarRenderer, CalendarSettings, RRuleExpander};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

/// `count` records spread over April 2025, every fifth one spanning several days.
fn records(count: i64) -> Vec<RawRecord> {
    (0..count)
        .map(|i| {
            let day = 1 + i % 28;
            let hour = 8 + i % 10;
            let end_day = if i % 5 == 0 { (day + 1 + i % 4).min(30) } else { day };
            serde_json::from_value(json!({
                "entity_id": i,
                "values": [{
                    "value": format!("2025-04-{:02}T{:02}:00:00", day, hour),
                    "end_value": format!("2025-04-{:02}T{:02}:45:00", end_day, hour),
                }]
            }))
            .unwrap()
        })
        .collect()
}

fn bench_month_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("month_render");
    let settings = CalendarSettings::default();
    let expander = RRuleExpander::new();
    let renderer = CalendarRenderer::new(&settings, &expander);
    let today = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();

    for count in [10, 100, 1000].iter() {
        let input = records(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, input| {
            b.iter(|| renderer.render(black_box(input), black_box(Some("2025-04")), today));
        });
    }

    group.finish();
}

fn bench_recurring_week(c: &mut Criterion) {
    let settings: CalendarSettings = toml::from_str("calendar_type = \"week\"").unwrap();
    let expander = RRuleExpander::new();
    let renderer = CalendarRenderer::new(&settings, &expander);
    let today = NaiveDate::from_ymd_opt(2025, 4, 15).unwrap();
    let input: Vec<RawRecord> = serde_json::from_value(json!([{
        "entity_id": 1,
        "values": [{
            "value": "2020-01-01T09:00:00",
            "end_value": "2020-01-01T09:30:00",
            "rrule": "FREQ=DAILY"
        }]
    }]))
    .unwrap();

    c.bench_function("recurring_daily_week", |b| {
        b.iter(|| renderer.render(black_box(&input), black_box(Some("202516")), today));
    });
}

criterion_group!(benches, bench_month_render, bench_recurring_week);
criterion_main!(benches);
