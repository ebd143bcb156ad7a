// Grid assembly service
// Merges packed multi-day bands and bucketed single-day items into cell matrices

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use log::debug;

use crate::models::grid::{
    CalendarGrid, CellContent, CellState, DayGrid, GridCell, GridRow, MonthGrid, MoreLink, RowKind,
    TimeBucket, WeekBlock, WeekGrid,
};
use crate::models::occurrence::EventOccurrence;
use crate::models::range::{last_day_of_month, Granularity, VisibleRange};
use crate::models::style::{MaxItemsBehavior, StyleOptions};
use crate::services::bucketing::{bucket_floor, BucketBoundaries};
use crate::services::packer::{Placement, WeekSlotPacker, DAYS_PER_WEEK};
use crate::services::splitter::DayItems;
use crate::utils::date::{
    date_week, get_week_start, is_future_month, is_past_month, ordered_weekdays, weekday_name,
};

/// One day column of the multi-day band rows.
#[derive(Debug, Clone, PartialEq)]
pub enum MultiDayCell {
    /// First day of a band in this row
    Entry {
        occurrence: EventOccurrence,
        colspan: usize,
    },
    /// Day spanned by a band starting further left
    Covered { occurrence: EventOccurrence },
    /// Filler below or between bands; `available` when the slot is free
    Blank { available: bool },
}

impl MultiDayCell {
    pub fn is_entry(&self) -> bool {
        !matches!(self, MultiDayCell::Blank { .. })
    }
}

/// Single-day items of one day column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SingleDayColumn {
    pub buckets: Vec<TimeBucket>,
    pub more: Option<MoreLink>,
    pub in_range: bool,
}

impl SingleDayColumn {
    pub fn item_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.items.len()).sum()
    }

    /// No visible items and no overflow link.
    pub fn is_empty(&self) -> bool {
        self.item_count() == 0 && self.more.is_none()
    }
}

/// Layout of one week before it is turned into rows.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekBuckets {
    pub start: NaiveDate,
    /// Per column, per band row
    pub multi_day: Vec<Vec<MultiDayCell>>,
    pub single_day: Vec<SingleDayColumn>,
    /// Band rows plus the single-day row
    pub total_rows: usize,
}

impl WeekBuckets {
    pub fn date(&self, column: usize) -> NaiveDate {
        self.start + Duration::days(column as i64)
    }
}

/// Turns day items into year, month, week and day grids.
pub struct GridAssembler<'a> {
    style: &'a StyleOptions,
    range: &'a VisibleRange,
    items: &'a DayItems,
    view_id: &'a str,
    boundaries: BucketBoundaries,
}

impl<'a> GridAssembler<'a> {
    pub fn new(style: &'a StyleOptions, range: &'a VisibleRange, items: &'a DayItems, view_id: &'a str) -> Self {
        Self {
            style,
            range,
            items,
            view_id,
            boundaries: BucketBoundaries::parse(&style.group_by_times.boundaries()),
        }
    }

    fn first_day(&self) -> u8 {
        self.style.first_day_of_week
    }

    fn in_view(&self, date: NaiveDate, focal_month: Option<u32>) -> bool {
        self.range.contains_date(date) && focal_month.map_or(true, |month| date.month() == month)
    }

    fn shows_week_numbers(&self) -> bool {
        self.style.show_week_numbers
            && matches!(self.range.granularity, Granularity::Month | Granularity::Year)
    }

    /// Styling flags that depend only on the date.
    pub fn day_state(&self, date: NaiveDate, focal_month: Option<u32>, in_range: bool) -> CellState {
        let today = self.range.today;
        CellState {
            today: date == today && in_range,
            past: date < today,
            future: date > today,
            past_month: focal_month.map_or(false, |month| is_past_month(date.month(), month)),
            future_month: focal_month.map_or(false, |month| is_future_month(date.month(), month)),
            empty: !in_range,
            ..Default::default()
        }
    }

    fn bucket_label(&self, occurrence: &EventOccurrence) -> String {
        match &occurrence.segment {
            Some(segment) if occurrence.continuation => self.boundaries.floor_label(segment.start.time()),
            _ => bucket_floor(occurrence.start, &self.boundaries, self.range.timezone),
        }
    }

    /// Group items by bucket label; labels sort chronologically.
    fn group_by_bucket<'i>(&self, items: impl IntoIterator<Item = &'i EventOccurrence>) -> Vec<TimeBucket> {
        let mut grouped: BTreeMap<String, Vec<EventOccurrence>> = BTreeMap::new();
        for occurrence in items {
            grouped
                .entry(self.bucket_label(occurrence))
                .or_default()
                .push(occurrence.clone());
        }
        grouped
            .into_iter()
            .map(|(label, items)| TimeBucket { label, items })
            .collect()
    }

    fn day_link(&self, date: NaiveDate) -> Option<String> {
        self.style
            .granularity_links
            .day_url(&date.format("%Y-%m-%d").to_string())
    }

    /// Bucket one day's single-day items and apply the max-items policy.
    fn single_day_column(&self, date: NaiveDate, items: Vec<&EventOccurrence>) -> SingleDayColumn {
        let total = items.len();
        let mut buckets = self.group_by_bucket(items);
        let mut more = None;

        if self.style.truncates(total) {
            let keep = match self.style.max_items_behavior {
                MaxItemsBehavior::More => self.style.max_items as usize,
                MaxItemsBehavior::Hide => 0,
            };

            let mut shown = 0;
            let mut hidden_ids = Vec::new();
            for bucket in &mut buckets {
                let room = keep - shown.min(keep);
                if bucket.items.len() > room {
                    hidden_ids.extend(bucket.items.drain(room..).map(|item| item.date_id));
                }
                shown += bucket.items.len();
            }
            buckets.retain(|bucket| !bucket.items.is_empty());

            debug!("{}: showing {} of {} items", date, shown, total);
            more = Some(MoreLink {
                date,
                count: total - shown,
                hidden_ids,
                link: self.day_link(date),
                behavior: self.style.max_items_behavior.as_str().to_string(),
            });
        }

        SingleDayColumn {
            buckets,
            more,
            in_range: true,
        }
    }

    /// Lay out one week: bands through the packer, the rest into time buckets.
    ///
    /// With `focal_month` set, days outside that month are left empty.
    pub fn build_week(
        &self,
        packer: &mut WeekSlotPacker,
        week_start: NaiveDate,
        focal_month: Option<u32>,
    ) -> WeekBuckets {
        packer.start_week();
        let visible_last = self.range.max_date();
        let mut bands: Vec<Vec<Option<MultiDayCell>>> = vec![Vec::new(); DAYS_PER_WEEK];
        let mut single_day = Vec::with_capacity(DAYS_PER_WEEK);

        for (column, column_bands) in bands.iter_mut().enumerate() {
            let date = week_start + Duration::days(column as i64);
            if !self.in_view(date, focal_month) {
                single_day.push(SingleDayColumn::default());
                continue;
            }

            let mut singles = Vec::new();
            for occurrence in self.items.get(&date).into_iter().flatten() {
                if !occurrence.wants_band(self.style.multi_day_theme) {
                    singles.push(occurrence);
                    continue;
                }

                let mut occurrence = occurrence.clone();
                let (row, cell) = match packer.place(&occurrence, date, visible_last) {
                    Placement::Band {
                        row,
                        colspan,
                        continuation,
                        continues,
                    } => {
                        occurrence.continuation = continuation;
                        occurrence.continues = continues;
                        (row, MultiDayCell::Entry { occurrence, colspan })
                    }
                    Placement::Covered { row } => (row, MultiDayCell::Covered { occurrence }),
                };
                if column_bands.len() <= row {
                    column_bands.resize(row + 1, None);
                }
                column_bands[row] = Some(cell);
            }

            single_day.push(self.single_day_column(date, singles));
        }

        let matrix = packer.matrix();
        let multi_day: Vec<Vec<MultiDayCell>> = bands
            .into_iter()
            .enumerate()
            .map(|(column, cells)| {
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(row, cell)| {
                        cell.unwrap_or(MultiDayCell::Blank {
                            available: matrix.is_empty_cell(row, column),
                        })
                    })
                    .collect()
            })
            .collect();

        let band_rows = if self.style.multi_day_theme {
            multi_day.iter().map(Vec::len).max().unwrap_or(0)
        } else {
            0
        };

        WeekBuckets {
            start: week_start,
            multi_day,
            single_day,
            total_rows: band_rows + 1,
        }
    }

    /// Week starts covering every day of `year`-`month`.
    fn month_week_starts(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        let (Some(first), Ok(last)) = (NaiveDate::from_ymd_opt(year, month, 1), last_day_of_month(year, month)) else {
            return Vec::new();
        };

        let mut starts = Vec::new();
        let mut start = get_week_start(first, self.first_day());
        while start <= last {
            starts.push(start);
            start += Duration::days(DAYS_PER_WEEK as i64);
        }
        starts
    }

    /// Pack every week the full-size month or week view needs.
    pub fn pack_weeks(&self) -> Vec<WeekBuckets> {
        let mut packer = WeekSlotPacker::new(self.first_day());
        match self.range.granularity {
            Granularity::Month if !self.style.mini => {
                let (year, month) = self.range.focal_month();
                self.month_week_starts(year, month)
                    .into_iter()
                    .map(|start| self.build_week(&mut packer, start, Some(month)))
                    .collect()
            }
            Granularity::Week => {
                let start = get_week_start(self.range.min_date(), self.first_day());
                vec![self.build_week(&mut packer, start, None)]
            }
            // Mini months, years and days have no bands: `build_mini_month`
            // and `build_day` read day items directly.
            _ => Vec::new(),
        }
    }

    /// Day-name header row, with a leading week column when numbers are shown.
    pub fn header_row(&self) -> GridRow {
        let mut row = GridRow::new(RowKind::Header);
        if self.shows_week_numbers() {
            row.cells.push(
                GridCell::new(format!("{}-week-header", self.view_id), RowKind::Header, CellContent::WeekHeader)
                    .header("Week")
                    .styled("days week", CellState::default()),
            );
        }

        for day in ordered_weekdays(self.first_day()) {
            let full_name = weekday_name(day);
            let label = abbreviate(full_name, self.style.name_size);
            let class = format!("days {}", full_name.to_lowercase());
            row.cells.push(
                GridCell::new(
                    format!("{}-header-{}", self.view_id, full_name.to_lowercase()),
                    RowKind::Header,
                    CellContent::DayName {
                        label,
                        full_name: full_name.to_string(),
                    },
                )
                .header(full_name)
                .styled(&class, CellState::default()),
            );
        }
        row
    }

    fn week_number_cell(&self, start: NaiveDate, rowspan: u32) -> GridCell {
        let number = date_week(start, self.first_day());
        let argument = format!("{}{:02}", self.range.min_date().year(), number);
        let link = self.style.granularity_links.week_url(&argument);
        GridCell::new(
            format!("{}-weekno-{}", self.view_id, start),
            RowKind::DateBox,
            CellContent::WeekNumber { number, link },
        )
        .span(1, rowspan)
        .on(start)
        .styled("week", CellState::default())
    }

    fn multi_day_cell(
        &self,
        cell: &MultiDayCell,
        date: NaiveDate,
        index: usize,
        in_range: bool,
        focal_month: Option<u32>,
    ) -> GridCell {
        let id = format!("{}-{}-{}", self.view_id, date, index);
        let today = self.range.today;
        match cell {
            MultiDayCell::Entry { occurrence, colspan } => {
                let end_day = date + Duration::days(*colspan as i64 - 1);
                let state = CellState {
                    starts_today: date == today && in_range,
                    ends_today: end_day == today && in_range,
                    empty: !in_range,
                    ..Default::default()
                };
                GridCell::new(
                    id,
                    RowKind::MultiDay,
                    CellContent::Event {
                        occurrence: Box::new(occurrence.clone()),
                    },
                )
                .span(*colspan as u32, 1)
                .on(date)
                .styled("multi-day", state)
            }
            MultiDayCell::Covered { occurrence } => GridCell::new(
                id,
                RowKind::MultiDay,
                CellContent::Covered {
                    date_id: occurrence.date_id.clone(),
                },
            )
            .span(0, 1)
            .on(date),
            MultiDayCell::Blank { available } => {
                let state = if *available {
                    CellState {
                        no_entry: true,
                        ..self.day_state(date, focal_month, in_range)
                    }
                } else {
                    CellState {
                        empty: !in_range,
                        ..Default::default()
                    }
                };
                GridCell::new(id, RowKind::MultiDay, CellContent::Blank)
                    .on(date)
                    .styled("multi-day", state)
            }
        }
    }

    fn single_day_cell(
        &self,
        column: &SingleDayColumn,
        date: NaiveDate,
        index: usize,
        rowspan: usize,
        multi_count: usize,
        focal_month: Option<u32>,
    ) -> GridCell {
        let in_range = column.in_range;
        let mut state = self.day_state(date, focal_month, in_range);
        state.no_entry = column.is_empty() && multi_count == 0;

        let content = if in_range {
            CellContent::SingleDay {
                buckets: column.buckets.clone(),
                more: column.more.clone(),
            }
        } else {
            CellContent::EmptyDay
        };

        GridCell::new(format!("{}-{}-{}", self.view_id, date, index), RowKind::SingleDay, content)
            .span(1, rowspan as u32)
            .on(date)
            .header(weekday_name(date.weekday()))
            .styled("single-day", state)
    }

    /// Date-box row plus body rows for one packed week.
    pub fn week_block(&self, week: &WeekBuckets, focal_month: Option<u32>) -> WeekBlock {
        let total_rows = week.total_rows;
        let mut rows = Vec::with_capacity(total_rows + 1);

        let mut date_row = GridRow::new(RowKind::DateBox);
        if self.shows_week_numbers() {
            date_row
                .cells
                .push(self.week_number_cell(week.start, total_rows as u32 + 1));
        }
        for column in 0..DAYS_PER_WEEK {
            let date = week.date(column);
            let single = &week.single_day[column];
            let bands = &week.multi_day[column];
            let entries = bands.iter().filter(|cell| cell.is_entry()).count();

            let mut state = self.day_state(date, focal_month, single.in_range);
            state.selected = single.in_range && entries + single.item_count() > 0;
            state.no_entry = single.is_empty() && entries == 0;

            let link = if self.style.link_to_date && single.in_range {
                self.day_link(date)
            } else {
                None
            };
            date_row.cells.push(
                GridCell::new(
                    format!("{}-{}-date-box", self.view_id, date),
                    RowKind::DateBox,
                    CellContent::DateBox {
                        day_of_month: date.day(),
                        link,
                    },
                )
                .on(date)
                .header(weekday_name(date.weekday()))
                .styled("date-box", state),
            );
        }
        rows.push(date_row);

        for index in 0..total_rows {
            let kind = if index + 1 == total_rows {
                RowKind::SingleDay
            } else {
                RowKind::MultiDay
            };
            let mut row = GridRow::new(kind);
            for column in 0..DAYS_PER_WEEK {
                let date = week.date(column);
                let bands = &week.multi_day[column];
                let single = &week.single_day[column];
                let multi_count = if self.style.multi_day_theme { bands.len() } else { 0 };

                if index < multi_count {
                    row.cells
                        .push(self.multi_day_cell(&bands[index], date, index, single.in_range, focal_month));
                } else if index == multi_count {
                    row.cells.push(self.single_day_cell(
                        single,
                        date,
                        index,
                        total_rows - multi_count,
                        multi_count,
                        focal_month,
                    ));
                }
            }
            rows.push(row);
        }

        WeekBlock {
            start: week.start,
            week_number: date_week(week.start, self.first_day()),
            total_rows,
            rows,
        }
    }

    /// Full-size month from its packed weeks.
    pub fn build_month(&self, weeks: &[WeekBuckets]) -> MonthGrid {
        let (year, month) = self.range.focal_month();
        MonthGrid {
            year,
            month,
            mini: false,
            header: self.header_row(),
            weeks: weeks.iter().map(|week| self.week_block(week, Some(month))).collect(),
        }
    }

    /// Compact month with per-day "has events" flags only.
    pub fn build_mini_month(&self, year: i32, month: u32) -> MonthGrid {
        let weeks = self
            .month_week_starts(year, month)
            .into_iter()
            .map(|start| {
                let mut row = GridRow::new(RowKind::Mini);
                if self.shows_week_numbers() {
                    row.cells.push(self.week_number_cell(start, 1));
                }

                for offset in 0..DAYS_PER_WEEK {
                    let date = start + Duration::days(offset as i64);
                    let in_range = self.in_view(date, Some(month));
                    let has_events = in_range && self.items.get(&date).map_or(false, |items| !items.is_empty());

                    let mut state = self.day_state(date, Some(month), in_range);
                    state.has_events = has_events;
                    let content = if in_range {
                        CellContent::Mini {
                            day_of_month: date.day(),
                            has_events,
                            link: self.day_link(date),
                        }
                    } else {
                        CellContent::EmptyDay
                    };

                    let class = format!("{} mini", weekday_name(date.weekday()).to_lowercase());
                    row.cells.push(
                        GridCell::new(format!("{}-{}", self.view_id, date), RowKind::Mini, content)
                            .on(date)
                            .styled(&class, state),
                    );
                }

                WeekBlock {
                    start,
                    week_number: date_week(start, self.first_day()),
                    total_rows: 1,
                    rows: vec![row],
                }
            })
            .collect();

        MonthGrid {
            year,
            month,
            mini: true,
            header: self.header_row(),
            weeks,
        }
    }

    /// Twelve mini months.
    pub fn build_year(&self) -> CalendarGrid {
        let (year, _) = self.range.focal_month();
        CalendarGrid::Year {
            year,
            months: (1..=12).map(|month| self.build_mini_month(year, month)).collect(),
        }
    }

    /// One day: all-day items apart, the rest bucketed by time.
    pub fn build_day(&self, date: NaiveDate) -> DayGrid {
        let in_range = self.range.contains_date(date);
        let items: Vec<&EventOccurrence> = self.items.get(&date).into_iter().flatten().collect();

        let (all_day, timed): (Vec<&EventOccurrence>, Vec<&EventOccurrence>) = if self.style.mini {
            (Vec::new(), Vec::new())
        } else {
            items.iter().copied().partition(|occurrence| occurrence.all_day)
        };

        let mut buckets = self.group_by_bucket(timed);
        if self.style.group_by_times.shows_empty_times() {
            for label in self.boundaries.labels() {
                if !buckets.iter().any(|bucket| bucket.label == label) {
                    buckets.push(TimeBucket {
                        label: label.to_string(),
                        items: Vec::new(),
                    });
                }
            }
            buckets.sort_by(|a, b| a.label.cmp(&b.label));
        }

        let empty = if self.style.mini {
            items.is_empty()
        } else {
            all_day.is_empty() && buckets.iter().all(|bucket| bucket.items.is_empty())
        };

        let mut state = self.day_state(date, None, in_range);
        state.has_events = !items.is_empty();
        state.selected = !items.is_empty();

        DayGrid {
            date,
            all_day: all_day.into_iter().cloned().collect(),
            empty,
            buckets,
            state,
            link: self.day_link(date),
        }
    }

    /// Build the grid for the range's granularity from its packed weeks.
    pub fn assemble(&self, weeks: Vec<WeekBuckets>) -> CalendarGrid {
        match self.range.granularity {
            Granularity::Year => self.build_year(),
            Granularity::Month if self.style.mini => {
                let (year, month) = self.range.focal_month();
                CalendarGrid::Month(self.build_mini_month(year, month))
            }
            Granularity::Month => CalendarGrid::Month(self.build_month(&weeks)),
            Granularity::Week => match weeks.first() {
                Some(week) => CalendarGrid::Week(WeekGrid {
                    header: self.header_row(),
                    week: self.week_block(week, None),
                }),
                None => CalendarGrid::Empty,
            },
            Granularity::Day => CalendarGrid::Day(self.build_day(self.range.min_date())),
        }
    }
}

/// Shorten a day name to `size` characters; 99 keeps the full name.
pub fn abbreviate(name: &str, size: u8) -> String {
    match size {
        99 => name.to_string(),
        size => name.chars().take(size.max(1) as usize).collect(),
    }
}
