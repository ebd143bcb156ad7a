// Grid module
// Render-ready cell matrices handed to the templating layer

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::occurrence::EventOccurrence;

/// Row role inside a calendar table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Header,
    DateBox,
    MultiDay,
    SingleDay,
    Mini,
}

impl RowKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            RowKind::Header => "days",
            RowKind::DateBox => "date-box",
            RowKind::MultiDay => "multi-day",
            RowKind::SingleDay => "single-day",
            RowKind::Mini => "mini",
        }
    }
}

/// Styling state of a day cell, derived from its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CellState {
    pub today: bool,
    pub past: bool,
    pub future: bool,
    pub past_month: bool,
    pub future_month: bool,
    /// Outside the focal month or the visible range
    pub empty: bool,
    pub no_entry: bool,
    pub starts_today: bool,
    pub ends_today: bool,
    pub has_events: bool,
    pub selected: bool,
}

impl CellState {
    /// CSS classes in the order the templates expect them.
    pub fn classes(&self) -> Vec<&'static str> {
        let flags = [
            (self.no_entry, "no-entry"),
            (self.starts_today, "starts-today"),
            (self.ends_today, "ends-today"),
            (self.today, "today"),
            (self.past, "past"),
            (self.future, "future"),
            (self.past_month, "past-month"),
            (self.future_month, "future-month"),
            (self.has_events, "has-events"),
            (self.selected, "selected"),
            (self.empty, "empty"),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, class)| *class)
            .collect()
    }
}

/// Items sharing one time-of-day bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucket {
    /// `HH:MM:SS` floor label
    pub label: String,
    pub items: Vec<EventOccurrence>,
}

/// Synthetic overflow cell for days with more items than allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoreLink {
    pub date: NaiveDate,
    /// Number of items the link stands for
    pub count: usize,
    pub hidden_ids: Vec<String>,
    pub link: Option<String>,
    /// `more` or `hide`
    pub behavior: String,
}

/// What a cell displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellContent {
    DayName {
        label: String,
        full_name: String,
    },
    WeekHeader,
    WeekNumber {
        number: u32,
        link: Option<String>,
    },
    DateBox {
        day_of_month: u32,
        link: Option<String>,
    },
    /// A multi-day or all-day band
    Event {
        occurrence: Box<EventOccurrence>,
    },
    /// Column already spanned by a band starting further left; renders nothing
    Covered {
        date_id: String,
    },
    Blank,
    SingleDay {
        buckets: Vec<TimeBucket>,
        more: Option<MoreLink>,
    },
    EmptyDay,
    Mini {
        day_of_month: u32,
        has_events: bool,
        link: Option<String>,
    },
}

/// The output unit of the assembler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub id: String,
    pub content: CellContent,
    pub colspan: u32,
    pub rowspan: u32,
    pub state: CellState,
    /// Base class followed by the state classes
    pub class: String,
    pub date: Option<NaiveDate>,
    pub kind: RowKind,
    pub header_id: Option<String>,
}

impl GridCell {
    pub fn new(id: impl Into<String>, kind: RowKind, content: CellContent) -> Self {
        Self {
            id: id.into(),
            content,
            colspan: 1,
            rowspan: 1,
            state: CellState::default(),
            class: kind.css_class().to_string(),
            date: None,
            kind,
            header_id: None,
        }
    }

    pub fn span(mut self, colspan: u32, rowspan: u32) -> Self {
        self.colspan = colspan;
        self.rowspan = rowspan;
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn header(mut self, header_id: impl Into<String>) -> Self {
        self.header_id = Some(header_id.into());
        self
    }

    /// Set the state and rebuild the class string from `base`.
    pub fn styled(mut self, base: &str, state: CellState) -> Self {
        let mut classes = vec![base];
        classes.extend(state.classes());
        self.class = classes.join(" ");
        self.state = state;
        self
    }

    /// Covered cells carry no markup of their own.
    pub fn is_covered(&self) -> bool {
        matches!(self.content, CellContent::Covered { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub kind: RowKind,
    pub cells: Vec<GridCell>,
}

impl GridRow {
    pub fn new(kind: RowKind) -> Self {
        Self {
            kind,
            cells: Vec::new(),
        }
    }

    /// Columns covered by this row's visible cells.
    pub fn width(&self) -> u32 {
        self.cells.iter().map(|cell| cell.colspan).sum()
    }
}

/// One calendar week: the date-box row followed by the body rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekBlock {
    pub start: NaiveDate,
    pub week_number: u32,
    /// Multi-day rows plus the single-day row
    pub total_rows: usize,
    pub rows: Vec<GridRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub mini: bool,
    pub header: GridRow,
    pub weeks: Vec<WeekBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekGrid {
    pub header: GridRow,
    pub week: WeekBlock,
}

/// A single day: all-day items apart from time-bucketed ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGrid {
    pub date: NaiveDate,
    pub all_day: Vec<EventOccurrence>,
    pub buckets: Vec<TimeBucket>,
    pub empty: bool,
    pub state: CellState,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CalendarGrid {
    Year { year: i32, months: Vec<MonthGrid> },
    Month(MonthGrid),
    Week(WeekGrid),
    Day(DayGrid),
    Empty,
}

impl CalendarGrid {
    pub fn is_empty(&self) -> bool {
        matches!(self, CalendarGrid::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_classes_order() {
        let state = CellState {
            today: true,
            future_month: true,
            no_entry: true,
            ..Default::default()
        };
        assert_eq!(state.classes(), vec!["no-entry", "today", "future-month"]);
    }

    #[test]
    fn test_styled_cell_class_string() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let cell = GridCell::new("month-2025-04-01-date-box", RowKind::DateBox, CellContent::Blank)
            .on(date)
            .styled(
                "date-box",
                CellState {
                    past: true,
                    ..Default::default()
                },
            );
        assert_eq!(cell.class, "date-box past");
        assert_eq!(cell.date, Some(date));
        assert!(!cell.is_covered());
    }

    #[test]
    fn test_row_width_counts_colspans() {
        let mut row = GridRow::new(RowKind::MultiDay);
        row.cells.push(GridCell::new("a", RowKind::MultiDay, CellContent::Blank).span(3, 1));
        row.cells.push(
            GridCell::new("b", RowKind::MultiDay, CellContent::Covered { date_id: "x".into() }).span(0, 1),
        );
        row.cells.push(GridCell::new("c", RowKind::MultiDay, CellContent::Blank));
        assert_eq!(row.width(), 4);
    }

    #[test]
    fn test_cell_content_serializes_with_type_tag() {
        let json = serde_json::to_value(CellContent::WeekNumber { number: 14, link: None }).unwrap();
        assert_eq!(json["type"], "week_number");
        assert_eq!(json["number"], 14);
    }
}
