// Week slot packing service
// Assigns multi-day bands to non-overlapping rows within one calendar week

use chrono::NaiveDate;
use log::debug;

use crate::models::occurrence::EventOccurrence;
use crate::utils::date::{days_between, week_column};

/// Width of a slot row. Columns at or beyond this are ignored.
pub const SLOT_COLUMNS: usize = 31;

/// Days in a week row.
pub const DAYS_PER_WEEK: usize = 7;

/// Occupancy grid indexed `[row][column]`, grown one row at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotMatrix {
    rows: Vec<Vec<Option<String>>>,
}

impl SlotMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.rows.clear();
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Occupant ids of one row, `None` for free columns.
    pub fn row(&self, row: usize) -> Option<&[Option<String>]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn is_empty_cell(&self, row: usize, column: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or(true, Option::is_none)
    }

    fn blank_row() -> Vec<Option<String>> {
        vec![None; SLOT_COLUMNS]
    }

    /// Write `id` into `length` columns of `row` starting at `column`.
    pub fn set_cell_slot(&mut self, row: usize, column: usize, length: usize, id: &str) {
        while self.rows.len() <= row {
            self.rows.push(Self::blank_row());
        }
        let cells = &mut self.rows[row];
        for cell in cells.iter_mut().take(column.saturating_add(length)).skip(column) {
            *cell = Some(id.to_string());
        }
    }

    /// First row whose columns `[column, column + length)` are all free.
    ///
    /// Appends a new row when none fits, when `length` is zero, or when
    /// `only_append` is set.
    pub fn find_empty_cell_floor(&mut self, column: usize, length: usize, only_append: bool) -> usize {
        if !only_append && length > 0 {
            let found = (0..self.rows.len())
                .find(|&row| (column..column + length).all(|col| self.is_empty_cell(row, col)));
            if let Some(row) = found {
                return row;
            }
        }

        self.rows.push(Self::blank_row());
        self.rows.len() - 1
    }

    /// Row already holding `id` at `column`, if any.
    pub fn find_cell_floor_by_id(&self, column: usize, id: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|cells| cells.get(column).and_then(Option::as_deref) == Some(id))
    }
}

/// Where a multi-day fragment lands in the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Start of a band in this row
    Band {
        row: usize,
        colspan: usize,
        continuation: bool,
        continues: bool,
    },
    /// Day already spanned by a band that starts earlier in the week
    Covered { row: usize },
}

impl Placement {
    pub fn row(&self) -> usize {
        match self {
            Placement::Band { row, .. } | Placement::Covered { row } => *row,
        }
    }
}

/// Columns a band may span from `date`: bounded by the event's last day,
/// the end of the week row and the last visible day. Always at least one.
pub fn colspan_for(date: NaiveDate, column: usize, event_last: NaiveDate, visible_last: NaiveDate) -> usize {
    let days_to_end = days_between(date, event_last);
    let remaining_in_row = DAYS_PER_WEEK.saturating_sub(column + 1) as i64;
    let remaining_in_range = days_between(date, visible_last);

    let bucket_count = days_to_end.min(remaining_in_row).min(remaining_in_range).max(0);
    bucket_count as usize + 1
}

/// First-fit packer for one week of multi-day bands.
#[derive(Debug, Clone)]
pub struct WeekSlotPacker {
    matrix: SlotMatrix,
    first_day_of_week: u8,
}

impl WeekSlotPacker {
    pub fn new(first_day_of_week: u8) -> Self {
        Self {
            matrix: SlotMatrix::new(),
            first_day_of_week,
        }
    }

    /// Clear the matrix before laying out a new week.
    pub fn start_week(&mut self) {
        self.matrix.reset();
    }

    pub fn matrix(&self) -> &SlotMatrix {
        &self.matrix
    }

    pub fn row_count(&self) -> usize {
        self.matrix.row_count()
    }

    /// Claim the lowest free row for `colspan` columns from `column`.
    pub fn place_multi_day(&mut self, occurrence: &EventOccurrence, column: usize, colspan: usize) -> usize {
        let key = occurrence.slot_key();
        let row = self.matrix.find_empty_cell_floor(column, colspan, false);
        self.matrix.set_cell_slot(row, column, colspan, &key);
        debug!("Placed {} at row {} col {} span {}", key, row, column, colspan);
        row
    }

    /// Lay out the fragment of `occurrence` shown on `date`.
    ///
    /// A band starts on the event's first day or on the first column of the
    /// week. Later days in the same week find the row already holding the
    /// band. A fragment whose band is missing (its earlier days were never
    /// laid out) starts a new band marked as a continuation.
    pub fn place(&mut self, occurrence: &EventOccurrence, date: NaiveDate, visible_last: NaiveDate) -> Placement {
        let column = week_column(date, self.first_day_of_week);
        let first = occurrence.first_day();
        let last = occurrence.last_day();

        if first != date && column != 0 {
            if let Some(row) = self.matrix.find_cell_floor_by_id(column, &occurrence.slot_key()) {
                return Placement::Covered { row };
            }
        }

        let colspan = colspan_for(date, column, last, visible_last);
        let row = self.place_multi_day(occurrence, column, colspan);
        Placement::Band {
            row,
            colspan,
            continuation: first < date,
            continues: days_between(date, last) >= colspan as i64,
        }
    }
}
