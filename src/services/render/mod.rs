// Render service
// Drives one render pass from raw records to an assembled grid

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{GridError, Result};
use crate::models::grid::CalendarGrid;
use crate::models::range::VisibleRange;
use crate::models::record::RawRecord;
use crate::models::settings::CalendarSettings;
use crate::services::grid::GridAssembler;
use crate::services::recurrence::RecurrenceExpander;
use crate::services::splitter::{DayEventSplitter, EventCollector};

/// Progress of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStage {
    Idle,
    RangeResolved,
    EventsCollected,
    PerWeekPacked,
    Assembled,
    Rendered,
}

/// Result of a render pass, successful or not.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub stage: RenderStage,
    pub grid: CalendarGrid,
    /// User-facing messages, e.g. why nothing was rendered
    pub messages: Vec<String>,
    pub range: Option<VisibleRange>,
}

impl RenderOutput {
    fn failed(error: &GridError) -> Self {
        Self {
            stage: RenderStage::Idle,
            grid: CalendarGrid::Empty,
            messages: vec![error.to_string()],
            range: None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.stage == RenderStage::Rendered
    }
}

/// Renders calendars for one settings document.
///
/// Holds no per-render state, so one renderer can serve many passes.
pub struct CalendarRenderer<'a> {
    settings: &'a CalendarSettings,
    expander: &'a dyn RecurrenceExpander,
}

impl<'a> CalendarRenderer<'a> {
    pub fn new(settings: &'a CalendarSettings, expander: &'a dyn RecurrenceExpander) -> Self {
        Self { settings, expander }
    }

    /// Render `records` for the period named by `argument`.
    ///
    /// Configuration problems never escape: they produce an empty grid with a
    /// message and the pass stays `Idle`.
    pub fn render(&self, records: &[RawRecord], argument: Option<&str>, today: NaiveDate) -> RenderOutput {
        match self.try_render(records, argument, today) {
            Ok(output) => output,
            Err(e) => {
                warn!("Calendar {} not rendered: {}", self.settings.view_id, e);
                RenderOutput::failed(&e)
            }
        }
    }

    fn try_render(&self, records: &[RawRecord], argument: Option<&str>, today: NaiveDate) -> Result<RenderOutput> {
        let settings = self.settings;
        settings.validate().map_err(GridError::Configuration)?;
        let timezone = settings.display_timezone().map_err(GridError::Configuration)?;

        let range = VisibleRange::from_argument(
            argument,
            settings.calendar_type,
            timezone,
            today,
            settings.style.first_day_of_week,
        )?;
        advance(RenderStage::RangeResolved, &settings.view_id);

        let splitter = DayEventSplitter::new(
            self.expander,
            settings.style.time_granularity,
            settings.style.time_increment,
        );
        let items = EventCollector::new(splitter, &settings.legend).collect(records, &range);
        advance(RenderStage::EventsCollected, &settings.view_id);

        let assembler = GridAssembler::new(&settings.style, &range, &items, &settings.view_id);
        let weeks = assembler.pack_weeks();
        advance(RenderStage::PerWeekPacked, &settings.view_id);

        let grid = assembler.assemble(weeks);
        advance(RenderStage::Assembled, &settings.view_id);

        info!(
            "Rendered {} {} from {} to {}: {} records, {} days with items",
            settings.calendar_type,
            settings.view_id,
            range.min_date(),
            range.max_date(),
            records.len(),
            items.len()
        );

        Ok(RenderOutput {
            stage: RenderStage::Rendered,
            grid,
            messages: Vec::new(),
            range: Some(range),
        })
    }
}

fn advance(stage: RenderStage, view_id: &str) {
    debug!("{}: {:?}", view_id, stage);
}
