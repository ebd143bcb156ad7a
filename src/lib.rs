// Calendar grid library
// Exports all modules for testing and reuse

pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{GridError, Result};
pub use models::grid::CalendarGrid;
pub use models::range::{Granularity, VisibleRange};
pub use models::record::RawRecord;
pub use models::settings::CalendarSettings;
pub use services::recurrence::{RRuleExpander, RecurrenceExpander};
pub use services::render::{CalendarRenderer, RenderOutput, RenderStage};
