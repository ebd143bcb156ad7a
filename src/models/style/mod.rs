// Style module
// Display options chosen by the site builder, consumed by the grid assembler

use serde::{Deserialize, Serialize};

/// Precision used when deciding whether a day segment is all-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGranularity {
    #[default]
    Second,
    Minute,
    Hour,
}

/// What to do with a day that has more single-day items than `max_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxItemsBehavior {
    /// Show the first `max_items` items followed by a "more" link
    #[default]
    More,
    /// Show no items, only a link to the day view
    Hide,
}

impl MaxItemsBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaxItemsBehavior::More => "more",
            MaxItemsBehavior::Hide => "hide",
        }
    }
}

/// Time-of-day grouping for single-day items.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupByTimes {
    /// Every item keeps its exact start time
    None,
    /// One bucket per hour
    #[default]
    Hour,
    /// One bucket per half hour
    Half,
    /// Comma-separated or listed `HH:MM[:SS]` boundaries
    Custom(Vec<String>),
}

impl GroupByTimes {
    /// Parse a comma-separated list such as `"00:00:00,08:00:00,18:00:00"`.
    pub fn custom_from_list(list: &str) -> Self {
        GroupByTimes::Custom(
            list.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Boundary labels for this grouping, before normalization.
    pub fn boundaries(&self) -> Vec<String> {
        match self {
            GroupByTimes::None => Vec::new(),
            GroupByTimes::Hour => (0..24).map(|hour| format!("{:02}:00:00", hour)).collect(),
            GroupByTimes::Half => (0..48)
                .map(|slot| format!("{:02}:{:02}:00", slot / 2, (slot % 2) * 30))
                .collect(),
            GroupByTimes::Custom(list) => list.clone(),
        }
    }

    /// Custom groupings render empty time slots too.
    pub fn shows_empty_times(&self) -> bool {
        matches!(self, GroupByTimes::Custom(list) if !list.is_empty())
    }
}

/// Optional URL templates for links to other granularities.
///
/// `{arg}` is replaced with the date argument of the target view, e.g.
/// `/calendar/week/{arg}` becomes `/calendar/week/202514`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GranularityLinks {
    pub day: Option<String>,
    pub week: Option<String>,
    pub month: Option<String>,
}

impl GranularityLinks {
    pub fn day_url(&self, arg: &str) -> Option<String> {
        expand_link(self.day.as_deref(), arg)
    }

    pub fn week_url(&self, arg: &str) -> Option<String> {
        expand_link(self.week.as_deref(), arg)
    }

    pub fn month_url(&self, arg: &str) -> Option<String> {
        expand_link(self.month.as_deref(), arg)
    }
}

fn expand_link(template: Option<&str>, arg: &str) -> Option<String> {
    template
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.replace("{arg}", arg))
}

/// Calendar style options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    /// Compact calendar with per-day "has events" flags only
    pub mini: bool,
    pub show_week_numbers: bool,
    /// Maximum single-day items per day cell; 0 means unlimited
    pub max_items: u32,
    pub max_items_behavior: MaxItemsBehavior,
    pub group_by_times: GroupByTimes,
    /// Lay out multi-day and all-day items as spanning rows
    pub multi_day_theme: bool,
    /// First day of the week, 0 = Sunday .. 6 = Saturday
    pub first_day_of_week: u8,
    /// Day name length in the header: 1, 2, 3 (abbreviated) or 99 (full)
    pub name_size: u8,
    pub link_to_date: bool,
    pub granularity_links: GranularityLinks,
    pub time_granularity: TimeGranularity,
    pub time_increment: u32,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            mini: false,
            show_week_numbers: false,
            max_items: 0,
            max_items_behavior: MaxItemsBehavior::More,
            group_by_times: GroupByTimes::Hour,
            multi_day_theme: true,
            first_day_of_week: 0, // Sunday
            name_size: 3,
            link_to_date: true,
            granularity_links: GranularityLinks::default(),
            time_granularity: TimeGranularity::Second,
            time_increment: 1,
        }
    }
}

impl StyleOptions {
    /// Validate the options
    pub fn validate(&self) -> Result<(), String> {
        if self.first_day_of_week > 6 {
            return Err(format!(
                "First day of week must be between 0 and 6, got {}",
                self.first_day_of_week
            ));
        }

        if !matches!(self.name_size, 1 | 2 | 3 | 99) {
            return Err(format!("Day name size must be 1, 2, 3 or 99, got {}", self.name_size));
        }

        if self.time_increment == 0 || self.time_increment > 59 {
            return Err(format!(
                "Time increment must be between 1 and 59, got {}",
                self.time_increment
            ));
        }

        if let GroupByTimes::Custom(list) = &self.group_by_times {
            if list.is_empty() {
                return Err("Custom groupby times cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Whether a day with `count` single-day items must be truncated.
    pub fn truncates(&self, count: usize) -> bool {
        self.max_items > 0 && count > self.max_items as usize
    }
}
