// Settings module
// Calendar display configuration, stored as TOML

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::range::Granularity;
use crate::models::style::StyleOptions;

/// Stripe color that means "no stripe".
pub const EMPTY_STRIPE: &str = "#ffffff";

/// Source of legend stripe colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendMode {
    #[default]
    None,
    /// Color by bundle / content type
    Type,
    /// Color by referenced taxonomy term
    Taxonomy,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegendSettings {
    pub mode: LegendMode,
    /// Bundle name to hex color
    pub type_colors: BTreeMap<String, String>,
    /// Bundle name to display label
    pub type_labels: BTreeMap<String, String>,
    /// Term id to hex color
    pub taxonomy_colors: BTreeMap<String, String>,
}

impl LegendSettings {
    /// Validate every configured color
    pub fn validate(&self) -> Result<(), String> {
        for color in self.type_colors.values().chain(self.taxonomy_colors.values()) {
            if !is_hex_color(color) {
                return Err(format!("'{}' is not a valid hex color", color));
            }
        }
        Ok(())
    }
}

/// `#RGB` or `#RRGGBB`, case-insensitive.
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Calendar settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Which calendar to render: year, month, week or day
    pub calendar_type: Granularity,
    /// IANA name of the display time zone
    pub timezone: String,
    /// Prefix for cell ids
    pub view_id: String,
    pub style: StyleOptions,
    pub legend: LegendSettings,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            calendar_type: Granularity::Month,
            timezone: "UTC".to_string(),
            view_id: "calendar".to_string(),
            style: StyleOptions::default(),
            legend: LegendSettings::default(),
        }
    }
}

impl CalendarSettings {
    /// Validate settings values
    pub fn validate(&self) -> Result<(), String> {
        self.display_timezone()?;

        if self.view_id.trim().is_empty() {
            return Err("View id cannot be empty".to_string());
        }

        self.style.validate()?;
        self.legend.validate()?;

        Ok(())
    }

    pub fn display_timezone(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| format!("Unknown time zone: {}", self.timezone))
    }
}
