//! Error types for the calendar grid engine.

use thiserror::Error;

/// Result type for calendar grid operations
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised at the fallible seams of a render pass.
///
/// Only `Configuration` is user-facing: the renderer turns it into an empty
/// grid plus a message. The other variants are logged and the offending
/// occurrence is skipped.
#[derive(Error, Debug)]
pub enum GridError {
    /// Missing or invalid date argument, bad style option, unknown granularity
    #[error("{0}")]
    Configuration(String),

    /// An event value that cannot be placed on the calendar
    #[error("Data anomaly: {0}")]
    DataAnomaly(String),

    /// The recurrence engine could not expand a rule
    #[error("Recurrence error: {0}")]
    Recurrence(String),

    /// Settings file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML
    #[error("Settings parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl GridError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// True for errors the renderer reports to the user instead of skipping.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Toml(_) | Self::Io(_))
    }
}
