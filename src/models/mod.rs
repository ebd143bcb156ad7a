// Module exports for models

pub mod grid;
pub mod occurrence;
pub mod range;
pub mod record;
pub mod settings;
pub mod style;
