// Service module exports

pub mod bucketing;
pub mod grid;
pub mod packer;
pub mod recurrence;
pub mod render;
pub mod settings;
pub mod splitter;
