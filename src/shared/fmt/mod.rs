//! Human-readable number formatting for tooltips and detail panels.

pub mod num;
