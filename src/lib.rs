//! Personal time-tracking tool: pick an activity, start and stop a timer,
//! keep the finished sessions in a flat table, and export either a stacked
//! daily bar chart or a dated PDF report.

pub mod cli;
pub mod registry;
pub mod report;
pub mod session;
pub mod store;
pub mod tui;
pub mod utils;
