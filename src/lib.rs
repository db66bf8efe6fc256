//! Personal mood journal: normalizes submitted entries, renders them for
//! display, and keeps a JSON document in step with every change.

pub mod collections;
pub mod config;
pub mod domain;
pub mod journal;
pub mod normalize;
pub mod paths;
pub mod render;
pub mod storage;
pub mod trend;
pub mod ui;
