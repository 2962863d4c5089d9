//! Terminal commands and presentation

pub mod convert;
pub mod diagnose;
pub mod rates;
pub mod refresh;
pub mod setup;
pub mod summary;
pub mod ui;
