//! Terminal SAT study aid: timed practice tests over a bundled question
//! table, a filterable question browser, study guides and a progress view.
//!
//! The binary in `main.rs` owns the terminal; everything else lives here so
//! integration tests and benchmarks can drive it.

pub mod app;
pub mod bank;
pub mod config;
pub mod event;
pub mod guides;
pub mod progress;
pub mod session;
pub mod ui;
