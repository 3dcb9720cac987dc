//! Video ad revenue dashboard: dataset statistics, charts, and a fitted
//! revenue model behind a prediction form.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod prediction;
pub mod predictor;
pub mod state;
pub mod ui;
