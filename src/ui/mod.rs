//! Rendering only. Every function here reads from [`crate::state::AppState`];
//! the prediction form is the single place that writes back.

pub mod eda;
pub mod forecast;
pub mod insights;
pub mod overview;
pub mod panels;
pub mod plot;
