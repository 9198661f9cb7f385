//! Synthetic grid data and net-zero goal tracking.
//!
//! [`simulation`] produces generation-mix, CO2-intensity and net-zero series
//! from seeded random contexts; [`analytics`] turns those series into a KPI
//! report; [`dashboard`] bundles both into one snapshot.

pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod simulation;
pub mod telemetry;
