//! # Goal-Tracker Analytics
//!
//! Turns CO2-intensity, generation-mix and net-zero series into a KPI bundle:
//!
//! - **RAI**: real-time alignment of current intensity with the trajectory
//! - **Budget**: year-to-date emissions against the pro-rated annual target
//! - **Velocity**: intensity trend versus the trend the trajectory needs
//! - **Pathway**: target series plus the projected net-zero year
//! - **Anomalies**: rolling z-score flags on intensity
//! - **Correlation**: renewable share versus intensity
//!
//! Each KPI is computed independently; one failing leaves the others intact.

pub mod anomaly;
pub mod budget;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod pathway;
pub mod rai;
pub mod series;
pub mod stats;
pub mod velocity;

pub use engine::{GoalTracker, GoalTrackerConfig};
pub use error::{ErrorKind, Kpi, KpiError, KpiFailure};
pub use series::AlignedPoint;
