//! Dashboard snapshot: a live window, the net-zero horizon and a goal-tracker
//! report over a longer analytics window, all generated from one context.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::info;

use crate::analytics::GoalTracker;
use crate::domain::{Co2Record, GenerationRecord, GoalTrackerReport, NetZeroRecord};
use crate::simulation::GridEnvironment;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub co2: Vec<Co2Record>,
    pub mix: Vec<GenerationRecord>,
    pub netzero: Vec<NetZeroRecord>,
    pub goal_tracker: GoalTrackerReport,
    pub timestamp: DateTime<FixedOffset>,
}

/// Build a snapshot anchored at `anchor`, sized by the environment's
/// configuration.
pub fn build_dashboard(
    env: &mut GridEnvironment,
    tracker: &GoalTracker,
    anchor: DateTime<Tz>,
) -> DashboardSnapshot {
    let cfg = env.config().clone();
    let step = cfg.step();

    let live = env.simulate_window(anchor, cfg.live_points, step);
    let netzero = env.net_zero_horizon(cfg.netzero_years);
    let history = env.simulate_window(anchor, cfg.analytics_points, step);

    let timestamp = anchor.fixed_offset();
    let goal_tracker = tracker.evaluate_at(&history.co2, &history.mix, &netzero, timestamp);

    info!(
        live_points = live.len(),
        analytics_points = history.len(),
        netzero_years = netzero.len(),
        rai_pct = goal_tracker.rai_pct,
        failed_kpis = goal_tracker.failures.len(),
        "dashboard snapshot built"
    );

    DashboardSnapshot {
        co2: live.co2,
        mix: live.mix,
        netzero,
        goal_tracker,
        timestamp,
    }
}
