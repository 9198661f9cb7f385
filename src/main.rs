use anyhow::{Context, Result};
use nexus_grid_sim::{analytics, config, dashboard, simulation, telemetry};
use analytics::GoalTracker;
use config::Config;
use simulation::{GridEnvironment, OutputMode};
use telemetry::init_tracing;
use tracing::{info, warn};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    cfg.validate()?;

    if cfg.simulator.seed.is_none() {
        info!("no simulator seed configured, drawing from entropy");
    }

    let anchor = cfg.simulator.now()?;
    let mut env = GridEnvironment::new(cfg.simulator.clone());
    let tracker = GoalTracker::new(cfg.analytics.clone());

    info!(
        timezone = %cfg.simulator.timezone,
        output_mode = %cfg.simulator.output_mode,
        %anchor,
        "building dashboard snapshot"
    );
    let snapshot = dashboard::build_dashboard(&mut env, &tracker, anchor);

    if let Some(error) = &snapshot.goal_tracker.error {
        warn!(%error, "goal tracker returned a partial report");
    }

    match cfg.simulator.output_mode {
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(&snapshot).context("serializing snapshot")?;
            println!("{json}");
        }
        OutputMode::None => {
            let report = &snapshot.goal_tracker;
            info!(
                rai_pct = report.rai_pct,
                days_ahead = report.budget.as_ref().map(|b| b.days_ahead),
                on_track = report.velocity.as_ref().map(|v| v.on_track),
                eta_year = report.pathway.as_ref().and_then(|p| p.eta_year),
                anomalies = report.anomalies.as_ref().map(|a| a.count),
                correlation = report.correlation.as_ref().map(|c| c.coefficient),
                "goal tracker summary"
            );
        }
    }

    Ok(())
}
