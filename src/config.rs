use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::analytics::GoalTrackerConfig;
use crate::simulation::SimulatorConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub simulator: SimulatorConfig,
    pub analytics: GoalTrackerConfig,
}

impl Config {
    /// Defaults, then `config/default.toml`, then `NEXUS__*` environment
    /// variables (`NEXUS__SIMULATOR__SEED=7`).
    pub fn load() -> Result<Self> {
        Self::figment()
            .extract::<Self>()
            .context("failed to load configuration")
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("NEXUS__").split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        self.simulator
            .validate()
            .context("invalid [simulator] configuration")?;
        self.simulator.tz()?;
        anyhow::ensure!(
            self.simulator.co2.low_g_per_kwh <= self.simulator.co2.high_g_per_kwh
                && self.simulator.co2.floor_g_per_kwh <= self.simulator.co2.ceiling_g_per_kwh,
            "co2 band bounds are inverted"
        );
        self.analytics
            .check()
            .context("invalid [analytics] configuration")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::OutputMode;
    use figment::Jail;

    #[test]
    fn test_defaults_without_files() {
        Jail::expect_with(|_jail| {
            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.simulator.live_points, 96);
            assert_eq!(cfg.simulator.analytics_points, 720);
            assert_eq!(cfg.analytics.anomaly_window, 96);
            assert!(cfg.validate().is_ok());
            Ok(())
        });
    }

    #[test]
    fn test_toml_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/default.toml",
                r#"
                [simulator]
                timezone = "Europe/Stockholm"
                output_mode = "json"
                seed = 1

                [analytics]
                anomaly_window = 48
                "#,
            )?;
            jail.set_env("NEXUS__SIMULATOR__SEED", "7");
            jail.set_env("NEXUS__ANALYTICS__ANOMALY_THRESHOLD", "2.2");

            let cfg = Config::load().map_err(|e| e.to_string())?;
            assert_eq!(cfg.simulator.timezone, "Europe/Stockholm");
            assert_eq!(cfg.simulator.output_mode, OutputMode::Json);
            assert_eq!(cfg.simulator.seed, Some(7));
            assert_eq!(cfg.analytics.anomaly_window, 48);
            assert_eq!(cfg.analytics.anomaly_threshold, 2.2);
            // untouched fields keep their defaults
            assert_eq!(cfg.simulator.step_minutes, 15);
            Ok(())
        });
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut cfg = Config::default();
        cfg.simulator.timezone = "Mars/Olympus_Mons".into();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.simulator.step_minutes = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.analytics.anomaly_min_baseline = 500;
        assert!(cfg.validate().is_err());
    }
}
