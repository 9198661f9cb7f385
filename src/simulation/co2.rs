//! # CO2-Intensity Simulation
//!
//! Derives grid carbon intensity from the renewable share of a generation
//! record.

use chrono::DateTime;
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::noise::{co2_from_renewable_share, Co2Band};
use crate::domain::{Co2Record, GenerationRecord};

pub struct Co2IntensitySimulator {
    band: Co2Band,
    rng: StdRng,
}

impl Co2IntensitySimulator {
    pub fn new(band: Co2Band, random_seed: Option<u64>) -> Self {
        let rng = match random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { band, rng }
    }

    pub fn with_rng(band: Co2Band, rng: StdRng) -> Self {
        Self { band, rng }
    }

    pub fn band(&self) -> &Co2Band {
        &self.band
    }

    /// Intensity at `timestamp`, derived from the co-timestamped `generation`
    /// record. The caller is responsible for passing the matching record.
    pub fn simulate(&mut self, timestamp: DateTime<Tz>, generation: &GenerationRecord) -> Co2Record {
        let intensity =
            co2_from_renewable_share(&mut self.rng, generation.renewable_share_pct(), &self.band);
        Co2Record::new(timestamp.fixed_offset(), intensity)
    }
}
