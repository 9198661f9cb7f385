use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// Floor applied to actual emissions before computing alignment, so a
/// zero-emission year never divides by zero.
pub const ALIGNMENT_EPSILON_MT: f64 = 0.1;

/// Generation source tracked by the mix model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EnergySource {
    Hydro,
    Wind,
    Solar,
    Nuclear,
    Fossil,
}

impl EnergySource {
    /// Hydro, wind and solar count towards the renewable share
    pub fn is_renewable(&self) -> bool {
        matches!(
            self,
            EnergySource::Hydro | EnergySource::Wind | EnergySource::Solar
        )
    }
}

/// Multi-source generation snapshot for one instant.
///
/// `total_mw` and `renewable_share_pct` are derived from the five source
/// values and can only be produced by [`GenerationRecord::from_sources`].
/// Anything that changes a source goes through the factory again, so the
/// derived fields can never drift from the sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GenerationSample")]
pub struct GenerationRecord {
    timestamp: DateTime<FixedOffset>,
    hydro_mw: f64,
    wind_mw: f64,
    solar_mw: f64,
    nuclear_mw: f64,
    fossil_mw: f64,
    total_mw: f64,
    renewable_share_pct: f64,
}

/// Wire shape accepted when deserialising a generation record. Derived
/// fields present in the input are ignored and recomputed.
#[derive(Debug, Clone, Deserialize)]
struct GenerationSample {
    timestamp: DateTime<FixedOffset>,
    hydro_mw: f64,
    wind_mw: f64,
    solar_mw: f64,
    nuclear_mw: f64,
    fossil_mw: f64,
}

impl From<GenerationSample> for GenerationRecord {
    fn from(s: GenerationSample) -> Self {
        GenerationRecord::from_sources(
            s.timestamp,
            s.hydro_mw,
            s.wind_mw,
            s.solar_mw,
            s.nuclear_mw,
            s.fossil_mw,
        )
    }
}

/// Negative or non-finite outputs collapse to zero
fn floor_mw(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl GenerationRecord {
    /// Build a record from the five source outputs in MW.
    pub fn from_sources(
        timestamp: DateTime<FixedOffset>,
        hydro_mw: f64,
        wind_mw: f64,
        solar_mw: f64,
        nuclear_mw: f64,
        fossil_mw: f64,
    ) -> Self {
        let hydro_mw = floor_mw(hydro_mw);
        let wind_mw = floor_mw(wind_mw);
        let solar_mw = floor_mw(solar_mw);
        let nuclear_mw = floor_mw(nuclear_mw);
        let fossil_mw = floor_mw(fossil_mw);

        let total_mw = hydro_mw + wind_mw + solar_mw + nuclear_mw + fossil_mw;
        let renewable_share_pct = if total_mw > 0.0 {
            (100.0 * (hydro_mw + wind_mw + solar_mw) / total_mw).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Self {
            timestamp,
            hydro_mw,
            wind_mw,
            solar_mw,
            nuclear_mw,
            fossil_mw,
            total_mw,
            renewable_share_pct,
        }
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn hydro_mw(&self) -> f64 {
        self.hydro_mw
    }

    pub fn wind_mw(&self) -> f64 {
        self.wind_mw
    }

    pub fn solar_mw(&self) -> f64 {
        self.solar_mw
    }

    pub fn nuclear_mw(&self) -> f64 {
        self.nuclear_mw
    }

    pub fn fossil_mw(&self) -> f64 {
        self.fossil_mw
    }

    /// Sum of the five sources in MW
    pub fn total_mw(&self) -> f64 {
        self.total_mw
    }

    /// Share of hydro, wind and solar in percent (0-100)
    pub fn renewable_share_pct(&self) -> f64 {
        self.renewable_share_pct
    }

    /// Output of a single source in MW
    pub fn source_mw(&self, source: EnergySource) -> f64 {
        match source {
            EnergySource::Hydro => self.hydro_mw,
            EnergySource::Wind => self.wind_mw,
            EnergySource::Solar => self.solar_mw,
            EnergySource::Nuclear => self.nuclear_mw,
            EnergySource::Fossil => self.fossil_mw,
        }
    }

    /// Copy of this record with one source replaced, derived fields recomputed
    pub fn with_source(&self, source: EnergySource, mw: f64) -> Self {
        let mut values = [
            self.hydro_mw,
            self.wind_mw,
            self.solar_mw,
            self.nuclear_mw,
            self.fossil_mw,
        ];
        for (slot, candidate) in values.iter_mut().zip(EnergySource::iter()) {
            if candidate == source {
                *slot = mw;
            }
        }
        let [hydro, wind, solar, nuclear, fossil] = values;
        Self::from_sources(self.timestamp, hydro, wind, solar, nuclear, fossil)
    }

    /// Copy of this record with one source multiplied by `factor`
    pub fn scale_source(&self, source: EnergySource, factor: f64) -> Self {
        self.with_source(source, self.source_mw(source) * factor)
    }
}

/// Carbon intensity of generation at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Co2Record {
    pub timestamp: DateTime<FixedOffset>,
    /// Grams of CO2 per kWh generated
    pub co2_intensity_g_per_kwh: f64,
}

impl Co2Record {
    pub fn new(timestamp: DateTime<FixedOffset>, co2_intensity_g_per_kwh: f64) -> Self {
        Self {
            timestamp,
            co2_intensity_g_per_kwh,
        }
    }
}

/// Annual emissions target versus actual.
///
/// `alignment_pct` is derived; like [`GenerationRecord`], the record is only
/// built through [`NetZeroRecord::new`], deserialisation included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NetZeroSample")]
pub struct NetZeroRecord {
    year: i32,
    actual_emissions_mt: f64,
    target_emissions_mt: f64,
    /// Target as a percentage of actual, capped at 100
    alignment_pct: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct NetZeroSample {
    year: i32,
    actual_emissions_mt: f64,
    target_emissions_mt: f64,
}

impl From<NetZeroSample> for NetZeroRecord {
    fn from(sample: NetZeroSample) -> Self {
        NetZeroRecord::new(
            sample.year,
            sample.actual_emissions_mt,
            sample.target_emissions_mt,
        )
    }
}

impl NetZeroRecord {
    /// Build a record, flooring emissions at zero and deriving alignment.
    pub fn new(year: i32, actual_emissions_mt: f64, target_emissions_mt: f64) -> Self {
        let actual_emissions_mt = actual_emissions_mt.max(0.0);
        let target_emissions_mt = target_emissions_mt.max(0.0);
        let alignment_pct = (100.0 * target_emissions_mt
            / actual_emissions_mt.max(ALIGNMENT_EPSILON_MT))
        .clamp(0.0, 100.0);

        Self {
            year,
            actual_emissions_mt,
            target_emissions_mt,
            alignment_pct,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn actual_emissions_mt(&self) -> f64 {
        self.actual_emissions_mt
    }

    pub fn target_emissions_mt(&self) -> f64 {
        self.target_emissions_mt
    }

    pub fn alignment_pct(&self) -> f64 {
        self.alignment_pct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_derived_fields() {
        let record = GenerationRecord::from_sources(ts(), 100.0, 50.0, 50.0, 300.0, 500.0);
        assert_eq!(record.total_mw(), 1000.0);
        assert!((record.renewable_share_pct() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_total_has_zero_share() {
        let record = GenerationRecord::from_sources(ts(), 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_eq!(record.total_mw(), 0.0);
        assert_eq!(record.renewable_share_pct(), 0.0);
    }

    #[test]
    fn test_negative_and_nan_sources_are_floored() {
        let record = GenerationRecord::from_sources(ts(), -10.0, f64::NAN, 20.0, 0.0, 20.0);
        assert_eq!(record.hydro_mw(), 0.0);
        assert_eq!(record.wind_mw(), 0.0);
        assert_eq!(record.total_mw(), 40.0);
        assert!((record.renewable_share_pct() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_scaling_recomputes_derived_fields() {
        let record = GenerationRecord::from_sources(ts(), 100.0, 100.0, 0.0, 0.0, 200.0);
        let scaled = record.scale_source(EnergySource::Fossil, 0.0);

        assert_eq!(scaled.fossil_mw(), 0.0);
        assert_eq!(scaled.total_mw(), 200.0);
        assert_eq!(scaled.renewable_share_pct(), 100.0);
        // source record unchanged
        assert_eq!(record.total_mw(), 400.0);
    }

    #[test]
    fn test_with_source_only_touches_one_source() {
        let record = GenerationRecord::from_sources(ts(), 1.0, 2.0, 3.0, 4.0, 5.0);
        let updated = record.with_source(EnergySource::Solar, 13.0);
        assert_eq!(updated.hydro_mw(), 1.0);
        assert_eq!(updated.wind_mw(), 2.0);
        assert_eq!(updated.solar_mw(), 13.0);
        assert_eq!(updated.nuclear_mw(), 4.0);
        assert_eq!(updated.fossil_mw(), 5.0);
        assert_eq!(updated.total_mw(), 25.0);
    }

    #[test]
    fn test_deserialize_recomputes_derived_fields() {
        let json = r#"{
            "timestamp": "2025-03-01T12:00:00+01:00",
            "hydro_mw": 10.0,
            "wind_mw": 10.0,
            "solar_mw": 0.0,
            "nuclear_mw": 0.0,
            "fossil_mw": 20.0,
            "total_mw": 999.0,
            "renewable_share_pct": 99.0
        }"#;
        let record: GenerationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.total_mw(), 40.0);
        assert!((record.renewable_share_pct() - 50.0).abs() < 1e-9);
        assert_eq!(record.timestamp(), ts());
    }

    #[test]
    fn test_serialize_exposes_unit_suffixed_fields() {
        let record = GenerationRecord::from_sources(ts(), 1.0, 1.0, 1.0, 1.0, 1.0);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["total_mw"], 5.0);
        assert_eq!(value["renewable_share_pct"], 60.0);
    }

    #[test]
    fn test_renewable_classification() {
        let renewables: Vec<_> = EnergySource::iter().filter(|s| s.is_renewable()).collect();
        assert_eq!(
            renewables,
            vec![EnergySource::Hydro, EnergySource::Wind, EnergySource::Solar]
        );
        assert_eq!(EnergySource::Nuclear.to_string(), "nuclear");
    }

    #[test]
    fn test_net_zero_alignment_capped() {
        let over = NetZeroRecord::new(2030, 50.0, 60.0);
        assert_eq!(over.alignment_pct(), 100.0);

        let under = NetZeroRecord::new(2030, 80.0, 60.0);
        assert!((under.alignment_pct() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_zero_zero_actual_uses_epsilon() {
        let record = NetZeroRecord::new(2040, -1.0, 0.0);
        assert_eq!(record.actual_emissions_mt(), 0.0);
        assert_eq!(record.alignment_pct(), 0.0);

        let record = NetZeroRecord::new(2040, 0.0, 5.0);
        assert_eq!(record.alignment_pct(), 100.0);
    }

    #[test]
    fn test_net_zero_deserialize_recomputes_alignment() {
        let json = r#"{"year":2030,"actual_emissions_mt":-5.0,"target_emissions_mt":50.0,"alignment_pct":750.0}"#;
        let record: NetZeroRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.actual_emissions_mt(), 0.0);
        assert_eq!(record.alignment_pct(), 100.0);

        let json = r#"{"year":2030,"actual_emissions_mt":80.0,"target_emissions_mt":60.0}"#;
        let record: NetZeroRecord = serde_json::from_str(json).unwrap();
        assert!((record.alignment_pct() - 75.0).abs() < 1e-9);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["year"], 2030);
        assert!(value["alignment_pct"].is_number());
    }
}
