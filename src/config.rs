//! Seed-run configuration, read from TOML or JSON.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{error::SeedError, find_itinerary_path::DEFAULT_MAX_HOPS};

/// How a negative departure delay (an early pushback) becomes an actual
/// departure time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DepartureDelayPolicy {
    /// Early departures are bumped up to the scheduled time.
    #[default]
    ClampEarly,
    /// Delays are applied with their sign, so early departures stay early.
    Signed,
}

impl DepartureDelayPolicy {
    pub fn effective_delay_minutes(&self, delay_minutes: f64) -> f64 {
        match self {
            DepartureDelayPolicy::ClampEarly => delay_minutes.max(0.0),
            DepartureDelayPolicy::Signed => delay_minutes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFiles {
    /// BTS master coordinate table.
    pub coordinates: PathBuf,
    /// BTS on-time reporting table.
    pub flights: PathBuf,
    /// FAA aircraft registry (MASTER.txt).
    pub aircraft_registry: PathBuf,
    /// FAA aircraft reference (ACFTREF.txt).
    pub aircraft_reference: PathBuf,
    /// T-100 market table.
    pub markets: PathBuf,
    /// T-100 segment table.
    pub segments: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub id: String,
    pub name: String,
    /// Day whose schedule is simulated.
    pub date: NaiveDate,
    /// First day of the window used for airport capacities and throughputs.
    pub capacity_start: NaiveDate,
    /// Last day of that window, inclusive.
    pub capacity_end: NaiveDate,
    #[serde(default = "default_days")]
    pub days: f64,
    #[serde(default = "default_crew_multiplier")]
    pub crew_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub data: DataFiles,
    #[serde(default = "default_carrier")]
    pub carrier: String,
    /// Registrant name the FAA registry is filtered on.
    #[serde(default = "default_registrant")]
    pub registrant: String,
    #[serde(default)]
    pub departure_delay_policy: DepartureDelayPolicy,
    /// Days covered by the passenger counts of the market table.
    #[serde(default = "default_demand_period_days")]
    pub demand_period_days: f64,
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    #[serde(default)]
    pub skip_unknown_airports: bool,
    pub scenarios: Vec<ScenarioConfig>,
}

fn default_days() -> f64 {
    1.0
}

fn default_crew_multiplier() -> f64 {
    2.0
}

fn default_carrier() -> String {
    String::from("WN")
}

fn default_registrant() -> String {
    String::from("SOUTHWEST AIRLINES")
}

fn default_demand_period_days() -> f64 {
    30.0
}

fn default_max_hops() -> usize {
    DEFAULT_MAX_HOPS
}

impl SeedConfig {
    pub fn validate(&self) -> Result<(), SeedError> {
        if self.scenarios.is_empty() {
            return Err(SeedError::Configuration(String::from(
                "at least one scenario is required",
            )));
        }
        if self.demand_period_days <= 0.0 {
            return Err(SeedError::Configuration(format!(
                "demand_period_days must be positive, got {}",
                self.demand_period_days
            )));
        }
        for scenario in &self.scenarios {
            if scenario.capacity_start > scenario.capacity_end {
                return Err(SeedError::Configuration(format!(
                    "scenario {}: capacity_start is after capacity_end",
                    scenario.id
                )));
            }
            if scenario.crew_multiplier < 0.0 || scenario.days < 0.0 {
                return Err(SeedError::Configuration(format!(
                    "scenario {}: days and crew_multiplier must not be negative",
                    scenario.id
                )));
            }
        }
        Ok(())
    }
}

impl TryFrom<&Path> for SeedConfig {
    type Error = SeedError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let f = path.display();
        let s = std::fs::read_to_string(path)
            .map_err(|e| SeedError::Configuration(format!("failure reading {f}: {e}")))?;
        let config: SeedConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&s)
                .map_err(|e| SeedError::Configuration(format!("failure decoding {f}: {e}")))?,
            Some("json") => serde_json::from_str(&s)
                .map_err(|e| SeedError::Configuration(format!("failure decoding {f}: {e}")))?,
            _ => {
                return Err(SeedError::Configuration(format!(
                    "unsupported file type: {f}"
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const TOML: &str = r#"
carrier = "WN"

[data]
coordinates = "truth/T_MASTER_CORD.csv"
flights = "truth/T_ONTIME_REPORTING_2024.csv"
aircraft_registry = "truth/MASTER.txt"
aircraft_reference = "truth/ACFTREF.txt"
markets = "truth/T_T100D_MARKET_US_CARRIER_ONLY.csv"
segments = "truth/T_T100D_SEGMENT_US_CARRIER_ONLY.csv"

[[scenarios]]
id = "2024-01-28-bts-import-nodisrupt"
name = "January 28 BTS"
date = "2024-01-28"
capacity_start = "2024-01-01"
capacity_end = "2024-01-31"
"#;

    fn write_config(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::File::create(&path)
            .unwrap()
            .write_all(contents.as_bytes())
            .unwrap();
        (dir, path)
    }

    #[test]
    fn toml_with_defaults() {
        let (_dir, path) = write_config("seed.toml", TOML);
        let config = SeedConfig::try_from(path.as_path()).unwrap();
        assert_eq!(config.carrier, "WN");
        assert_eq!(config.registrant, "SOUTHWEST AIRLINES");
        assert_eq!(config.departure_delay_policy, DepartureDelayPolicy::ClampEarly);
        assert_eq!(config.demand_period_days, 30.0);
        assert_eq!(config.max_hops, 3);
        assert!(!config.skip_unknown_airports);

        let scenario = &config.scenarios[0];
        assert_eq!(scenario.date, NaiveDate::from_ymd_opt(2024, 1, 28).unwrap());
        assert_eq!(scenario.days, 1.0);
        assert_eq!(scenario.crew_multiplier, 2.0);
    }

    #[test]
    fn json_round_trip() {
        let (_dir, toml_path) = write_config("seed.toml", TOML);
        let mut config = SeedConfig::try_from(toml_path.as_path()).unwrap();
        config.departure_delay_policy = DepartureDelayPolicy::Signed;
        let (_json_dir, json_path) =
            write_config("seed.json", &serde_json::to_string_pretty(&config).unwrap());
        let decoded = SeedConfig::try_from(json_path.as_path()).unwrap();
        assert_eq!(decoded.departure_delay_policy, DepartureDelayPolicy::Signed);
        assert_eq!(decoded.scenarios[0].id, "2024-01-28-bts-import-nodisrupt");
    }

    #[test]
    fn unsupported_extension() {
        let (_dir, path) = write_config("seed.yaml", TOML);
        assert!(matches!(
            SeedConfig::try_from(path.as_path()),
            Err(SeedError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_inverted_capacity_window() {
        let inverted = TOML.replace(
            "capacity_start = \"2024-01-01\"",
            "capacity_start = \"2024-02-01\"",
        );
        let (_dir, path) = write_config("seed.toml", &inverted);
        assert!(matches!(
            SeedConfig::try_from(path.as_path()),
            Err(SeedError::Configuration(_))
        ));
    }

    #[test]
    fn delay_policies() {
        assert_eq!(DepartureDelayPolicy::ClampEarly.effective_delay_minutes(-5.0), 0.0);
        assert_eq!(DepartureDelayPolicy::ClampEarly.effective_delay_minutes(12.0), 12.0);
        assert_eq!(DepartureDelayPolicy::Signed.effective_delay_minutes(-5.0), -5.0);
    }
}
