use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Electricity grid regions with a known carbon intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Usa,
    Europe,
    Asia,
    World,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Usa, Region::Europe, Region::Asia, Region::World];

    /// Strict lookup of a region name; `None` when the name is not known.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "usa" | "us" | "north_america" => Some(Region::Usa),
            "europe" | "eu" => Some(Region::Europe),
            "asia" => Some(Region::Asia),
            "world" | "global" => Some(Region::World),
            _ => None,
        }
    }

    /// Maps a region name to a `Region`, falling back to `World`.
    ///
    /// An unknown or empty name is never an error.
    pub fn from_name(name: &str) -> Self {
        Region::parse(name).unwrap_or_else(|| {
            tracing::debug!(region = name, "unrecognized region, using world average");
            Region::World
        })
    }

    /// Like `from_name`, treating a missing region as `World`.
    pub fn from_optional(name: Option<&str>) -> Self {
        name.map(Region::from_name).unwrap_or(Region::World)
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::Usa => "usa",
            Region::Europe => "europe",
            Region::Asia => "asia",
            Region::World => "world",
        }
    }
}

impl Default for Region {
    fn default() -> Self {
        Region::World
    }
}

impl From<&str> for Region {
    fn from(name: &str) -> Self {
        Region::from_name(name)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Grid carbon intensity per region, in grams of CO2 per kWh.
///
/// Built once at startup and shared behind an `Arc`; there is no way to
/// mutate a table after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalFactors {
    factors: BTreeMap<Region, f64>,
}

impl RegionalFactors {
    /// Global average intensity, also used for any region missing from the table.
    pub const WORLD_G_PER_KWH: f64 = 475.0;

    /// Builds the default table with `overrides` applied on top.
    ///
    /// Overrides must be finite and non-negative.
    pub fn with_overrides(overrides: &BTreeMap<Region, f64>) -> Result<Self> {
        let mut table = Self::default();
        for (region, value) in overrides {
            if !value.is_finite() || *value < 0.0 {
                return Err(EngineError::Config(format!(
                    "carbon intensity for {} must be a non-negative number, got {}",
                    region, value
                )));
            }
            table.factors.insert(*region, *value);
        }
        Ok(table)
    }

    /// Freezes the table for sharing across threads.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Carbon intensity for `region` in gCO2/kWh.
    pub fn factor(&self, region: Region) -> f64 {
        self.factors
            .get(&region)
            .or_else(|| self.factors.get(&Region::World))
            .copied()
            .unwrap_or(Self::WORLD_G_PER_KWH)
    }

    /// Converts an energy figure in watt-hours to grams of CO2 for `region`.
    pub fn co2_grams(&self, energy_wh: f64, region: Region) -> f64 {
        energy_wh * self.factor(region) / 1000.0
    }
}

impl Default for RegionalFactors {
    fn default() -> Self {
        let mut factors = BTreeMap::new();
        factors.insert(Region::Usa, 386.0);
        factors.insert(Region::Europe, 295.0);
        factors.insert(Region::Asia, 570.0);
        factors.insert(Region::World, Self::WORLD_G_PER_KWH);
        Self { factors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_region_defaults_to_world() {
        assert_eq!(Region::from_name("atlantis"), Region::World);
        assert_eq!(Region::from_name(""), Region::World);
        assert_eq!(Region::from_optional(None), Region::World);
        assert_eq!(Region::from_name("EU"), Region::Europe);
    }

    #[test]
    fn test_co2_conversion() {
        let table = RegionalFactors::default();
        // 1 kWh in the world region is the world factor in grams.
        assert!((table.co2_grams(1000.0, Region::World) - 475.0).abs() < 1e-9);
        assert!(table.factor(Region::Asia) > table.factor(Region::Europe));
    }

    #[test]
    fn test_overrides_validated() {
        let mut overrides = BTreeMap::new();
        overrides.insert(Region::Europe, 100.0);
        let table = RegionalFactors::with_overrides(&overrides).unwrap();
        assert_eq!(table.factor(Region::Europe), 100.0);
        assert_eq!(table.factor(Region::Usa), 386.0);

        overrides.insert(Region::Asia, -1.0);
        assert!(RegionalFactors::with_overrides(&overrides).is_err());
    }
}
