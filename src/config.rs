use crate::error::{EngineError, Result};
use crate::impact::DEFAULT_RUNS;
use crate::ranker::DEFAULT_MAX_SUGGESTIONS;
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default cap on submitted code: 1 MiB.
pub const DEFAULT_MAX_CODE_BYTES: usize = 1_048_576;

/// Which scoring model the engine uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScorerConfig {
    Baseline,
    Trained { model_path: PathBuf },
}

impl Default for ScorerConfig {
    fn default() -> Self {
        ScorerConfig::Baseline
    }
}

/// Engine settings, normally read from a TOML file.
///
/// ```toml
/// max_code_bytes = 1048576
/// max_suggestions = 5
/// impact_runs = 1000000
/// disabled_rules = ["wildcard-import"]
///
/// [regional_factors]
/// europe = 250.0
///
/// [scorer]
/// kind = "trained"
/// model_path = "models/default_coefficients.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_code_bytes: usize,
    pub max_suggestions: usize,
    pub impact_runs: u64,
    /// gCO2/kWh overrides keyed by region name.
    pub regional_factors: BTreeMap<String, f64>,
    pub scorer: ScorerConfig,
    /// Rule ids never reported.
    pub disabled_rules: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_code_bytes: DEFAULT_MAX_CODE_BYTES,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            impact_runs: DEFAULT_RUNS,
            regional_factors: BTreeMap::new(),
            scorer: ScorerConfig::default(),
            disabled_rules: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded engine configuration");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_code_bytes == 0 {
            return Err(EngineError::Config("max_code_bytes must be greater than zero".to_string()));
        }
        self.region_overrides()?;
        Ok(())
    }

    /// Region overrides with names resolved. Unknown region names are errors
    /// here, unlike at analysis time, since a typo would silently do nothing.
    pub fn region_overrides(&self) -> Result<BTreeMap<Region, f64>> {
        self.regional_factors
            .iter()
            .map(|(name, value)| {
                Region::parse(name)
                    .map(|region| (region, *value))
                    .ok_or_else(|| EngineError::Config(format!("unknown region '{}' in regional_factors", name)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_code_bytes, 1_048_576);
        assert_eq!(config.max_suggestions, 5);
    }

    #[test]
    fn test_unknown_region_rejected() {
        let err = EngineConfig::from_toml_str("[regional_factors]\nmars = 1.0\n").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(EngineConfig::from_toml_str("max_code_bytes = 0\n").is_err());
    }
}
