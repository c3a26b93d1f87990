use super::{clamp_score, complexity_score, estimate_resources, ScoreCard, Scorer};
use crate::error::{EngineError, Result};
use crate::features::{FeatureVector, Signal};
use crate::region::{Region, RegionalFactors};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

fn unit_scale() -> f64 {
    1.0
}

/// On-disk coefficient file.
#[derive(Debug, Deserialize)]
struct ModelFile {
    #[serde(default)]
    version: Option<String>,
    intercept: f64,
    #[serde(default)]
    weights: BTreeMap<String, f64>,
    #[serde(default = "unit_scale")]
    energy_scale: f64,
    #[serde(default = "unit_scale")]
    cpu_scale: f64,
    #[serde(default = "unit_scale")]
    memory_scale: f64,
}

/// Scorer backed by coefficients fitted offline.
///
/// `green = intercept - sum(w_i * ln(1 + x_i))`, clamped to `[0, 100]`.
/// Weights are validated non-negative on load, which keeps the same
/// monotonic direction as the baseline.
#[derive(Debug)]
pub struct TrainedScorer {
    version: String,
    intercept: f64,
    weights: BTreeMap<Signal, f64>,
    energy_scale: f64,
    cpu_scale: f64,
    memory_scale: f64,
    factors: Arc<RegionalFactors>,
}

impl TrainedScorer {
    /// Parses and validates a JSON coefficient file.
    pub fn from_json_str(json: &str, factors: Arc<RegionalFactors>) -> Result<Self> {
        let model: ModelFile = serde_json::from_str(json)?;

        if !model.intercept.is_finite() {
            return Err(EngineError::InvalidModel("intercept must be finite".to_string()));
        }

        let mut weights = BTreeMap::new();
        for (name, weight) in model.weights {
            let signal = Signal::from_name(&name)
                .ok_or_else(|| EngineError::InvalidModel(format!("unknown signal '{}'", name)))?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::InvalidModel(format!(
                    "weight for {} must be finite and non-negative, got {}",
                    name, weight
                )));
            }
            weights.insert(signal, weight);
        }

        for (label, scale) in [
            ("energy_scale", model.energy_scale),
            ("cpu_scale", model.cpu_scale),
            ("memory_scale", model.memory_scale),
        ] {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(EngineError::InvalidModel(format!(
                    "{} must be finite and positive, got {}",
                    label, scale
                )));
            }
        }

        Ok(Self {
            version: model.version.unwrap_or_else(|| "unversioned".to_string()),
            intercept: model.intercept,
            weights,
            energy_scale: model.energy_scale,
            cpu_scale: model.cpu_scale,
            memory_scale: model.memory_scale,
            factors,
        })
    }

    /// Loads a coefficient file from disk.
    pub fn from_path(path: &Path, factors: Arc<RegionalFactors>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let scorer = Self::from_json_str(&json, factors)?;
        tracing::info!(path = %path.display(), version = %scorer.version, "loaded trained scoring model");
        Ok(scorer)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    fn raw_score(&self, features: &FeatureVector) -> f64 {
        let penalty: f64 = self
            .weights
            .iter()
            .map(|(signal, weight)| weight * features.get(*signal).ln_1p())
            .sum();
        self.intercept - penalty
    }
}

impl Scorer for TrainedScorer {
    fn name(&self) -> &'static str {
        "trained"
    }

    fn score(&self, features: &FeatureVector, region: Region) -> ScoreCard {
        let resources = estimate_resources(features);
        let energy_wh = resources.energy_wh * self.energy_scale;
        ScoreCard {
            green_score: clamp_score(self.raw_score(features)),
            energy_wh,
            co2_g: self.factors.co2_grams(energy_wh, region),
            cpu_time_ms: resources.cpu_time_ms * self.cpu_scale,
            memory_mb: resources.memory_mb * self.memory_scale,
            complexity_score: complexity_score(features),
        }
    }
}
