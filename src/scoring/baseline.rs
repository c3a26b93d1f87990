use super::{clamp_score, complexity_score, estimate_resources, ScoreCard, Scorer};
use crate::features::{FeatureVector, Signal};
use crate::region::{Region, RegionalFactors};
use std::sync::Arc;

/// One penalty term: `weight * max(0, value - allowance)`, optionally capped.
struct Penalty {
    signal: Signal,
    weight: f64,
    allowance: f64,
    cap: Option<f64>,
}

const PENALTIES: &[Penalty] = &[
    // One loop level is free; every level beyond it costs 20 points.
    Penalty { signal: Signal::NestedLoopDepth, weight: 20.0, allowance: 1.0, cap: None },
    Penalty { signal: Signal::AllocInLoopCount, weight: 3.0, allowance: 0.0, cap: Some(15.0) },
    Penalty { signal: Signal::StringConcatInLoopCount, weight: 6.0, allowance: 0.0, cap: Some(24.0) },
    Penalty { signal: Signal::AwaitInLoopCount, weight: 8.0, allowance: 0.0, cap: Some(24.0) },
    Penalty { signal: Signal::IoInLoopCount, weight: 5.0, allowance: 0.0, cap: Some(20.0) },
    Penalty { signal: Signal::RecursionCount, weight: 5.0, allowance: 0.0, cap: Some(15.0) },
    Penalty { signal: Signal::IndexIterationCount, weight: 4.0, allowance: 0.0, cap: Some(16.0) },
    Penalty { signal: Signal::AppendInLoopCount, weight: 2.0, allowance: 0.0, cap: Some(10.0) },
    Penalty { signal: Signal::ManualAccumulationCount, weight: 3.0, allowance: 0.0, cap: Some(9.0) },
    Penalty { signal: Signal::InvariantCallInLoopCount, weight: 2.0, allowance: 0.0, cap: Some(8.0) },
    Penalty { signal: Signal::WildcardImportCount, weight: 2.0, allowance: 0.0, cap: Some(6.0) },
    Penalty { signal: Signal::CyclomaticComplexity, weight: 0.5, allowance: 10.0, cap: Some(15.0) },
];

/// Rule-based scorer: `100 - sum(penalties)`, clamped to `[0, 100]`.
///
/// All weights are non-negative, so raising any penalised signal can only
/// lower the score.
pub struct BaselineScorer {
    factors: Arc<RegionalFactors>,
}

impl BaselineScorer {
    pub fn new(factors: Arc<RegionalFactors>) -> Self {
        Self { factors }
    }

    /// Total penalty before clamping.
    pub fn penalty(features: &FeatureVector) -> f64 {
        PENALTIES
            .iter()
            .map(|p| {
                let excess = (features.get(p.signal) - p.allowance).max(0.0);
                let raw = p.weight * excess;
                match p.cap {
                    Some(cap) => raw.min(cap),
                    None => raw,
                }
            })
            .sum()
    }
}

impl Default for BaselineScorer {
    fn default() -> Self {
        Self::new(RegionalFactors::default().into_shared())
    }
}

impl Scorer for BaselineScorer {
    fn name(&self) -> &'static str {
        "baseline"
    }

    fn score(&self, features: &FeatureVector, region: Region) -> ScoreCard {
        let resources = estimate_resources(features);
        ScoreCard {
            green_score: clamp_score(100.0 - Self::penalty(features)),
            energy_wh: resources.energy_wh,
            co2_g: self.factors.co2_grams(resources.energy_wh, region),
            cpu_time_ms: resources.cpu_time_ms,
            memory_mb: resources.memory_mb,
            complexity_score: complexity_score(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Confidence;
    use crate::language::Language;

    #[test]
    fn test_clean_code_scores_100() {
        let fv = FeatureVector::empty(Language::Python, Confidence::Full)
            .with_signal(Signal::StatementCount, 1.0)
            .with_signal(Signal::IoCallCount, 1.0);
        let card = BaselineScorer::default().score(&fv, Region::World);
        assert_eq!(card.green_score, 100.0);
    }

    #[test]
    fn test_caps_apply() {
        let fv = FeatureVector::empty(Language::Java, Confidence::Heuristic)
            .with_signal(Signal::AllocInLoopCount, 1000.0);
        assert_eq!(BaselineScorer::penalty(&fv), 15.0);
    }

    #[test]
    fn test_region_changes_only_co2() {
        let scorer = BaselineScorer::default();
        let fv = FeatureVector::empty(Language::Python, Confidence::Full)
            .with_signal(Signal::StatementCount, 10.0);
        let eu = scorer.score(&fv, Region::Europe);
        let asia = scorer.score(&fv, Region::Asia);
        assert_eq!(eu.green_score, asia.green_score);
        assert_eq!(eu.energy_wh, asia.energy_wh);
        assert!(eu.co2_g < asia.co2_g);
    }
}
