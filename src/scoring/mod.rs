//! Green score and resource estimation.
//!
//! Two implementations share the `Scorer` trait: a deterministic rule-based
//! baseline and an adapter over trained coefficients. Both must keep the same
//! contract: score in `[0, 100]`, never rising as loop nesting deepens.

pub mod baseline;
pub mod trained;

pub use baseline::BaselineScorer;
pub use trained::TrainedScorer;

use crate::features::{FeatureVector, Signal};
use crate::region::Region;
use serde::Serialize;

/// Everything a scorer says about one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreCard {
    pub green_score: f64,
    pub energy_wh: f64,
    pub co2_g: f64,
    pub cpu_time_ms: f64,
    pub memory_mb: f64,
    pub complexity_score: f64,
}

/// Maps a feature vector to a score card.
pub trait Scorer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn score(&self, features: &FeatureVector, region: Region) -> ScoreCard;
}

/// Per-run resource figures before any model-specific scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceEstimate {
    pub energy_wh: f64,
    pub cpu_time_ms: f64,
    pub memory_mb: f64,
}

/// Energy per abstract operation for a unit-efficiency language, in Wh.
const WH_PER_OP: f64 = 1e-6;
/// CPU time per abstract operation for a unit-efficiency language, in ms.
const MS_PER_OP: f64 = 0.01;

/// Nesting levels past this one no longer grow the operation estimate.
pub const MAX_SCALED_DEPTH: f64 = 12.0;

/// Ceiling on the operation estimate.
const MAX_OPERATIONS: f64 = 1e18;

/// Abstract operation count for one run of the code.
///
/// Straight-line work is scaled by `4^depth` for nested loops (depth capped
/// at `MAX_SCALED_DEPTH`), then each costly in-loop pattern adds a fixed
/// surcharge. The result saturates at a finite ceiling.
pub fn operation_count(features: &FeatureVector) -> f64 {
    let base = features.get(Signal::StatementCount)
        + 0.5 * features.get(Signal::BranchCount)
        + 2.0 * features.get(Signal::LoopCount);
    let nesting = 4f64.powf(features.get(Signal::NestedLoopDepth).min(MAX_SCALED_DEPTH));

    let surcharges = 10.0 * features.get(Signal::AllocInLoopCount)
        + 15.0 * features.get(Signal::StringConcatInLoopCount)
        + 25.0 * features.get(Signal::IoInLoopCount)
        + 20.0 * features.get(Signal::AwaitInLoopCount)
        + 8.0 * features.get(Signal::RecursionCount)
        + 5.0 * features.get(Signal::AppendInLoopCount)
        + 3.0 * features.get(Signal::InvariantCallInLoopCount)
        + 2.0 * features.get(Signal::IndexIterationCount)
        + 2.0 * features.get(Signal::ManualAccumulationCount)
        + features.get(Signal::IoCallCount);

    (base * nesting + surcharges).min(MAX_OPERATIONS)
}

/// Estimates energy, CPU time and memory from structure and language.
pub fn estimate_resources(features: &FeatureVector) -> ResourceEstimate {
    let language = features.language();
    let ops = operation_count(features);
    let efficiency = language.efficiency_factor();

    let memory_mb = language.runtime_memory_mb()
        + 0.01 * features.get(Signal::StatementCount)
        + 0.5 * features.get(Signal::AllocInLoopCount)
        + 0.25 * features.get(Signal::AppendInLoopCount)
        + 0.2 * features.get(Signal::StringConcatInLoopCount);

    ResourceEstimate {
        energy_wh: ops * efficiency * WH_PER_OP,
        cpu_time_ms: ops * efficiency * MS_PER_OP,
        memory_mb,
    }
}

/// Big-O label for the loop nesting: `O(1)`, `O(n)`, `O(n^d)`.
pub fn algorithm_complexity(features: &FeatureVector) -> String {
    match features.get(Signal::NestedLoopDepth) as u64 {
        0 => "O(1)".to_string(),
        1 => "O(n)".to_string(),
        depth => format!("O(n^{})", depth),
    }
}

/// `min(10, cyclomatic_complexity / 10)`.
pub fn complexity_score(features: &FeatureVector) -> f64 {
    (features.get(Signal::CyclomaticComplexity) / 10.0).min(10.0)
}

pub(crate) fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Confidence;
    use crate::language::Language;

    #[test]
    fn test_nesting_multiplies_operations() {
        let flat = FeatureVector::empty(Language::Python, Confidence::Full)
            .with_signal(Signal::StatementCount, 4.0)
            .with_signal(Signal::LoopCount, 1.0)
            .with_signal(Signal::NestedLoopDepth, 1.0);
        let nested = flat.with_signal(Signal::NestedLoopDepth, 2.0);
        assert!((operation_count(&nested) - 4.0 * operation_count(&flat)).abs() < 1e-9);
    }

    #[test]
    fn test_nesting_scale_is_capped() {
        let capped = FeatureVector::empty(Language::Java, Confidence::Heuristic)
            .with_signal(Signal::StatementCount, 1.0)
            .with_signal(Signal::NestedLoopDepth, MAX_SCALED_DEPTH);
        let deeper = capped.with_signal(Signal::NestedLoopDepth, 600.0);
        assert_eq!(operation_count(&capped), operation_count(&deeper));

        let estimate = estimate_resources(&deeper);
        assert!(estimate.energy_wh.is_finite());
        assert!(estimate.cpu_time_ms.is_finite());
    }

    #[test]
    fn test_complexity_score_capped() {
        let fv = FeatureVector::empty(Language::Cpp, Confidence::Heuristic)
            .with_signal(Signal::CyclomaticComplexity, 500.0);
        assert_eq!(complexity_score(&fv), 10.0);
    }

    #[test]
    fn test_algorithm_complexity_labels() {
        let fv = FeatureVector::empty(Language::Python, Confidence::Full);
        assert_eq!(algorithm_complexity(&fv), "O(1)");
        assert_eq!(algorithm_complexity(&fv.with_signal(Signal::NestedLoopDepth, 1.0)), "O(n)");
        assert_eq!(algorithm_complexity(&fv.with_signal(Signal::NestedLoopDepth, 3.0)), "O(n^3)");
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-5.0), 0.0);
        assert_eq!(clamp_score(150.0), 100.0);
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }
}
