use crate::features::FeatureVector;
use crate::region::Region;
use crate::rules::{Finding, PredictedImprovement};
use crate::scoring::Scorer;

/// Default number of suggestions returned.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Orders, deduplicates and caps findings.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    cap: usize,
}

impl Ranker {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Ranks `findings` for code with the given `features`.
    ///
    /// 1. Keep one finding per `pattern_id`: the highest severity, the
    ///    earliest on ties.
    /// 2. Predict each improvement by re-scoring the features with the
    ///    finding's relief applied.
    /// 3. Stable sort by severity, then green-score delta, both descending.
    /// 4. Truncate to the cap.
    ///
    /// Ranking an already ranked list returns it unchanged.
    pub fn rank(&self, findings: Vec<Finding>, features: &FeatureVector, scorer: &dyn Scorer) -> Vec<Finding> {
        // Deltas only depend on relative scores, so the region is fixed.
        let original = scorer.score(features, Region::World);

        let mut unique: Vec<Finding> = Vec::with_capacity(findings.len());
        for finding in findings {
            match unique.iter_mut().find(|kept| kept.pattern_id == finding.pattern_id) {
                Some(kept) => {
                    if finding.severity > kept.severity {
                        *kept = finding;
                    }
                }
                None => unique.push(finding),
            }
        }

        for finding in &mut unique {
            let improved = scorer.score(&finding.relief.apply(features), Region::World);
            finding.predicted_improvement = PredictedImprovement {
                green_score_delta: improved.green_score - original.green_score,
                energy_wh_delta: improved.energy_wh - original.energy_wh,
            };
        }

        unique.sort_by(|a, b| {
            b.severity.cmp(&a.severity).then_with(|| {
                b.predicted_improvement
                    .green_score_delta
                    .total_cmp(&a.predicted_improvement.green_score_delta)
            })
        });
        unique.truncate(self.cap);

        tracing::trace!(kept = unique.len(), cap = self.cap, "ranked findings");
        unique
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SUGGESTIONS)
    }
}
