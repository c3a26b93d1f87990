// Rules module
// Per-language tables of energy anti-patterns and their rewrites.

/// Patterns specific to Python.
pub mod python;

/// Patterns specific to JavaScript and TypeScript.
pub mod javascript;

/// Patterns specific to Java.
pub mod java;

/// Patterns specific to C and C++.
pub mod cpp;

/// Patterns that apply to any language, and the only table for unknown ones.
pub mod generic;

use crate::features::{FeatureVector, Signal};
use crate::language::Language;
use serde::{Deserialize, Serialize};

/// How urgent a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// What applying a rule's rewrite does to its triggering signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReliefAction {
    Zero,
    Halve,
}

/// The synthetic "after" change used to predict a rule's improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relief {
    pub signal: Signal,
    pub action: ReliefAction,
}

impl Relief {
    pub const fn zero(signal: Signal) -> Self {
        Self {
            signal,
            action: ReliefAction::Zero,
        }
    }

    pub const fn halve(signal: Signal) -> Self {
        Self {
            signal,
            action: ReliefAction::Halve,
        }
    }

    /// Returns a copy of `features` with the relief applied.
    pub fn apply(&self, features: &FeatureVector) -> FeatureVector {
        let current = features.get(self.signal);
        let relieved = match self.action {
            ReliefAction::Zero => 0.0,
            ReliefAction::Halve => current / 2.0,
        };
        features.with_signal(self.signal, relieved)
    }
}

/// When a rule fires.
#[derive(Debug, Clone, Copy)]
pub enum Trigger {
    /// The signal is at least the given value.
    AtLeast(Signal, f64),
    /// The signal is strictly above the given value.
    Above(Signal, f64),
    /// Arbitrary check over the features and the raw code.
    Custom(fn(&FeatureVector, &str) -> bool),
    /// The green score is strictly below the given value.
    ScoreBelow(f64),
}

impl Trigger {
    /// Whether the trigger fires on features alone. Score triggers never do;
    /// see `fires_on_score`.
    pub fn fires(&self, features: &FeatureVector, code: &str) -> bool {
        match *self {
            Trigger::AtLeast(signal, threshold) => features.get(signal) >= threshold,
            Trigger::Above(signal, threshold) => features.get(signal) > threshold,
            Trigger::Custom(check) => check(features, code),
            Trigger::ScoreBelow(_) => false,
        }
    }

    pub fn fires_on_score(&self, green_score: f64) -> bool {
        match *self {
            Trigger::ScoreBelow(threshold) => green_score < threshold,
            _ => false,
        }
    }
}

/// A detectable anti-pattern with a canonical rewrite.
#[derive(Debug)]
pub struct PatternRule {
    /// Stable identifier, shared across tables for the same pattern.
    pub id: &'static str,
    pub title: &'static str,
    pub severity: Severity,
    pub trigger: Trigger,
    pub relief: Relief,
    pub before: &'static str,
    pub after: &'static str,
    pub explanation: &'static str,
}

impl PatternRule {
    fn finding(&self, features: &FeatureVector) -> Finding {
        Finding {
            pattern_id: self.id.to_string(),
            finding_text: self.title.to_string(),
            before_code: self.before.to_string(),
            after_code: self.after.to_string(),
            explanation: self.explanation.to_string(),
            severity: self.severity,
            predicted_improvement: PredictedImprovement::default(),
            line: features.location(self.relief.signal),
            relief: self.relief,
        }
    }
}

/// Score and energy change expected from applying a suggestion.
///
/// Both deltas are `improved - original`: a positive green delta and a
/// negative energy delta mean the rewrite helps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PredictedImprovement {
    pub green_score_delta: f64,
    pub energy_wh_delta: f64,
}

/// A detected anti-pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub pattern_id: String,
    pub finding_text: String,
    pub before_code: String,
    pub after_code: String,
    pub explanation: String,
    pub severity: Severity,
    /// Filled in by the ranker; zero straight out of `detect`.
    pub predicted_improvement: PredictedImprovement,
    /// First line where the triggering signal was observed, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip)]
    pub relief: Relief,
}

/// Rules checked for `language`: its own table, then the generic one.
pub fn rule_table(language: Language) -> Vec<&'static PatternRule> {
    let specific: &'static [PatternRule] = match language {
        Language::Python => python::RULES,
        Language::JavaScript | Language::TypeScript => javascript::RULES,
        Language::Java => java::RULES,
        Language::Cpp => cpp::RULES,
        Language::Unknown => &[],
    };
    specific.iter().chain(generic::RULES.iter()).collect()
}

/// Runs every rule for the features' language and returns the ones that fire.
///
/// Findings come back in table order and may repeat an id (a language rule
/// and its generic counterpart); deduplication is the ranker's job.
pub fn detect(code: &str, features: &FeatureVector) -> Vec<Finding> {
    detect_filtered(code, features, &[])
}

/// Like `detect`, skipping any rule whose id is listed in `disabled`.
pub fn detect_filtered(code: &str, features: &FeatureVector, disabled: &[String]) -> Vec<Finding> {
    rule_table(features.language())
        .into_iter()
        .filter(|rule| !disabled.iter().any(|id| id == rule.id))
        .filter(|rule| rule.trigger.fires(features, code))
        .map(|rule| rule.finding(features))
        .collect()
}

/// Findings about the result as a whole, judged on its green score.
///
/// Runs after scoring, so these come after the `detect` findings in
/// detection order.
pub fn detect_scored(green_score: f64, features: &FeatureVector, disabled: &[String]) -> Vec<Finding> {
    generic::SCORE_RULES
        .iter()
        .filter(|rule| !disabled.iter().any(|id| id == rule.id))
        .filter(|rule| rule.trigger.fires_on_score(green_score))
        .map(|rule| rule.finding(features))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn all_tables() -> Vec<&'static [PatternRule]> {
        vec![python::RULES, javascript::RULES, java::RULES, cpp::RULES, generic::RULES]
    }

    #[test]
    fn test_quadratic_is_high_everywhere() {
        for table in all_tables() {
            let rule = table
                .iter()
                .find(|r| r.id == "quadratic-iteration")
                .expect("every table has a quadratic rule");
            assert_eq!(rule.severity, Severity::High);
        }
    }

    #[test]
    fn test_ids_unique_within_a_table() {
        for table in all_tables() {
            let mut ids: Vec<&str> = table.iter().map(|r| r.id).collect();
            let before = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), before);
        }
    }

    #[test]
    fn test_templates_are_filled() {
        for table in all_tables() {
            for rule in table.iter() {
                assert!(!rule.before.trim().is_empty(), "{} before", rule.id);
                assert!(!rule.after.trim().is_empty(), "{} after", rule.id);
                assert!(!rule.explanation.trim().is_empty(), "{} explanation", rule.id);
            }
        }
    }

    #[test]
    fn test_unknown_uses_generic_only() {
        assert_eq!(rule_table(Language::Unknown).len(), generic::RULES.len());
        assert!(rule_table(Language::Python).len() > generic::RULES.len());
    }

    #[test]
    fn test_low_score_rule() {
        let fv = FeatureVector::empty(Language::Python, crate::features::Confidence::Full);
        let found = detect_scored(39.9, &fv, &[]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pattern_id, "low-green-score");
        assert_eq!(found[0].severity, Severity::High);

        assert!(detect_scored(generic::LOW_SCORE_THRESHOLD, &fv, &[]).is_empty());
        assert!(detect_scored(10.0, &fv, &["low-green-score".to_string()]).is_empty());
        // Never fired from features alone.
        assert!(detect("", &fv).iter().all(|f| f.pattern_id != "low-green-score"));
    }

    #[test]
    fn test_halve_relief() {
        let fv = FeatureVector::empty(Language::Java, crate::features::Confidence::Heuristic)
            .with_signal(Signal::NestedLoopDepth, 2.0);
        let relieved = Relief::halve(Signal::NestedLoopDepth).apply(&fv);
        assert_eq!(relieved.get(Signal::NestedLoopDepth), 1.0);
    }
}
