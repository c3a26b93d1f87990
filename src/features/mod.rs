//! Structural feature extraction.
//!
//! Python is walked as a real syntax tree; everything else (and Python that
//! fails to parse) goes through the regex/token scanner in `heuristic`.

pub mod heuristic;
pub mod python;

use crate::language::{Capability, Language};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A named structural signal measured on a code unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    LineCount,
    TokenCount,
    StatementCount,
    FunctionCount,
    BranchCount,
    LoopCount,
    NestedLoopDepth,
    CyclomaticComplexity,
    AllocInLoopCount,
    StringConcatInLoopCount,
    AwaitInLoopCount,
    IoCallCount,
    IoInLoopCount,
    PrintInLoopCount,
    RecursionCount,
    IndexIterationCount,
    AppendInLoopCount,
    ManualAccumulationCount,
    InvariantCallInLoopCount,
    WildcardImportCount,
}

impl Signal {
    pub const ALL: [Signal; 20] = [
        Signal::LineCount,
        Signal::TokenCount,
        Signal::StatementCount,
        Signal::FunctionCount,
        Signal::BranchCount,
        Signal::LoopCount,
        Signal::NestedLoopDepth,
        Signal::CyclomaticComplexity,
        Signal::AllocInLoopCount,
        Signal::StringConcatInLoopCount,
        Signal::AwaitInLoopCount,
        Signal::IoCallCount,
        Signal::IoInLoopCount,
        Signal::PrintInLoopCount,
        Signal::RecursionCount,
        Signal::IndexIterationCount,
        Signal::AppendInLoopCount,
        Signal::ManualAccumulationCount,
        Signal::InvariantCallInLoopCount,
        Signal::WildcardImportCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Signal::LineCount => "line_count",
            Signal::TokenCount => "token_count",
            Signal::StatementCount => "statement_count",
            Signal::FunctionCount => "function_count",
            Signal::BranchCount => "branch_count",
            Signal::LoopCount => "loop_count",
            Signal::NestedLoopDepth => "nested_loop_depth",
            Signal::CyclomaticComplexity => "cyclomatic_complexity",
            Signal::AllocInLoopCount => "alloc_in_loop_count",
            Signal::StringConcatInLoopCount => "string_concat_in_loop_count",
            Signal::AwaitInLoopCount => "await_in_loop_count",
            Signal::IoCallCount => "io_call_count",
            Signal::IoInLoopCount => "io_in_loop_count",
            Signal::PrintInLoopCount => "print_in_loop_count",
            Signal::RecursionCount => "recursion_count",
            Signal::IndexIterationCount => "index_iteration_count",
            Signal::AppendInLoopCount => "append_in_loop_count",
            Signal::ManualAccumulationCount => "manual_accumulation_count",
            Signal::InvariantCallInLoopCount => "invariant_call_in_loop_count",
            Signal::WildcardImportCount => "wildcard_import_count",
        }
    }

    /// Looks a signal up by its snake_case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Signal::ALL.iter().copied().find(|s| s.name() == name)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a feature vector came from a real parse or from token scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Full,
    Heuristic,
}

/// Structural signals for one code unit.
///
/// Every `Signal` has an entry (absent patterns are `0.0`) and no value is
/// negative. The vector is immutable; `with_signal` returns a modified copy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    language: Language,
    confidence: Confidence,
    signals: BTreeMap<Signal, f64>,
    /// First line (1-based) on which a signal was observed.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    locations: BTreeMap<Signal, usize>,
}

impl FeatureVector {
    /// Builds a vector from raw counts.
    ///
    /// Missing signals are filled with zero; negative or non-finite values are
    /// clamped to zero.
    pub fn new(
        language: Language,
        confidence: Confidence,
        raw: BTreeMap<Signal, f64>,
        locations: BTreeMap<Signal, usize>,
    ) -> Self {
        let signals = Signal::ALL
            .iter()
            .map(|&signal| {
                let value = raw.get(&signal).copied().unwrap_or(0.0);
                let value = if value.is_finite() && value > 0.0 { value } else { 0.0 };
                (signal, value)
            })
            .collect();
        Self {
            language,
            confidence,
            signals,
            locations,
        }
    }

    /// A vector with every signal at zero.
    pub fn empty(language: Language, confidence: Confidence) -> Self {
        Self::new(language, confidence, BTreeMap::new(), BTreeMap::new())
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn get(&self, signal: Signal) -> f64 {
        self.signals.get(&signal).copied().unwrap_or(0.0)
    }

    pub fn location(&self, signal: Signal) -> Option<usize> {
        self.locations.get(&signal).copied()
    }

    pub fn signals(&self) -> &BTreeMap<Signal, f64> {
        &self.signals
    }

    /// Returns a copy with `signal` set to `value`.
    ///
    /// `cyclomatic_complexity` is derived from branches and loops, so it is
    /// recomputed whenever one of those two changes.
    pub fn with_signal(&self, signal: Signal, value: f64) -> Self {
        let mut raw = self.signals.clone();
        raw.insert(signal, value);
        if matches!(signal, Signal::BranchCount | Signal::LoopCount) {
            let branches = raw.get(&Signal::BranchCount).copied().unwrap_or(0.0).max(0.0);
            let loops = raw.get(&Signal::LoopCount).copied().unwrap_or(0.0).max(0.0);
            raw.insert(Signal::CyclomaticComplexity, 1.0 + branches + loops);
        }
        Self::new(self.language, self.confidence, raw, self.locations.clone())
    }
}

/// Mutable tally used by the extractors while scanning.
#[derive(Debug, Default)]
pub(crate) struct SignalTally {
    counts: BTreeMap<Signal, f64>,
    locations: BTreeMap<Signal, usize>,
}

impl SignalTally {
    /// Adds one occurrence of `signal` seen at `line`.
    pub(crate) fn bump(&mut self, signal: Signal, line: usize) {
        *self.counts.entry(signal).or_insert(0.0) += 1.0;
        self.locations.entry(signal).or_insert(line);
    }

    /// Adds `amount` occurrences without recording a location.
    pub(crate) fn add(&mut self, signal: Signal, amount: f64) {
        *self.counts.entry(signal).or_insert(0.0) += amount;
    }

    /// Raises `signal` to at least `value`, recording `line` when it grows.
    pub(crate) fn raise(&mut self, signal: Signal, value: f64, line: usize) {
        let entry = self.counts.entry(signal).or_insert(0.0);
        if value > *entry {
            *entry = value;
            self.locations.insert(signal, line);
        }
    }

    pub(crate) fn set(&mut self, signal: Signal, value: f64) {
        self.counts.insert(signal, value);
    }

    pub(crate) fn get(&self, signal: Signal) -> f64 {
        self.counts.get(&signal).copied().unwrap_or(0.0)
    }

    /// Fills the size and derived signals and freezes the tally.
    pub(crate) fn finish(mut self, code: &str, language: Language, confidence: Confidence) -> FeatureVector {
        self.set(Signal::LineCount, code.lines().count() as f64);
        self.set(Signal::TokenCount, count_tokens(code) as f64);
        let complexity = 1.0 + self.get(Signal::BranchCount) + self.get(Signal::LoopCount);
        self.set(Signal::CyclomaticComplexity, complexity);
        FeatureVector::new(language, confidence, self.counts, self.locations)
    }
}

lazy_static! {
    /// Identifiers, numbers and single punctuation characters.
    static ref TOKEN_RE: Regex = Regex::new(r"[A-Za-z_][A-Za-z0-9_]*|\d+(?:\.\d+)?|[^\sA-Za-z0-9_]").unwrap();
}

/// Counts lexical tokens with a language-agnostic regex.
pub fn count_tokens(code: &str) -> usize {
    TOKEN_RE.find_iter(code).count()
}

/// Extracts a feature vector from `code`.
///
/// Never fails: languages without a parser, Python that does not parse, and
/// Python nested too deeply to walk fall back to the heuristic scanner and
/// are marked `Confidence::Heuristic`.
pub fn extract(code: &str, language: Language) -> FeatureVector {
    match language.capability() {
        Capability::FullParser if python::exceeds_nesting_limit(code) => {
            tracing::debug!("python nesting too deep to walk, using heuristic extraction");
            heuristic::extract(code, language)
        }
        Capability::FullParser => match python::extract(code) {
            Ok(features) => features,
            Err(err) => {
                tracing::debug!(error = %err, "python parse failed, using heuristic extraction");
                heuristic::extract(code, language)
            }
        },
        Capability::HeuristicOnly => heuristic::extract(code, language),
    }
}
