// Lib file to expose modules for testing and external usage.
// This file serves as the root for the library crate.

/// Module containing the analysis engine.
/// This includes the `Engine` struct, `AnalysisResult` and directory scanning.
pub mod analyzer;

/// Module containing engine configuration loaded from TOML.
pub mod config;

/// Module defining the error type returned by the engine.
pub mod error;

/// Module containing feature extraction.
/// Python is walked as a syntax tree; other languages are scanned heuristically.
pub mod features;

/// Module translating energy and CO2 into everyday equivalents.
pub mod impact;

/// Module defining supported languages and their runtime costs.
pub mod language;

/// Module ordering and deduplicating suggestions.
pub mod ranker;

/// Module defining grid regions and their carbon intensity.
pub mod region;

/// Module containing the per-language pattern rule tables.
pub mod rules;

/// Module containing the green score models.
pub mod scoring;

/// Module containing utility functions.
/// This includes line mapping and comment/string blanking.
pub mod utils;

pub use analyzer::{AnalysisResult, Engine, SourceUnit};
pub use error::EngineError;
pub use language::Language;
pub use region::Region;
