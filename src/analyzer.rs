use crate::config::{EngineConfig, ScorerConfig};
use crate::error::{EngineError, Result};
use crate::features::{self, Confidence, FeatureVector};
use crate::impact::{ImpactTranslator, RealWorldImpact};
use crate::language::Language;
use crate::ranker::Ranker;
use crate::region::{Region, RegionalFactors};
use crate::rules::{self, Finding};
use crate::scoring::{self, BaselineScorer, Scorer, TrainedScorer};
use anyhow::Context;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// One code unit submitted for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub code: String,
    pub language: Language,
    pub region: Region,
}

impl SourceUnit {
    pub fn new(code: impl Into<String>, language: Language, region: Region) -> Self {
        Self {
            code: code.into(),
            language,
            region,
        }
    }
}

/// Holds the results of analyzing one code unit.
/// This struct is serialized to JSON if requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Sustainability rating, 0 (worst) to 100 (best).
    pub green_score: f64,
    pub energy_consumption_wh: f64,
    pub co2_emissions_g: f64,
    pub cpu_time_ms: f64,
    pub memory_usage_mb: f64,
    /// Cyclomatic complexity scaled to 0-10.
    pub complexity_score: f64,
    /// Big-O label from loop nesting, e.g. `O(n^2)`.
    pub algorithm_complexity: String,
    /// `full` when the code was parsed, `heuristic` otherwise.
    pub confidence: Confidence,
    pub language: Language,
    pub region: Region,
    /// Ranked optimization suggestions, best first.
    pub suggestions: Vec<Finding>,
    /// The feature vector everything above was derived from.
    pub analysis_details: FeatureVector,
    pub real_world_impact: RealWorldImpact,
}

/// Outcome for one file in a directory scan.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    /// Why the file produced no result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Results of a directory scan.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub summary: BatchSummary,
}

/// Summary statistics for a directory scan.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    /// Total number of source files found.
    pub total_files: usize,
    /// Files that produced a result.
    pub analyzed: usize,
    /// Mean green score over analyzed files, if any.
    pub average_green_score: Option<f64>,
    pub total_energy_wh: f64,
    pub total_co2_g: f64,
}

/// The analysis engine.
///
/// Holds the read-only state every analysis shares: the regional factor
/// table, the scorer, and the limits from configuration. It is `Send + Sync`
/// and can be used from many threads at once.
pub struct Engine {
    factors: Arc<RegionalFactors>,
    scorer: Box<dyn Scorer>,
    ranker: Ranker,
    translator: ImpactTranslator,
    max_code_bytes: usize,
    disabled_rules: Vec<String>,
}

impl Engine {
    /// Creates an engine with default settings and the baseline scorer.
    pub fn new() -> Self {
        let factors = RegionalFactors::default().into_shared();
        let scorer = Box::new(BaselineScorer::new(Arc::clone(&factors)));
        Self::with_scorer(&EngineConfig::default(), factors, scorer)
    }

    /// Builds an engine from configuration, loading a trained model if one
    /// is configured.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let factors = RegionalFactors::with_overrides(&config.region_overrides()?)?.into_shared();

        let scorer: Box<dyn Scorer> = match &config.scorer {
            ScorerConfig::Baseline => Box::new(BaselineScorer::new(Arc::clone(&factors))),
            ScorerConfig::Trained { model_path } => {
                Box::new(TrainedScorer::from_path(model_path, Arc::clone(&factors))?)
            }
        };

        Ok(Self::with_scorer(config, factors, scorer))
    }

    /// Builds an engine around an already constructed scorer.
    pub fn with_scorer(config: &EngineConfig, factors: Arc<RegionalFactors>, scorer: Box<dyn Scorer>) -> Self {
        tracing::debug!(scorer = scorer.name(), "engine ready");
        Self {
            factors,
            scorer,
            ranker: Ranker::new(config.max_suggestions),
            translator: ImpactTranslator::new(config.impact_runs),
            max_code_bytes: config.max_code_bytes,
            disabled_rules: config.disabled_rules.clone(),
        }
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    pub fn regional_factors(&self) -> &RegionalFactors {
        &self.factors
    }

    pub fn max_code_bytes(&self) -> usize {
        self.max_code_bytes
    }

    /// Analyzes one code unit.
    ///
    /// Fails only for oversized or empty input. An unknown language or code
    /// that does not parse degrades to heuristic extraction, visible in the
    /// result's `confidence`.
    pub fn analyze(&self, code: &str, language: Language, region: Region) -> Result<AnalysisResult> {
        if code.len() > self.max_code_bytes {
            return Err(EngineError::InputTooLarge {
                size: code.len(),
                limit: self.max_code_bytes,
            });
        }
        if code.trim().is_empty() {
            return Err(EngineError::EmptyInput);
        }
        if language == Language::Unknown {
            tracing::warn!("unsupported language, falling back to heuristic analysis");
        }

        let features = features::extract(code, language);
        let card = self.scorer.score(&features, region);
        let mut findings = rules::detect_filtered(code, &features, &self.disabled_rules);
        findings.extend(rules::detect_scored(card.green_score, &features, &self.disabled_rules));
        let detected = findings.len();
        let suggestions = self.ranker.rank(findings, &features, self.scorer.as_ref());
        let real_world_impact = self.translator.translate(card.energy_wh, card.co2_g);

        tracing::debug!(
            language = %language,
            region = %region,
            confidence = ?features.confidence(),
            green_score = card.green_score,
            detected,
            suggested = suggestions.len(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            green_score: card.green_score,
            energy_consumption_wh: card.energy_wh,
            co2_emissions_g: card.co2_g,
            cpu_time_ms: card.cpu_time_ms,
            memory_usage_mb: card.memory_mb,
            complexity_score: card.complexity_score,
            algorithm_complexity: scoring::algorithm_complexity(&features),
            confidence: features.confidence(),
            language,
            region,
            suggestions,
            analysis_details: features,
            real_world_impact,
        })
    }

    /// Like `analyze`, with the language and region given as free-form names.
    ///
    /// Unknown language names analyze as `unknown`; unknown or missing
    /// regions use the world average.
    pub fn analyze_named(&self, code: &str, language: &str, region: Option<&str>) -> Result<AnalysisResult> {
        self.analyze(code, Language::from_name(language), Region::from_optional(region))
    }

    pub fn analyze_unit(&self, unit: &SourceUnit) -> Result<AnalysisResult> {
        self.analyze(&unit.code, unit.language, unit.region)
    }

    /// Analyzes a file, or every supported source file under a directory.
    ///
    /// This method:
    /// 1. Walks the directory tree to find files with a known extension.
    /// 2. Reads and analyzes them in parallel using `rayon`.
    /// 3. Records per-file failures (unreadable, empty, too large) without
    ///    aborting the scan.
    /// 4. Returns the reports sorted by path along with a summary.
    pub fn analyze_path(&self, path: &Path, region: Region) -> anyhow::Result<BatchReport> {
        if !path.exists() {
            anyhow::bail!("path does not exist: {}", path.display());
        }

        let mut files: Vec<(PathBuf, Language)> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| Language::from_path(e.path()).map(|lang| (e.path().to_path_buf(), lang)))
            .collect();
        files.sort();

        let total_files = files.len();
        tracing::info!(root = %path.display(), total_files, "scanning source files");

        let reports: Vec<FileReport> = files
            .par_iter()
            .map(|(file, language)| {
                let outcome = fs::read_to_string(file)
                    .with_context(|| format!("failed to read {}", file.display()))
                    .and_then(|code| Ok(self.analyze(&code, *language, region)?));

                match outcome {
                    Ok(result) => FileReport {
                        file: file.clone(),
                        result: Some(result),
                        error: None,
                    },
                    Err(err) => {
                        tracing::warn!(file = %file.display(), error = %err, "skipping file");
                        FileReport {
                            file: file.clone(),
                            result: None,
                            error: Some(format!("{:#}", err)),
                        }
                    }
                }
            })
            .collect();

        let results: Vec<&AnalysisResult> = reports.iter().filter_map(|r| r.result.as_ref()).collect();
        let analyzed = results.len();
        let average_green_score = if analyzed > 0 {
            Some(results.iter().map(|r| r.green_score).sum::<f64>() / analyzed as f64)
        } else {
            None
        };
        let summary = BatchSummary {
            total_files,
            analyzed,
            average_green_score,
            total_energy_wh: results.iter().map(|r| r.energy_consumption_wh).sum(),
            total_co2_g: results.iter().map(|r| r.co2_emissions_g).sum(),
        };

        Ok(BatchReport {
            files: reports,
            summary,
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
