use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use greencode_rs::analyzer::{AnalysisResult, BatchReport, Engine};
use greencode_rs::config::EngineConfig;
use greencode_rs::language::Language;
use greencode_rs::region::Region;
use greencode_rs::rules::Severity;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command line interface configuration using `clap`.
#[derive(Parser)]
#[command(author, version, about = "Estimate the energy footprint of source code", long_about = None)]
struct Cli {
    /// File or directory to analyze.
    path: PathBuf,

    /// Language of a single file. Detected from the extension when omitted.
    #[arg(short, long)]
    language: Option<String>,

    /// Grid region used for CO2 figures (usa, europe, asia, world).
    #[arg(short, long, default_value = "world")]
    region: String,

    /// Engine configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of runs the real-world impact is projected to.
    #[arg(long)]
    runs: Option<u64>,

    /// Output raw JSON.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("failed to load {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(runs) = cli.runs {
        config.impact_runs = runs;
    }
    let engine = Engine::from_config(&config).context("failed to build the analysis engine")?;
    let region = Region::from_name(&cli.region);

    if cli.path.is_file() {
        let language = match &cli.language {
            Some(name) => Language::from_name(name),
            None => Language::from_path(&cli.path).unwrap_or(Language::Unknown),
        };
        let code = std::fs::read_to_string(&cli.path)
            .with_context(|| format!("failed to read {}", cli.path.display()))?;
        let result = engine.analyze(&code, language, region)?;

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("\n{} {}", "Analyzing".bold(), cli.path.display());
            print_result(&result);
        }
        return Ok(());
    }

    let report = engine.analyze_path(&cli.path, region)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_batch(&report);
    }
    Ok(())
}

fn colored_score(score: f64) -> ColoredString {
    let text = format!("{:.1}", score);
    if score >= 80.0 {
        text.green().bold()
    } else if score >= 50.0 {
        text.yellow().bold()
    } else {
        text.red().bold()
    }
}

fn print_result(result: &AnalysisResult) {
    println!("===================================");
    println!(
        " Green score: {} / 100  ({}, {} confidence)",
        colored_score(result.green_score),
        result.language,
        format!("{:?}", result.confidence).to_lowercase()
    );
    println!(" Energy:      {:.6} Wh per run", result.energy_consumption_wh);
    println!(" CO2:         {:.6} g per run ({})", result.co2_emissions_g, result.region);
    println!(" CPU time:    {:.3} ms", result.cpu_time_ms);
    println!(" Memory:      {:.2} MB", result.memory_usage_mb);
    println!(" Complexity:  {:.1} / 10", result.complexity_score);
    println!(" Algorithm:   {}", result.algorithm_complexity);
    println!("\n {}", result.real_world_impact.description.dimmed());

    if result.suggestions.is_empty() {
        println!("\n {}", "No optimization suggestions.".green());
        return;
    }

    println!("\n - Suggestions");
    println!("=============");
    for (i, s) in result.suggestions.iter().enumerate() {
        let severity = match s.severity {
            Severity::High => "HIGH".red().bold(),
            Severity::Medium => "MEDIUM".yellow().bold(),
            Severity::Low => "LOW".normal(),
        };
        let location = s.line.map(|line| format!(" (line {})", line)).unwrap_or_default();
        println!(" {}. [{}] {}{}", i + 1, severity, s.finding_text, location);
        println!(
            "    └─ {} (+{:.1} score)",
            s.pattern_id.cyan(),
            s.predicted_improvement.green_score_delta
        );
        println!("    {}", s.explanation);
        println!("    {}", "Before:".dimmed());
        for line in s.before_code.lines() {
            println!("      {}", line.red());
        }
        println!("    {}", "After:".dimmed());
        for line in s.after_code.lines() {
            println!("      {}", line.green());
        }
    }
}

fn print_batch(report: &BatchReport) {
    println!("\n{}", "Code Sustainability Results".bold());
    println!("===================================\n");

    println!("Summary:");
    println!(" * Files found: {}", report.summary.total_files);
    println!(" * Files analyzed: {}", report.summary.analyzed);
    if let Some(avg) = report.summary.average_green_score {
        println!(" * Average green score: {}", colored_score(avg));
    }
    println!(" * Total energy per run: {:.6} Wh", report.summary.total_energy_wh);
    println!(" * Total CO2 per run: {:.6} g", report.summary.total_co2_g);

    println!("\n - Files");
    println!("=======");
    for (i, file) in report.files.iter().enumerate() {
        match (&file.result, &file.error) {
            (Some(result), _) => {
                let top = result
                    .suggestions
                    .first()
                    .map(|s| format!(" top: {}", s.pattern_id))
                    .unwrap_or_default();
                println!(
                    " {}. {} {}{}",
                    i + 1,
                    file.file.display(),
                    colored_score(result.green_score),
                    top.cyan()
                );
            }
            (None, Some(error)) => {
                println!(" {}. {} {}", i + 1, file.file.display(), error.red());
            }
            (None, None) => {}
        }
    }
}
