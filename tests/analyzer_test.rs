// End-to-end tests for the analysis engine
// Single-unit analysis, error cases and directory scans

use greencode_rs::config::EngineConfig;
use greencode_rs::features::{Confidence, Signal};
use greencode_rs::rules::Severity;
use greencode_rs::{Engine, EngineError, Language, Region, SourceUnit};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

const QUADRATIC: &str = r#"
total = 0
for i in range(10000):
    for j in range(10000):
        total += i * j
print(total)
"#;

#[test]
fn test_quadratic_scenario() {
    let result = Engine::new().analyze(QUADRATIC, Language::Python, Region::World).unwrap();

    assert_eq!(result.analysis_details.get(Signal::NestedLoopDepth), 2.0);
    assert!(result
        .suggestions
        .iter()
        .any(|s| s.pattern_id == "quadratic-iteration" && s.severity == Severity::High));
    assert!(result.green_score < 90.0, "got {}", result.green_score);
    assert_eq!(result.confidence, Confidence::Full);
}

#[test]
fn test_clean_print_scenario() {
    let result = Engine::new()
        .analyze("print(\"hello\")\n", Language::Python, Region::World)
        .unwrap();

    assert!(result.green_score >= 99.0);
    assert!(result.suggestions.is_empty());
    assert_eq!(result.confidence, Confidence::Full);
    assert!(result.energy_consumption_wh > 0.0);
}

#[test]
fn test_unknown_language_scenario() {
    let code = "PROCEDURE DIVISION.\n    PERFORM VARYING I FROM 1 BY 1 UNTIL I > 10\n        DISPLAY I\n    END-PERFORM.\n";
    let result = Engine::new().analyze_named(code, "cobol", None).unwrap();

    assert_eq!(result.language, Language::Unknown);
    assert_eq!(result.region, Region::World);
    assert_eq!(result.confidence, Confidence::Heuristic);
    assert!(result.energy_consumption_wh > 0.0);
    assert!(result.co2_emissions_g > 0.0);
    assert!((0.0..=100.0).contains(&result.green_score));
}

#[test]
fn test_oversized_input_rejected() {
    let config = EngineConfig::from_toml_str("max_code_bytes = 16\n").unwrap();
    let engine = Engine::from_config(&config).unwrap();
    let err = engine
        .analyze("print('far too long for the limit')", Language::Python, Region::World)
        .unwrap_err();
    assert!(matches!(err, EngineError::InputTooLarge { limit: 16, .. }));

    // The default cap is 1 MiB.
    let big = "x".repeat(1_048_577);
    assert!(matches!(
        Engine::new().analyze(&big, Language::Python, Region::World),
        Err(EngineError::InputTooLarge { size: 1_048_577, limit: 1_048_576 })
    ));
}

#[test]
fn test_empty_input_rejected() {
    let engine = Engine::new();
    assert!(matches!(engine.analyze("", Language::Python, Region::World), Err(EngineError::EmptyInput)));
    assert!(matches!(
        engine.analyze("  \n\t\n", Language::Java, Region::Europe),
        Err(EngineError::EmptyInput)
    ));
}

#[test]
fn test_analysis_is_deterministic() {
    let engine = Engine::new();
    let a = engine.analyze(QUADRATIC, Language::Python, Region::Asia).unwrap();
    let b = engine.analyze(QUADRATIC, Language::Python, Region::Asia).unwrap();
    assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
}

#[test]
fn test_unknown_region_uses_world() {
    let engine = Engine::new();
    let mars = engine.analyze_named(QUADRATIC, "python", Some("mars")).unwrap();
    let world = engine.analyze(QUADRATIC, Language::Python, Region::World).unwrap();
    assert_eq!(mars.region, Region::World);
    assert_eq!(mars.co2_emissions_g, world.co2_emissions_g);
}

#[test]
fn test_source_unit() {
    let unit = SourceUnit::new("console.log(1);\n", Language::JavaScript, Region::Europe);
    let result = Engine::new().analyze_unit(&unit).unwrap();
    assert_eq!(result.language, Language::JavaScript);
    assert_eq!(result.region, Region::Europe);
}

#[test]
fn test_json_shape() {
    let result = Engine::new().analyze(QUADRATIC, Language::Python, Region::Usa).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["analysis_details"]["signals"]["nested_loop_depth"], 2.0);
    assert_eq!(json["confidence"], "full");
    assert_eq!(json["language"], "python");
    assert_eq!(json["region"], "usa");
    assert_eq!(json["suggestions"][0]["severity"], "high");
    assert!(json["suggestions"][0].get("relief").is_none());
    assert!(json["real_world_impact"]["description"].as_str().unwrap().contains("1M"));
}

#[test]
fn test_disabled_rules_from_config() {
    let config = EngineConfig::from_toml_str("disabled_rules = [\"quadratic-iteration\"]\n").unwrap();
    let engine = Engine::from_config(&config).unwrap();
    let result = engine.analyze(QUADRATIC, Language::Python, Region::World).unwrap();
    assert!(result.suggestions.iter().all(|s| s.pattern_id != "quadratic-iteration"));
    // Disabling a rule does not change the score.
    let plain = Engine::new().analyze(QUADRATIC, Language::Python, Region::World).unwrap();
    assert_eq!(result.green_score, plain.green_score);
}

#[test]
fn test_suggestion_cap_from_config() {
    let config = EngineConfig::from_toml_str("max_suggestions = 1\n").unwrap();
    let engine = Engine::from_config(&config).unwrap();
    let result = engine.analyze(QUADRATIC, Language::Python, Region::World).unwrap();
    assert_eq!(result.suggestions.len(), 1);
    assert_eq!(result.suggestions[0].pattern_id, "quadratic-iteration");
}

#[test]
fn test_trained_scorer_from_config() {
    let model = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models/default_coefficients.json");
    let toml = format!("[scorer]\nkind = \"trained\"\nmodel_path = \"{}\"\n", model.display());
    let config = EngineConfig::from_toml_str(&toml).unwrap();
    let engine = Engine::from_config(&config).unwrap();
    assert_eq!(engine.scorer().name(), "trained");

    let result = engine.analyze(QUADRATIC, Language::Python, Region::World).unwrap();
    assert!(result.green_score < 90.0);
}

#[test]
fn test_missing_model_file_fails() {
    let config = EngineConfig::from_toml_str("[scorer]\nkind = \"trained\"\nmodel_path = \"/nonexistent/model.json\"\n").unwrap();
    assert!(matches!(Engine::from_config(&config), Err(EngineError::Io(_))));
}

#[test]
fn test_engine_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Engine>();

    let engine = Engine::new();
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let result = engine.analyze(QUADRATIC, Language::Python, Region::World).unwrap();
                assert_eq!(result.analysis_details.get(Signal::NestedLoopDepth), 2.0);
            });
        }
    });
}

#[test]
fn test_directory_scan() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.py"), QUADRATIC).unwrap();
    fs::write(dir.path().join("b.js"), "for (const x of xs) {\n  console.log(x);\n}\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "not code").unwrap();
    fs::write(dir.path().join("empty.py"), "").unwrap();

    let report = Engine::new().analyze_path(dir.path(), Region::Europe).unwrap();

    assert_eq!(report.summary.total_files, 3);
    assert_eq!(report.summary.analyzed, 2);
    assert!(report.summary.average_green_score.is_some());
    assert!(report.summary.total_energy_wh > 0.0);

    let names: Vec<String> = report
        .files
        .iter()
        .map(|f| f.file.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.py", "b.js", "empty.py"]);

    let empty = &report.files[2];
    assert!(empty.result.is_none());
    assert!(empty.error.as_deref().unwrap().contains("empty"));
}

#[test]
fn test_scan_missing_path() {
    assert!(Engine::new()
        .analyze_path(&PathBuf::from("/nonexistent/greencode"), Region::World)
        .is_err());
}

const FOUR_DEEP: &str = r#"
total = 0
for a in xs:
    for b in xs:
        for c in xs:
            for d in xs:
                total += a * b * c * d
"#;

#[test]
fn test_low_score_adds_general_finding() {
    let result = Engine::new().analyze(FOUR_DEEP, Language::Python, Region::World).unwrap();

    assert!(result.green_score < 40.0, "got {}", result.green_score);
    let general = result
        .suggestions
        .iter()
        .find(|s| s.pattern_id == "low-green-score")
        .expect("low score finding");
    assert_eq!(general.severity, Severity::High);

    // Scores at or above the threshold never get it.
    let quadratic = Engine::new().analyze(QUADRATIC, Language::Python, Region::World).unwrap();
    assert!(quadratic.suggestions.iter().all(|s| s.pattern_id != "low-green-score"));
}

#[test]
fn test_algorithm_complexity_label() {
    let engine = Engine::new();
    let label = |code: &str| engine.analyze(code, Language::Python, Region::World).unwrap().algorithm_complexity;

    assert_eq!(label(FOUR_DEEP), "O(n^4)");
    assert_eq!(label(QUADRATIC), "O(n^2)");
    assert_eq!(label("for x in xs:\n    print(x)\n"), "O(n)");
    assert_eq!(label("print(\"hello\")\n"), "O(1)");

    let json = serde_json::to_value(engine.analyze(QUADRATIC, Language::Python, Region::World).unwrap()).unwrap();
    assert_eq!(json["algorithm_complexity"], "O(n^2)");
}

#[test]
fn test_extreme_nesting_keeps_metrics_finite() {
    let code = format!("{}x++;{}", "for(;;){".repeat(600), "}".repeat(600));
    let result = Engine::new().analyze(&code, Language::Java, Region::World).unwrap();

    assert_eq!(result.analysis_details.get(Signal::NestedLoopDepth), 600.0);
    for metric in [
        result.energy_consumption_wh,
        result.co2_emissions_g,
        result.cpu_time_ms,
        result.memory_usage_mb,
    ] {
        assert!(metric.is_finite() && metric >= 0.0, "got {}", metric);
    }
    assert_eq!(result.green_score, 0.0);

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["energy_consumption_wh"].is_f64());
    assert!(json["co2_emissions_g"].is_f64());
    assert!(json["real_world_impact"]["light_bulb_hours"].is_f64());
}

#[test]
fn test_deeply_nested_python_falls_back() {
    let engine = Engine::new();

    let list = format!("x = {}1{}\n", "[".repeat(20_000), "]".repeat(20_000));
    let result = engine.analyze(&list, Language::Python, Region::World).unwrap();
    assert_eq!(result.confidence, Confidence::Heuristic);

    let chain = format!("x = 1{}\n", " + 1".repeat(20_000));
    let result = engine.analyze(&chain, Language::Python, Region::World).unwrap();
    assert_eq!(result.confidence, Confidence::Heuristic);
}
