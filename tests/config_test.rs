use greencode_rs::config::{EngineConfig, ScorerConfig};
use greencode_rs::{Engine, EngineError, Language, Region};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "max_suggestions = 2\nimpact_runs = 1000\ndisabled_rules = [\"wildcard-import\"]\n\n[regional_factors]\neurope = 100.0\n"
    )
    .unwrap();

    let config = EngineConfig::load(file.path()).unwrap();
    assert_eq!(config.max_suggestions, 2);
    assert_eq!(config.impact_runs, 1000);
    assert_eq!(config.disabled_rules, vec!["wildcard-import".to_string()]);
    assert_eq!(config.scorer, ScorerConfig::Baseline);
    assert_eq!(config.regional_factors.get("europe"), Some(&100.0));
}

#[test]
fn test_region_override_applies() {
    let config = EngineConfig::from_toml_str("[regional_factors]\neurope = 100.0\n").unwrap();
    let engine = Engine::from_config(&config).unwrap();
    assert_eq!(engine.regional_factors().factor(Region::Europe), 100.0);
    assert_eq!(engine.regional_factors().factor(Region::Asia), 570.0);

    let result = engine
        .analyze("for x in xs:\n    print(x)\n", Language::Python, Region::Europe)
        .unwrap();
    let expected = result.energy_consumption_wh * 100.0 / 1000.0;
    assert!((result.co2_emissions_g - expected).abs() < 1e-12);
}

#[test]
fn test_runs_change_description_only() {
    let config = EngineConfig::from_toml_str("impact_runs = 1000\n").unwrap();
    let result = Engine::from_config(&config)
        .unwrap()
        .analyze("print(1)\n", Language::Python, Region::World)
        .unwrap();
    assert!(result.real_world_impact.description.contains("1K"));
}

#[test]
fn test_invalid_configs() {
    assert!(matches!(EngineConfig::from_toml_str("max_code_bytes = \"big\"\n"), Err(EngineError::Toml(_))));
    assert!(matches!(
        EngineConfig::from_toml_str("[regional_factors]\nasia = -1.0\n").and_then(|c| Engine::from_config(&c)),
        Err(EngineError::Config(_))
    ));
    assert!(matches!(
        EngineConfig::load(std::path::Path::new("/nonexistent/greencode.toml")),
        Err(EngineError::Io(_))
    ));
}
