// Contract tests shared by every scorer
// The same suite runs against the baseline and the trained model

use greencode_rs::features::{extract, Confidence, FeatureVector, Signal};
use greencode_rs::language::Language;
use greencode_rs::region::{Region, RegionalFactors};
use greencode_rs::scoring::{BaselineScorer, Scorer, TrainedScorer};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn vector(language: Language, pairs: &[(Signal, f64)]) -> FeatureVector {
    let raw: BTreeMap<Signal, f64> = pairs.iter().copied().collect();
    FeatureVector::new(language, Confidence::Full, raw, BTreeMap::new())
}

fn baseline() -> BaselineScorer {
    BaselineScorer::new(RegionalFactors::default().into_shared())
}

fn trained() -> TrainedScorer {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models/default_coefficients.json");
    TrainedScorer::from_path(&path, RegionalFactors::default().into_shared()).expect("bundled model loads")
}

fn pathological() -> FeatureVector {
    vector(
        Language::Python,
        &[
            (Signal::StatementCount, 400.0),
            (Signal::LoopCount, 30.0),
            (Signal::NestedLoopDepth, 6.0),
            (Signal::AllocInLoopCount, 50.0),
            (Signal::StringConcatInLoopCount, 50.0),
            (Signal::AwaitInLoopCount, 50.0),
            (Signal::IoInLoopCount, 50.0),
            (Signal::RecursionCount, 10.0),
            (Signal::IndexIterationCount, 10.0),
            (Signal::AppendInLoopCount, 50.0),
            (Signal::ManualAccumulationCount, 50.0),
            (Signal::InvariantCallInLoopCount, 50.0),
            (Signal::WildcardImportCount, 10.0),
            (Signal::CyclomaticComplexity, 200.0),
        ],
    )
}

fn arbitrary_vector() -> impl Strategy<Value = FeatureVector> {
    (
        0.0..700.0f64,
        0.0..200.0f64,
        0.0..40.0f64,
        0.0..40.0f64,
        0.0..40.0f64,
        0.0..40.0f64,
        0.0..100.0f64,
    )
        .prop_map(|(depth, statements, loops, alloc, concat, io, complexity)| {
            vector(
                Language::Python,
                &[
                    (Signal::NestedLoopDepth, depth.floor()),
                    (Signal::StatementCount, statements.floor()),
                    (Signal::LoopCount, loops.floor()),
                    (Signal::AllocInLoopCount, alloc.floor()),
                    (Signal::StringConcatInLoopCount, concat.floor()),
                    (Signal::IoInLoopCount, io.floor()),
                    (Signal::CyclomaticComplexity, complexity.floor()),
                ],
            )
        })
}

macro_rules! scorer_contract {
    ($suite:ident, $make:expr) => {
        mod $suite {
            use super::*;

            #[test]
            fn clean_code_is_near_perfect() {
                let scorer = $make;
                let fv = extract("print(\"hello\")\n", Language::Python);
                let card = scorer.score(&fv, Region::World);
                assert!(card.green_score >= 95.0, "got {}", card.green_score);
            }

            #[test]
            fn pathological_code_is_near_zero() {
                let scorer = $make;
                let card = scorer.score(&pathological(), Region::World);
                assert!(card.green_score <= 5.0, "got {}", card.green_score);
                assert!(card.green_score >= 0.0);
            }

            #[test]
            fn quadratic_loop_scores_below_single_loop() {
                let scorer = $make;
                let single = vector(
                    Language::Python,
                    &[(Signal::StatementCount, 3.0), (Signal::LoopCount, 1.0), (Signal::NestedLoopDepth, 1.0)],
                );
                let nested = single.with_signal(Signal::NestedLoopDepth, 2.0);
                let a = scorer.score(&single, Region::World);
                let b = scorer.score(&nested, Region::World);
                assert!(b.green_score < a.green_score);
                assert!(b.energy_wh > a.energy_wh);
            }

            #[test]
            fn region_only_changes_co2() {
                let scorer = $make;
                let fv = vector(Language::Java, &[(Signal::StatementCount, 20.0), (Signal::LoopCount, 2.0)]);
                let eu = scorer.score(&fv, Region::Europe);
                let usa = scorer.score(&fv, Region::Usa);
                let asia = scorer.score(&fv, Region::Asia);
                assert_eq!(eu.green_score, asia.green_score);
                assert_eq!(eu.energy_wh, asia.energy_wh);
                assert!(eu.co2_g < usa.co2_g);
                assert!(usa.co2_g < asia.co2_g);
            }

            #[test]
            fn compiled_languages_use_less_energy() {
                let scorer = $make;
                let pairs = [(Signal::StatementCount, 10.0), (Signal::LoopCount, 1.0), (Signal::NestedLoopDepth, 1.0)];
                let energy = |language| scorer.score(&vector(language, &pairs), Region::World).energy_wh;
                assert!(energy(Language::Cpp) < energy(Language::Java));
                assert!(energy(Language::Java) < energy(Language::JavaScript));
                assert!(energy(Language::JavaScript) < energy(Language::Python));
            }

            #[test]
            fn complexity_score_is_capped() {
                let scorer = $make;
                let card = scorer.score(&pathological(), Region::World);
                assert_eq!(card.complexity_score, 10.0);
            }

            proptest! {
                #[test]
                fn scores_stay_in_bounds(fv in arbitrary_vector()) {
                    let card = $make.score(&fv, Region::World);
                    prop_assert!((0.0..=100.0).contains(&card.green_score));
                    prop_assert!(card.energy_wh >= 0.0 && card.energy_wh.is_finite());
                    prop_assert!(card.co2_g >= 0.0 && card.co2_g.is_finite());
                    prop_assert!(card.cpu_time_ms >= 0.0 && card.cpu_time_ms.is_finite());
                    prop_assert!(card.memory_mb > 0.0 && card.memory_mb.is_finite());
                    prop_assert!((0.0..=10.0).contains(&card.complexity_score));
                }

                #[test]
                fn deeper_nesting_never_raises_the_score(fv in arbitrary_vector()) {
                    let scorer = $make;
                    let depth = fv.get(Signal::NestedLoopDepth);
                    let deeper = fv.with_signal(Signal::NestedLoopDepth, depth + 1.0);
                    let before = scorer.score(&fv, Region::World).green_score;
                    let after = scorer.score(&deeper, Region::World).green_score;
                    prop_assert!(after <= before, "{} -> {}", before, after);
                }

                #[test]
                fn scoring_is_deterministic(fv in arbitrary_vector()) {
                    let scorer = $make;
                    prop_assert_eq!(scorer.score(&fv, Region::Asia), scorer.score(&fv, Region::Asia));
                }
            }
        }
    };
}

scorer_contract!(baseline_contract, baseline());
scorer_contract!(trained_contract, trained());

#[test]
fn test_scorer_names() {
    assert_eq!(baseline().name(), "baseline");
    assert_eq!(trained().name(), "trained");
    assert_eq!(trained().version(), "2024.1");
}

#[test]
fn test_baseline_quadratic_penalty() {
    let fv = vector(Language::Python, &[(Signal::NestedLoopDepth, 2.0)]);
    assert_eq!(baseline().score(&fv, Region::World).green_score, 80.0);
}
