use greencode_rs::features::{extract, Confidence, FeatureVector, Signal};
use greencode_rs::language::Language;
use greencode_rs::ranker::{Ranker, DEFAULT_MAX_SUGGESTIONS};
use greencode_rs::rules::{detect, Finding, PredictedImprovement, Relief, Severity};
use greencode_rs::scoring::BaselineScorer;

const BUILD_PY: &str = r#"
def build(items):
    out = ""
    for a in items:
        for b in items:
            out += a + b
    return out
"#;

fn finding(id: &str, severity: Severity, relief: Relief) -> Finding {
    Finding {
        pattern_id: id.to_string(),
        finding_text: id.to_string(),
        before_code: String::new(),
        after_code: String::new(),
        explanation: String::new(),
        severity,
        predicted_improvement: PredictedImprovement::default(),
        line: None,
        relief,
    }
}

#[test]
fn test_duplicate_ids_collapse() {
    let fv = extract(BUILD_PY, Language::Python);
    let findings = detect(BUILD_PY, &fv);
    assert!(findings.iter().filter(|f| f.pattern_id == "quadratic-iteration").count() > 1);

    let ranked = Ranker::default().rank(findings, &fv, &BaselineScorer::default());
    let quadratic = ranked.iter().filter(|f| f.pattern_id == "quadratic-iteration").count();
    assert_eq!(quadratic, 1);
}

#[test]
fn test_build_snippet_order() {
    let fv = extract(BUILD_PY, Language::Python);
    let ranked = Ranker::default().rank(detect(BUILD_PY, &fv), &fv, &BaselineScorer::default());
    let ids: Vec<&str> = ranked.iter().map(|f| f.pattern_id.as_str()).collect();
    assert_eq!(ids, vec!["quadratic-iteration", "string-concat-in-loop"]);
}

#[test]
fn test_higher_severity_copy_wins() {
    // Python's string-concat is High, the generic one Medium.
    let fv = extract(BUILD_PY, Language::Python);
    let ranked = Ranker::default().rank(detect(BUILD_PY, &fv), &fv, &BaselineScorer::default());
    let concat = ranked
        .iter()
        .find(|f| f.pattern_id == "string-concat-in-loop")
        .expect("string concat ranked");
    assert_eq!(concat.severity, Severity::High);
}

#[test]
fn test_quadratic_improvement_prediction() {
    let fv = extract(BUILD_PY, Language::Python);
    let ranked = Ranker::default().rank(detect(BUILD_PY, &fv), &fv, &BaselineScorer::default());
    let quadratic = &ranked[0];
    assert!((quadratic.predicted_improvement.green_score_delta - 20.0).abs() < 1e-9);
    assert!(quadratic.predicted_improvement.energy_wh_delta < 0.0);
}

#[test]
fn test_ranking_is_idempotent() {
    let fv = extract(BUILD_PY, Language::Python);
    let ranker = Ranker::default();
    let scorer = BaselineScorer::default();
    let once = ranker.rank(detect(BUILD_PY, &fv), &fv, &scorer);
    let twice = ranker.rank(once.clone(), &fv, &scorer);
    assert_eq!(once, twice);
}

#[test]
fn test_cap_keeps_most_severe() {
    let fv = FeatureVector::empty(Language::Python, Confidence::Full)
        .with_signal(Signal::NestedLoopDepth, 2.0)
        .with_signal(Signal::WildcardImportCount, 1.0);
    let findings = vec![
        finding("wildcard-import", Severity::Low, Relief::zero(Signal::WildcardImportCount)),
        finding("quadratic-iteration", Severity::High, Relief::halve(Signal::NestedLoopDepth)),
    ];

    let ranked = Ranker::new(1).rank(findings, &fv, &BaselineScorer::default());
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].pattern_id, "quadratic-iteration");
}

#[test]
fn test_empty_input_and_default_cap() {
    let fv = FeatureVector::empty(Language::Java, Confidence::Heuristic);
    assert!(Ranker::default().rank(Vec::new(), &fv, &BaselineScorer::default()).is_empty());
    assert_eq!(Ranker::default().cap(), DEFAULT_MAX_SUGGESTIONS);
}

fn tied_pair() -> (FeatureVector, Vec<Finding>) {
    // Both reliefs remove a two-point penalty, so severity and delta tie.
    let fv = FeatureVector::empty(Language::Python, Confidence::Full)
        .with_signal(Signal::InvariantCallInLoopCount, 1.0)
        .with_signal(Signal::AppendInLoopCount, 1.0);
    let findings = vec![
        finding("invariant-call-in-loop", Severity::Medium, Relief::zero(Signal::InvariantCallInLoopCount)),
        finding("append-in-loop", Severity::Medium, Relief::zero(Signal::AppendInLoopCount)),
    ];
    (fv, findings)
}

#[test]
fn test_ties_keep_detection_order() {
    let (fv, findings) = tied_pair();
    let scorer = BaselineScorer::default();

    let ranked = Ranker::default().rank(findings.clone(), &fv, &scorer);
    let ids: Vec<&str> = ranked.iter().map(|f| f.pattern_id.as_str()).collect();
    assert_eq!(ids, vec!["invariant-call-in-loop", "append-in-loop"]);
    assert_eq!(
        ranked[0].predicted_improvement.green_score_delta,
        ranked[1].predicted_improvement.green_score_delta
    );

    let reversed: Vec<Finding> = findings.into_iter().rev().collect();
    let ranked = Ranker::default().rank(reversed, &fv, &scorer);
    let ids: Vec<&str> = ranked.iter().map(|f| f.pattern_id.as_str()).collect();
    assert_eq!(ids, vec!["append-in-loop", "invariant-call-in-loop"]);
}

#[test]
fn test_cap_on_ties_keeps_first_detected() {
    let (fv, findings) = tied_pair();
    let ranked = Ranker::new(1).rank(findings, &fv, &BaselineScorer::default());
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].pattern_id, "invariant-call-in-loop");
}

#[test]
fn test_replacement_keeps_first_position() {
    // The High copy of `append-in-loop` replaces the Low one in place, so it
    // still precedes the equally severe `invariant-call-in-loop`.
    let (fv, _) = tied_pair();
    let findings = vec![
        finding("append-in-loop", Severity::Low, Relief::zero(Signal::AppendInLoopCount)),
        finding("invariant-call-in-loop", Severity::High, Relief::zero(Signal::InvariantCallInLoopCount)),
        finding("append-in-loop", Severity::High, Relief::zero(Signal::AppendInLoopCount)),
    ];

    let ranked = Ranker::default().rank(findings, &fv, &BaselineScorer::default());
    let ids: Vec<&str> = ranked.iter().map(|f| f.pattern_id.as_str()).collect();
    assert_eq!(ids, vec!["append-in-loop", "invariant-call-in-loop"]);
    assert!(ranked.iter().all(|f| f.severity == Severity::High));
}
