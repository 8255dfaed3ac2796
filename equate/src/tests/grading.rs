use crate::equivalence::{Confidence, EquivalenceVerdict};
use crate::grading::{
    grade, GradingPolicy, GradingResult, Mastery, SessionTelemetry, NO_EXPECTED_ANSWER,
    NO_STUDENT_ANSWER,
};

fn verdict(is_equivalent: bool, confidence: Confidence) -> EquivalenceVerdict {
    EquivalenceVerdict::new(is_equivalent, confidence, "Exact match")
}

fn score(is_equivalent: bool, confidence: Confidence, attempts: u32, hints: u32) -> GradingResult {
    GradingPolicy::default().score(
        &verdict(is_equivalent, confidence),
        SessionTelemetry::new(attempts, hints),
    )
}

#[test]
fn test_exact_match_first_try() {
    let result = grade(Some("4"), Some("4"), 1, 0, |_, _| {
        verdict(true, Confidence::High)
    });
    assert_eq!(result.score, 1.0);
    assert_eq!(result.mastery, Mastery::High);
    assert_eq!(result.reason, "Exact match");
}

#[test]
fn test_hints_reduce_score() {
    let result = score(true, Confidence::High, 1, 2);
    assert_eq!(result.score, 0.8);
    assert_eq!(result.mastery, Mastery::High);
    assert_eq!(result.reason, "Exact match. Penalty: -0.2 for 2 hint(s).");
}

#[test]
fn test_attempt_penalty_applies_after_three_attempts() {
    assert_eq!(score(true, Confidence::High, 3, 0).score, 1.0);

    let result = score(true, Confidence::High, 4, 0);
    assert_eq!(result.score, 0.9);
    assert_eq!(result.reason, "Exact match. Penalty: -0.1 for 4 attempts.");
}

#[test]
fn test_both_penalties() {
    let result = score(true, Confidence::High, 5, 3);
    assert_eq!(result.score, 0.6);
    assert_eq!(result.mastery, Mastery::Medium);
    assert_eq!(
        result.reason,
        "Exact match. Penalty: -0.3 for 3 hint(s). Penalty: -0.1 for 5 attempts."
    );
}

#[test]
fn test_base_score_table() {
    let policy = GradingPolicy::default();
    let base = |e, c| policy.base(&verdict(e, c));

    assert_eq!(base(true, Confidence::High), (1.0, Mastery::High));
    assert_eq!(base(true, Confidence::Medium), (0.7, Mastery::Medium));
    assert_eq!(base(false, Confidence::Medium), (0.0, Mastery::Low));
    assert_eq!(base(true, Confidence::Low), (0.0, Mastery::Low));
    assert_eq!(base(false, Confidence::Low), (0.0, Mastery::Low));
    assert_eq!(base(false, Confidence::High), (0.0, Mastery::Low));
}

#[test]
fn test_mastery_follows_final_score() {
    // 0.7 reaches the high threshold even though the base tier was medium
    let result = score(true, Confidence::Medium, 1, 0);
    assert_eq!(result.score, 0.7);
    assert_eq!(result.mastery, Mastery::High);

    let result = score(true, Confidence::Medium, 1, 1);
    assert_eq!(result.score, 0.6);
    assert_eq!(result.mastery, Mastery::Medium);

    let result = score(false, Confidence::Medium, 1, 0);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.mastery, Mastery::Low);

    // A high-confidence answer drowned in hints is demoted
    let result = score(true, Confidence::High, 1, 7);
    assert_eq!(result.score, 0.3);
    assert_eq!(result.mastery, Mastery::Low);
}

#[test]
fn test_score_never_negative() {
    let result = score(true, Confidence::Medium, 10, 12);
    assert_eq!(result.score, 0.0);
    assert_eq!(result.mastery, Mastery::Low);

    let result = score(false, Confidence::Low, 9, 0);
    assert_eq!(result.score, 0.0);
}

#[test]
fn test_mastery_thresholds() {
    let policy = GradingPolicy::default();
    assert_eq!(policy.mastery_for(1.0), Mastery::High);
    assert_eq!(policy.mastery_for(0.7), Mastery::High);
    assert_eq!(policy.mastery_for(0.69), Mastery::Medium);
    assert_eq!(policy.mastery_for(0.4), Mastery::Medium);
    assert_eq!(policy.mastery_for(0.39), Mastery::Low);
    assert_eq!(policy.mastery_for(0.0), Mastery::Low);
}

#[test]
fn test_missing_expected_answer() {
    let result = grade(Some("x"), None, 1, 0, |_, _| panic!("verdict_fn must not run"));
    assert_eq!(result.score, 0.0);
    assert_eq!(result.mastery, Mastery::Low);
    assert_eq!(result.reason, NO_EXPECTED_ANSWER);

    let result = grade(None, None, 1, 0, |_, _| panic!("verdict_fn must not run"));
    assert_eq!(result.reason, NO_EXPECTED_ANSWER);
}

#[test]
fn test_missing_student_answer() {
    let result = grade(None, Some("x"), 1, 0, |_, _| panic!("verdict_fn must not run"));
    assert_eq!(result.score, 0.0);
    assert_eq!(result.reason, NO_STUDENT_ANSWER);

    let result = grade(Some("   "), Some("x"), 1, 0, |_, _| panic!("verdict_fn must not run"));
    assert_eq!(result.reason, NO_STUDENT_ANSWER);
}

#[test]
fn test_verdict_fn_receives_answers() {
    let result = grade(Some("2x"), Some("x + x"), 1, 0, |student, expected| {
        assert_eq!(student, "2x");
        assert_eq!(expected, "x + x");
        verdict(true, Confidence::High)
    });
    assert_eq!(result.score, 1.0);
}

#[test]
fn test_custom_policy() {
    let policy = GradingPolicy {
        hint_penalty: 0.25,
        attempt_allowance: 1,
        ..GradingPolicy::default()
    };
    let result = policy.score(&verdict(true, Confidence::High), SessionTelemetry::new(2, 1));
    assert_eq!(result.score, 0.65);
    assert_eq!(result.mastery, Mastery::Medium);
}

#[test]
fn test_result_serializes() {
    let result = score(true, Confidence::High, 1, 0);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["mastery"], "high");
    assert_eq!(json["score"], 1.0);
}
