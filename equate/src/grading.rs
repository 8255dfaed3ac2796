//! Turning a verdict and session telemetry into a score and mastery tier
//!
//! Scoring is a pure function of the verdict, the attempt count and the
//! number of hints:
//!
//! ```text
//! base  = table(is_equivalent, confidence)
//! score = max(0, base - hint_penalty * hints)
//! score = max(0, score - attempt_penalty)   if attempts > allowance
//! score = round(score, 2)
//! mastery from the final score: >= 0.7 high, >= 0.4 medium, else low
//! ```

pub use crate::config::GradingPolicy;
use crate::equivalence::{Confidence, EquivalenceVerdict};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub const NO_EXPECTED_ANSWER: &str = "No expected answer provided for grading";
pub const NO_STUDENT_ANSWER: &str = "No student answer provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mastery {
    Low,
    Medium,
    High,
}

impl fmt::Display for Mastery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mastery::Low => write!(f, "low"),
            Mastery::Medium => write!(f, "medium"),
            Mastery::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Always within [0, 1], rounded to two decimals
    pub score: f64,
    pub mastery: Mastery,
    pub reason: String,
}

impl GradingResult {
    fn rejected(reason: &str) -> Self {
        Self {
            score: 0.0,
            mastery: Mastery::Low,
            reason: reason.to_string(),
        }
    }
}

/// Effort signals recorded by the caller for one submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTelemetry {
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub hints_used: u32,
}

impl SessionTelemetry {
    pub fn new(attempts: u32, hints_used: u32) -> Self {
        Self {
            attempts,
            hints_used,
        }
    }
}

/// Grade a submission with the default policy.
///
/// `verdict_fn` is only called when both answers are present.
pub fn grade<F>(
    student: Option<&str>,
    expected: Option<&str>,
    attempts: u32,
    hints_used: u32,
    verdict_fn: F,
) -> GradingResult
where
    F: FnOnce(&str, &str) -> EquivalenceVerdict,
{
    GradingPolicy::default().grade(
        student,
        expected,
        SessionTelemetry::new(attempts, hints_used),
        verdict_fn,
    )
}

impl GradingPolicy {
    pub fn grade<F>(
        &self,
        student: Option<&str>,
        expected: Option<&str>,
        telemetry: SessionTelemetry,
        verdict_fn: F,
    ) -> GradingResult
    where
        F: FnOnce(&str, &str) -> EquivalenceVerdict,
    {
        match self.admit(student, expected) {
            Ok((student, expected)) => self.score(&verdict_fn(student, expected), telemetry),
            Err(rejected) => rejected,
        }
    }

    /// Both answers, or the zero-score result explaining which one is missing
    pub fn admit<'a>(
        &self,
        student: Option<&'a str>,
        expected: Option<&'a str>,
    ) -> Result<(&'a str, &'a str), GradingResult> {
        let expected = match expected {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(GradingResult::rejected(NO_EXPECTED_ANSWER)),
        };
        let student = match student {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Err(GradingResult::rejected(NO_STUDENT_ANSWER)),
        };
        Ok((student, expected))
    }

    /// Base score and mastery read off the verdict alone
    pub fn base(&self, verdict: &EquivalenceVerdict) -> (f64, Mastery) {
        match (verdict.is_equivalent, verdict.confidence) {
            (true, Confidence::High) => (self.high_confidence_score, Mastery::High),
            (true, Confidence::Medium) => (self.medium_confidence_score, Mastery::Medium),
            // A validator's rejection arrives as (false, Medium) and earns nothing
            (true, Confidence::Low) | (false, _) => (0.0, Mastery::Low),
        }
    }

    pub fn mastery_for(&self, score: f64) -> Mastery {
        if score >= self.high_mastery_threshold {
            Mastery::High
        } else if score >= self.medium_mastery_threshold {
            Mastery::Medium
        } else {
            Mastery::Low
        }
    }

    /// Apply penalties to the verdict's base score
    pub fn score(&self, verdict: &EquivalenceVerdict, telemetry: SessionTelemetry) -> GradingResult {
        let (base_score, base_mastery) = self.base(verdict);

        let hint_penalty = self.hint_penalty * f64::from(telemetry.hints_used);
        let mut score = (base_score - hint_penalty).max(0.0);

        let over_attempts = telemetry.attempts > self.attempt_allowance;
        if over_attempts {
            score = (score - self.attempt_penalty).max(0.0);
        }

        let score = round_to_cents(score).clamp(0.0, 1.0);
        let mastery = self.mastery_for(score);
        debug!(
            "graded {:?}/{}: base {} ({}), final {} ({})",
            verdict.is_equivalent, verdict.confidence, base_score, base_mastery, score, mastery
        );

        let mut annotations = Vec::new();
        if telemetry.hints_used > 0 && hint_penalty > 0.0 {
            annotations.push(format!(
                "Penalty: -{} for {} hint(s)",
                format_amount(hint_penalty),
                telemetry.hints_used
            ));
        }
        if over_attempts && self.attempt_penalty > 0.0 {
            annotations.push(format!(
                "Penalty: -{} for {} attempts",
                format_amount(self.attempt_penalty),
                telemetry.attempts
            ));
        }

        let reason = if annotations.is_empty() {
            verdict.reason.clone()
        } else {
            format!(
                "{}. {}.",
                verdict.reason.trim_end_matches('.'),
                annotations.join(". ")
            )
        };

        GradingResult {
            score,
            mastery,
            reason,
        }
    }
}

/// Two decimals, halves rounded up (scores are never negative here)
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn format_amount(value: f64) -> String {
    format!("{}", round_to_cents(value))
}
