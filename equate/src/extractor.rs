//! Pulling a candidate answer out of free-form text
//!
//! Students rarely submit a bare expression. `PatternExtractor` recognises the
//! usual ways an answer is announced in chat or whiteboard text:
//!
//! ```text
//! \boxed{x + 1}                -> x + 1
//! The answer is 42.            -> 42
//! so y = 3x - 2                -> 3x - 2
//! 2(x + 1)                     -> 2(x + 1)
//! ```

use regex::Regex;
use std::sync::OnceLock;

pub trait AnswerExtractor: Send + Sync {
    fn extract(&self, text: &str) -> Option<String>;
}

// Tried in order; within a pattern the last match wins, since students
// tend to state the final answer at the end.
pub(crate) const ANSWER_PATTERNS: [&str; 3] = [
    r"\\boxed\{([^{}]+)\}",
    r"(?im)\banswer\s*(?:is|:|=)\s*(.+?)\s*[.!]?\s*$",
    r"(?m)=\s*([^=\n]+?)\s*[.!]?\s*$",
];

pub(crate) const EXPRESSION_LIKE: &str = r"^[\w\s.+\-*/^()\[\]×÷·π−]+$";

struct CompiledPatterns {
    answers: Vec<Regex>,
    expression_like: Regex,
}

static PATTERNS: OnceLock<CompiledPatterns> = OnceLock::new();

fn patterns() -> &'static CompiledPatterns {
    PATTERNS.get_or_init(|| CompiledPatterns {
        answers: ANSWER_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern).expect("answer pattern is a valid regex"))
            .collect(),
        expression_like: Regex::new(EXPRESSION_LIKE)
            .expect("expression pattern is a valid regex"),
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl AnswerExtractor for PatternExtractor {
    fn extract(&self, text: &str) -> Option<String> {
        let patterns = patterns();
        for pattern in &patterns.answers {
            let found = pattern
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
                .filter(|candidate| !candidate.is_empty())
                .last();
            if let Some(candidate) = found {
                return Some(candidate.to_string());
            }
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() && patterns.expression_like.is_match(trimmed) {
            Some(trimmed.to_string())
        } else {
            None
        }
    }
}
