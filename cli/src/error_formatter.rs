use ariadne::{Color, Label, Report, ReportKind, Source};
use equate::ParseError;
use std::fmt;

/// A parse error together with the text that failed to parse
#[derive(Debug)]
pub struct ExpressionError {
    pub source_text: String,
    pub error: ParseError,
}

impl ExpressionError {
    pub fn new(source_text: &str, error: ParseError) -> Self {
        Self {
            source_text: source_text.to_string(),
            error,
        }
    }
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ExpressionError {}

/// Format a parse error with fancy terminal output using Ariadne
pub fn format_error(error: &ExpressionError) -> String {
    match &error.error {
        ParseError::Syntax {
            message, offset, ..
        } => {
            let mut output = Vec::new();
            let source_id = "expression".to_string();

            // Errors at end of input point at the last character
            let length = error.source_text.chars().count();
            let start = (*offset).min(length.saturating_sub(1));
            let end = (start + 1).min(length);

            let report = Report::build(ReportKind::Error, &source_id, start)
                .with_message(format!("Parse error: {}", message))
                .with_label(
                    Label::new((&source_id, start..end))
                        .with_message(message)
                        .with_color(Color::Red),
                )
                .with_help("operators need operands on both sides; functions need parentheses, e.g. sin(x)");

            match report.finish().write(
                (&source_id, Source::from(error.source_text.as_str())),
                &mut output,
            ) {
                Ok(_) => String::from_utf8_lossy(&output).to_string(),
                Err(_) => {
                    // Fallback to simple format
                    format!("{}", error)
                }
            }
        }
        ParseError::TooLong { .. } | ParseError::TooDeep { .. } => {
            format!("{}\n  Raise the limit with a configuration file (--config)", error)
        }
        ParseError::Empty => format!("{}", error),
    }
}
