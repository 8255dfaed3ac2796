use crate::ast::Expr;
use crate::config::ExpressionLimits;
use crate::error::ParseError;
use pest::Parser;
use pest_derive::Parser;

pub mod expressions;

#[derive(Parser)]
#[grammar = "src/parser/math.pest"]
pub struct MathParser;

/// Parse answer text into an expression tree, enforcing `limits`
pub fn parse(content: &str, limits: &ExpressionLimits) -> Result<Expr, ParseError> {
    if content.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let length = content.chars().count();
    if length > limits.max_expression_length {
        return Err(ParseError::TooLong {
            length,
            limit: limits.max_expression_length,
        });
    }

    // Checked before pest recurses into groups and exponent chains
    if nesting_depth(content) > limits.max_expression_depth {
        return Err(ParseError::TooDeep {
            limit: limits.max_expression_depth,
        });
    }

    match MathParser::parse(Rule::answer, content) {
        Ok(mut pairs) => {
            let answer = pairs.next().ok_or_else(|| syntax_error("empty parse result", content, 0))?;
            let expression = answer
                .into_inner()
                .find(|pair| pair.as_rule() == Rule::expression)
                .ok_or_else(|| syntax_error("missing expression", content, 0))?;

            let mut builder = expressions::ExpressionBuilder::new(limits.max_expression_depth);
            builder.build(expression)
        }
        Err(e) => {
            let position = match e.location {
                pest::error::InputLocation::Pos(pos) => pos,
                pest::error::InputLocation::Span((start, _)) => start,
            };
            let message = match &e.variant {
                pest::error::ErrorVariant::ParsingError { .. } => {
                    describe_unexpected(content, position)
                }
                pest::error::ErrorVariant::CustomError { message } => message.clone(),
            };
            Err(syntax_error(&message, content, position))
        }
    }
}

pub(crate) fn syntax_error(message: &str, content: &str, byte_pos: usize) -> ParseError {
    let byte_pos = byte_pos.min(content.len());
    let before = content.get(..byte_pos).unwrap_or(content);
    let line = before.matches('\n').count() + 1;
    let col = before
        .rsplit('\n')
        .next()
        .map(|tail| tail.chars().count())
        .unwrap_or(0)
        + 1;

    ParseError::Syntax {
        message: message.to_string(),
        line,
        col,
        offset: before.chars().count(),
    }
}

fn describe_unexpected(content: &str, byte_pos: usize) -> String {
    match content.get(byte_pos..).and_then(|rest| rest.chars().next()) {
        Some(c) => format!("unexpected '{}'", c),
        None => "unexpected end of input".to_string(),
    }
}

/// Upper bound on how deeply the grammar will recurse: bracket nesting plus
/// one level per (right-associative) power operator
fn nesting_depth(content: &str) -> usize {
    let mut depth: usize = 0;
    let mut max_depth = 0;
    for c in content.chars() {
        match c {
            '(' | '[' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    let powers = content.matches('^').count() + content.matches("**").count();
    max_depth + powers
}
