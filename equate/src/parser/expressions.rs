use crate::ast::{ArithmeticOperation, Constant, Expr, MathematicalFunction};
use crate::error::ParseError;
use crate::parser::{syntax_error, Rule};
use pest::iterators::Pair;

/// Turns pest pairs into an [`Expr`], tracking nesting depth
pub struct ExpressionBuilder {
    depth: usize,
    max_depth: usize,
}

impl ExpressionBuilder {
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// Only sub-expressions (the whole answer, groups, function arguments)
    /// count towards the nesting depth.
    pub fn build(&mut self, pair: Pair<Rule>) -> Result<Expr, ParseError> {
        if pair.as_rule() != Rule::expression {
            return self.build_impl(pair);
        }

        if self.depth >= self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = self.parse_expression(pair);
        self.depth -= 1;
        result
    }

    fn build_impl(&mut self, pair: Pair<Rule>) -> Result<Expr, ParseError> {
        match pair.as_rule() {
            Rule::expression => self.build(pair),
            Rule::term => self.parse_term(pair),
            Rule::factor => self.parse_factor(pair),
            Rule::power | Rule::implicit_factor => self.parse_power(pair),
            Rule::group => {
                let inner = first_child(&pair, "empty parentheses")?;
                self.build(inner)
            }
            Rule::function_call => self.parse_function_call(pair),
            Rule::identifier => Ok(parse_identifier(pair.as_str())),
            Rule::number => parse_number(&pair),
            other => Err(unexpected(&pair, other)),
        }
    }

    fn parse_expression(&mut self, pair: Pair<Rule>) -> Result<Expr, ParseError> {
        let mut pairs = pair.clone().into_inner();
        let mut left = self.build(
            pairs
                .next()
                .ok_or_else(|| error_at(&pair, "missing term in sum"))?,
        )?;

        while let Some(op_pair) = pairs.next() {
            let operation = match op_pair.as_rule() {
                Rule::add_plus => ArithmeticOperation::Add,
                Rule::add_minus => ArithmeticOperation::Subtract,
                other => return Err(unexpected(&op_pair, other)),
            };
            let right = self.build(
                pairs
                    .next()
                    .ok_or_else(|| error_at(&op_pair, "missing term after operator"))?,
            )?;
            left = Expr::binary(left, operation, right);
        }

        Ok(left)
    }

    fn parse_term(&mut self, pair: Pair<Rule>) -> Result<Expr, ParseError> {
        let mut pairs = pair.clone().into_inner();
        let mut left = self.build(
            pairs
                .next()
                .ok_or_else(|| error_at(&pair, "missing factor in product"))?,
        )?;

        while let Some(next) = pairs.next() {
            let (operation, right_pair) = match next.as_rule() {
                Rule::mul_star => (ArithmeticOperation::Multiply, pairs.next()),
                Rule::mul_slash => (ArithmeticOperation::Divide, pairs.next()),
                // juxtaposition: the pair itself is the right operand
                Rule::implicit_factor => (ArithmeticOperation::Multiply, Some(next.clone())),
                other => return Err(unexpected(&next, other)),
            };
            let right_pair =
                right_pair.ok_or_else(|| error_at(&next, "missing factor after operator"))?;
            let right = self.build(right_pair)?;
            left = Expr::binary(left, operation, right);
        }

        Ok(left)
    }

    fn parse_factor(&mut self, pair: Pair<Rule>) -> Result<Expr, ParseError> {
        let mut negations = 0usize;
        let mut operand = None;

        for inner in pair.clone().into_inner() {
            match inner.as_rule() {
                Rule::unary_minus => negations += 1,
                Rule::unary_plus => {}
                _ => operand = Some(inner),
            }
        }

        let operand = operand.ok_or_else(|| error_at(&pair, "missing operand after sign"))?;
        let expr = self.build(operand)?;

        // An even number of minus signs cancels out
        if negations % 2 == 1 {
            Ok(Expr::Negate(Box::new(expr)))
        } else {
            Ok(expr)
        }
    }

    fn parse_power(&mut self, pair: Pair<Rule>) -> Result<Expr, ParseError> {
        let mut pairs = pair.clone().into_inner();
        let base = self.build(
            pairs
                .next()
                .ok_or_else(|| error_at(&pair, "missing base"))?,
        )?;

        match pairs.next() {
            Some(op_pair) if op_pair.as_rule() == Rule::pow_caret => {
                let exponent = self.build(
                    pairs
                        .next()
                        .ok_or_else(|| error_at(&op_pair, "missing exponent"))?,
                )?;
                Ok(Expr::binary(base, ArithmeticOperation::Power, exponent))
            }
            Some(other) => Err(unexpected(&other, other.as_rule())),
            None => Ok(base),
        }
    }

    fn parse_function_call(&mut self, pair: Pair<Rule>) -> Result<Expr, ParseError> {
        let mut pairs = pair.clone().into_inner();
        let name_pair = pairs
            .next()
            .ok_or_else(|| error_at(&pair, "missing function name"))?;
        let function = MathematicalFunction::from_name(name_pair.as_str())
            .ok_or_else(|| error_at(&name_pair, "unknown function"))?;
        let argument = self.build(
            pairs
                .next()
                .ok_or_else(|| error_at(&pair, "missing function argument"))?,
        )?;
        Ok(Expr::Function(function, Box::new(argument)))
    }
}

fn parse_identifier(name: &str) -> Expr {
    match Constant::from_name(name) {
        Some(constant) => Expr::Constant(constant),
        None => Expr::Variable(name.to_string()),
    }
}

fn parse_number(pair: &Pair<Rule>) -> Result<Expr, ParseError> {
    let value: f64 = pair
        .as_str()
        .parse()
        .map_err(|_| error_at(pair, "invalid number"))?;
    if !value.is_finite() {
        return Err(error_at(pair, "number is too large"));
    }
    Ok(Expr::Number(value))
}

fn first_child<'i>(pair: &Pair<'i, Rule>, message: &str) -> Result<Pair<'i, Rule>, ParseError> {
    pair.clone()
        .into_inner()
        .next()
        .ok_or_else(|| error_at(pair, message))
}

fn error_at(pair: &Pair<Rule>, message: &str) -> ParseError {
    let span = pair.as_span();
    syntax_error(message, span.get_input(), span.start())
}

fn unexpected(pair: &Pair<Rule>, rule: Rule) -> ParseError {
    error_at(pair, &format!("unexpected {:?}", rule))
}
