//! Expression tree produced by the parser
//!
//! `Display` prints the minimal parenthesization needed to re-parse the tree
//! into the same shape, which also makes it the canonical text of a
//! simplified expression.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Constant(Constant),
    Variable(String),
    Negate(Box<Expr>),
    Arithmetic(Box<Expr>, ArithmeticOperation, Box<Expr>),
    Function(MathematicalFunction, Box<Expr>),
}

/// Named constants; never treated as free variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    E,
    True,
    False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathematicalFunction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    /// Natural logarithm, spelled `ln` or `log`
    Log,
    Exp,
    Abs,
}

impl Constant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pi" | "π" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            "true" => Some(Constant::True),
            "false" => Some(Constant::False),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
            Constant::True => 1.0,
            Constant::False => 0.0,
        }
    }
}

impl MathematicalFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "asin" => Some(Self::Asin),
            "acos" => Some(Self::Acos),
            "atan" => Some(Self::Atan),
            "sqrt" => Some(Self::Sqrt),
            "ln" | "log" => Some(Self::Log),
            "exp" => Some(Self::Exp),
            "abs" => Some(Self::Abs),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sqrt => "sqrt",
            Self::Log => "log",
            Self::Exp => "exp",
            Self::Abs => "abs",
        }
    }
}

impl ArithmeticOperation {
    fn symbol(self) -> &'static str {
        match self {
            ArithmeticOperation::Add => " + ",
            ArithmeticOperation::Subtract => " - ",
            ArithmeticOperation::Multiply => "*",
            ArithmeticOperation::Divide => "/",
            ArithmeticOperation::Power => "^",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            ArithmeticOperation::Add | ArithmeticOperation::Subtract => 1,
            ArithmeticOperation::Multiply | ArithmeticOperation::Divide => 2,
            ArithmeticOperation::Power => 4,
        }
    }
}

const NEGATION_PRECEDENCE: u8 = 3;
const ATOM_PRECEDENCE: u8 = 5;

impl Expr {
    pub fn number(value: f64) -> Self {
        Expr::Number(value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn binary(left: Expr, op: ArithmeticOperation, right: Expr) -> Self {
        Expr::Arithmetic(Box::new(left), op, Box::new(right))
    }

    /// Visit every node, parents before children
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        match self {
            Expr::Negate(inner) | Expr::Function(_, inner) => inner.walk(visit),
            Expr::Arithmetic(left, _, right) => {
                left.walk(visit);
                right.walk(visit);
            }
            Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => {}
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Number(n) if *n < 0.0 => NEGATION_PRECEDENCE,
            Expr::Negate(_) => NEGATION_PRECEDENCE,
            Expr::Arithmetic(_, op, _) => op.precedence(),
            _ => ATOM_PRECEDENCE,
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({})", expr)
    } else {
        write!(f, "{}", expr)
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value == 0.0 {
        // also normalizes -0
        "0".to_string()
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", format_number(*n)),
            Expr::Constant(Constant::Pi) => write!(f, "pi"),
            Expr::Constant(Constant::E) => write!(f, "e"),
            Expr::Constant(Constant::True) => write!(f, "true"),
            Expr::Constant(Constant::False) => write!(f, "false"),
            Expr::Variable(name) => write!(f, "{}", name),
            Expr::Negate(inner) => {
                write!(f, "-")?;
                // -(a*b) and (-a)*b are the same number
                write_operand(f, inner, inner.precedence() <= 1)
            }
            Expr::Arithmetic(left, op, right) => {
                let prec = op.precedence();
                let (left_parens, right_parens) = match op {
                    ArithmeticOperation::Power => {
                        (left.precedence() <= prec, right.precedence() < prec)
                    }
                    ArithmeticOperation::Subtract | ArithmeticOperation::Divide => {
                        (left.precedence() < prec, right.precedence() <= prec)
                    }
                    ArithmeticOperation::Add | ArithmeticOperation::Multiply => {
                        (left.precedence() < prec, right.precedence() < prec)
                    }
                };
                write_operand(f, left, left_parens)?;
                write!(f, "{}", op.symbol())?;
                write_operand(f, right, right_parens)
            }
            Expr::Function(func, arg) => write!(f, "{}({})", func.name(), arg),
        }
    }
}
