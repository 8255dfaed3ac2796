//! Free-variable discovery and random integer assignments

use crate::expression::{ExpressionService, VariableBinding};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

/// Symbols that are constants, never free variables (case-insensitive)
pub const RESERVED_CONSTANTS: [&str; 4] = ["pi", "e", "true", "false"];

pub fn is_reserved_constant(name: &str) -> bool {
    RESERVED_CONSTANTS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// Draws variable assignments uniformly from an inclusive integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSampler {
    min: i64,
    max: i64,
}

impl Default for VariableSampler {
    fn default() -> Self {
        Self::new(-10, 10)
    }
}

impl VariableSampler {
    /// Bounds are swapped if given in the wrong order
    pub fn new(min: i64, max: i64) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn range(&self) -> (i64, i64) {
        (self.min, self.max)
    }

    /// Free variables of `text`. Unparsable text has none.
    pub fn extract_variables<S: ExpressionService>(&self, service: &S, text: &str) -> BTreeSet<String> {
        match service.parse(text) {
            Ok(expr) => self.variables_of(service, &expr),
            Err(_) => BTreeSet::new(),
        }
    }

    /// Free variables of an already parsed expression
    pub fn variables_of<S: ExpressionService>(&self, service: &S, expr: &S::Expr) -> BTreeSet<String> {
        service
            .symbols(expr)
            .into_iter()
            .filter(|name| !is_reserved_constant(name))
            .collect()
    }

    /// One independent uniform draw per variable
    pub fn sample<R: Rng>(&self, variables: &[String], rng: &mut R) -> VariableBinding {
        variables
            .iter()
            .map(|name| (name.clone(), rng.random_range(self.min..=self.max)))
            .collect()
    }

    /// Sample with a fresh thread-local generator
    pub fn sample_unseeded(&self, variables: &[String]) -> VariableBinding {
        self.sample(variables, &mut rand::rng())
    }
}

/// A generator that replays the same stream for the same seed
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
