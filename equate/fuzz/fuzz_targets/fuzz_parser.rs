#![no_main]

use equate::{ExpressionService, MathExpressionService, VariableBinding};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let service = MathExpressionService::new();

        if let Ok(expr) = service.parse(s) {
            let simplified = service.simplify(&expr);
            let _ = service.evaluate(&simplified, &VariableBinding::new());

            // Printed trees must parse back
            let _ = service.parse(&expr.to_string());
        }
    }
});
