#![no_main]

use equate::{Grader, SessionTelemetry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (String, String, u8, u8)| {
    let (student, expected, attempts, hints) = input;

    let grader = Grader::new();
    let result = grader.grade(
        Some(&student),
        Some(&expected),
        SessionTelemetry::new(u32::from(attempts), u32::from(hints)),
    );
    assert!((0.0..=1.0).contains(&result.score));
});
