#![no_main]

use equate::sampler::seeded_rng;
use equate::{Confidence, EquivalenceEngine};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Split the input into a student and an expected answer
        let (student, expected) = s.split_once('\n').unwrap_or((s, "x"));

        let engine = EquivalenceEngine::default();
        let verdict = engine.check_with_rng(student, expected, &mut seeded_rng(0));
        if verdict.confidence == Confidence::High {
            assert!(verdict.is_equivalent);
        }
    }
});
