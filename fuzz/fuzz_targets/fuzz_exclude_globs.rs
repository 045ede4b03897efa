//! Fuzz target for exclude glob compilation and matching.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_exclude_globs
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct ExcludeInput {
    /// Glob patterns (e.g., "**/parameters*.json")
    patterns: Vec<String>,
    /// Relative template paths to match against
    candidates: Vec<String>,
}

fuzz_target!(|input: ExcludeInput| {
    if input.patterns.len() > 20 || input.candidates.len() > 100 {
        return;
    }
    let patterns: Vec<String> = input
        .patterns
        .into_iter()
        .filter(|p| p.len() <= 256)
        .collect();

    if let Ok(set) = iacguard_arm::build_globset(&patterns) {
        for candidate in input.candidates.iter().filter(|c| c.len() <= 512) {
            let _ = set.is_match(candidate.as_str());
        }
    }
});
