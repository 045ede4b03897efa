//! Fuzz target for ARM template parsing and state adaptation.
//!
//! Goal: parsing and adapting should **never panic** on any input.
//! Invalid JSON is an error, which is fine.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_template_parser
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Templates are UTF-8 JSON.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = iacguard_arm::fuzz::parse_template(text);
        let _ = iacguard_arm::fuzz::locate(text);
    }
});
