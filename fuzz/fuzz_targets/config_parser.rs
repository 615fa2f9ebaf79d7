#![no_main]

use libfuzzer_sys::fuzz_target;
use scriptprof::ProfileConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Must return an error, never panic, on malformed TOML
        let _ = ProfileConfig::from_toml_str(input);
    }
});
