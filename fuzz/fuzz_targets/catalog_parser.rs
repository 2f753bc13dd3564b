#![no_main]

use abplan::catalog::Catalog;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Neither parser may panic, whatever the input
        let _ = Catalog::from_toml_str(input);
        let _ = Catalog::from_json_str(input);
    }
});
