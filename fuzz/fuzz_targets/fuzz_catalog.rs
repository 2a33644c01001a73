#![no_main]

use libfuzzer_sys::fuzz_target;
use redirector::EndpointCatalog;

fuzz_target!(|data: &[u8]| {
    let input = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    // Exercise TOML catalog parsing and validation; errors are fine
    let _ = EndpointCatalog::parse(input);
});
