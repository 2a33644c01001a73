#![no_main]

use libfuzzer_sys::fuzz_target;
use redirector::ProxyConfig;

fuzz_target!(|data: &[u8]| {
    let input = match std::str::from_utf8(data) {
        Ok(s) => s,
        Err(_) => return,
    };

    // Whatever parses must serialize to something that parses again
    if let Ok(config) = ProxyConfig::from_json(input) {
        if let Ok(json) = config.to_pretty_json() {
            assert!(ProxyConfig::from_json(&json).is_ok());
        }
    }
});
