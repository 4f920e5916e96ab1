#![no_main]

use directory_resolver::DirectoryConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(contents) = std::str::from_utf8(data) {
        if let Ok(config) = DirectoryConfig::from_contents(contents) {
            // Whatever parses has already passed validation.
            assert!(config.validate().is_ok());
            let _ = config.endpoint();
        }
    }
});
