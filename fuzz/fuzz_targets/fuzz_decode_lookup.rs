#![no_main]

use directory_resolver::decode_lookup;
use directory_resolver_sdk::Lookup;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Lookup::Found(identity) = decode_lookup(data) {
        // Anything accepted must be safe to place in a passwd entry.
        assert_ne!(identity.numeric_id(), u32::MAX);
        assert!(!identity.name().is_empty());
        assert!(!identity.name().contains(':'));
        assert!(!identity.name().chars().any(char::is_control));
    }
});
