#![no_main]

use directory_resolver::decode_auth;
use directory_resolver_sdk::AuthResult;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let expected = match data.first() {
        None | Some(b'0') => AuthResult::Denied,
        Some(_) => AuthResult::Authenticated,
    };
    assert_eq!(decode_auth(data), expected);
});
