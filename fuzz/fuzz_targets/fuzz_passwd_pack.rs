#![no_main]

use directory_resolver::{PasswdConfig, PasswdEntry};
use directory_resolver_sdk::ResolvedIdentity;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u32, String, u8)| {
    let (id, name, buf_len) = input;
    let Ok(identity) = ResolvedIdentity::new(id, name) else {
        return;
    };

    let entry = PasswdEntry::from_identity(&identity, &PasswdConfig::default());
    let mut buf = vec![0xAA_u8; usize::from(buf_len)];
    match entry.pack_into(&mut buf) {
        Ok(_) => assert!(entry.packed_len() <= buf.len()),
        Err(_) => {
            assert!(entry.packed_len() > buf.len());
            assert!(buf.iter().all(|b| *b == 0xAA));
        }
    }
});
