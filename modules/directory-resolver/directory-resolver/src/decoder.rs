//! Response decoding.
//!
//! Both shapes are plain text. Authentication answers are judged on their
//! leading byte; lookup answers are either `*` or `"<numeric_id> <name>"`.

use directory_resolver_sdk::{
    AuthResult, DirectoryError, Lookup, NOT_FOUND_SENTINEL, ResolvedIdentity,
};

/// Decode the body of a 2xx authentication response.
///
/// A leading `'0'` denies; any other leading byte authenticates. An empty body
/// carries no verdict and is treated as a denial.
#[must_use]
pub fn decode_auth(body: &[u8]) -> AuthResult {
    match body.first() {
        None | Some(b'0') => AuthResult::Denied,
        Some(_) => AuthResult::Authenticated,
    }
}

/// Decode the body of a 2xx lookup response.
///
/// Every malformed body is `NotFound`; there is no partial result.
#[must_use]
pub fn decode_lookup(body: &[u8]) -> Lookup {
    match try_decode_lookup(body) {
        Ok(lookup) => lookup,
        Err(e) => {
            tracing::debug!(error = %e, len = body.len(), "discarding malformed lookup response");
            Lookup::NotFound
        }
    }
}

/// Decode a lookup body, reporting why a malformed one was rejected.
///
/// Surrounding whitespace and trailing NUL bytes are ignored. A leading `*`
/// and the sentinel id `-1` both mean `NotFound`.
///
/// # Errors
///
/// Returns `DirectoryError::Decode` for non-UTF-8 bodies, anything other than
/// exactly two tokens, ids that are negative or do not fit `u32`, and names
/// rejected by [`ResolvedIdentity::new`].
pub fn try_decode_lookup(body: &[u8]) -> Result<Lookup, DirectoryError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| DirectoryError::Decode(format!("response is not UTF-8: {e}")))?;
    let text = text.trim_end_matches('\0').trim();

    if text.starts_with('*') {
        return Ok(Lookup::NotFound);
    }

    let mut tokens = text.split_whitespace();
    let (Some(id), Some(name), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(DirectoryError::Decode(
            "expected \"<numeric_id> <name>\"".to_owned(),
        ));
    };

    let id: i64 = id
        .parse()
        .map_err(|e| DirectoryError::Decode(format!("invalid numeric id '{id}': {e}")))?;
    if id == NOT_FOUND_SENTINEL {
        return Ok(Lookup::NotFound);
    }
    let id = u32::try_from(id)
        .map_err(|_| DirectoryError::Decode(format!("numeric id {id} out of range")))?;

    ResolvedIdentity::new(id, name).map(Lookup::Found)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn found(id: u32, name: &str) -> Lookup {
        Lookup::Found(ResolvedIdentity::new(id, name).unwrap())
    }

    #[test]
    fn test_auth_leading_byte() {
        assert_eq!(decode_auth(b"1"), AuthResult::Authenticated);
        assert_eq!(decode_auth(b"ok"), AuthResult::Authenticated);
        assert_eq!(decode_auth(b"0"), AuthResult::Denied);
        assert_eq!(decode_auth(b"0 invalid credentials"), AuthResult::Denied);
        assert_eq!(decode_auth(b""), AuthResult::Denied);
        // Only the first byte counts.
        assert_eq!(decode_auth(b" 0"), AuthResult::Authenticated);
    }

    #[test]
    fn test_lookup_star_is_not_found() {
        assert_eq!(decode_lookup(b"*"), Lookup::NotFound);
        assert_eq!(decode_lookup(b"*\n"), Lookup::NotFound);
        assert_eq!(decode_lookup(b"*\0"), Lookup::NotFound);
    }

    #[test]
    fn test_lookup_sentinel_is_not_found() {
        assert_eq!(decode_lookup(b"-1 ghost"), Lookup::NotFound);
        assert_eq!(try_decode_lookup(b"-1 ghost").unwrap(), Lookup::NotFound);
        assert_eq!(decode_lookup(b"4294967295 ghost"), Lookup::NotFound);
    }

    #[test]
    fn test_lookup_identity() {
        assert_eq!(decode_lookup(b"1000 alice"), found(1000, "alice"));
        assert_eq!(decode_lookup(b"  0\troot \n"), found(0, "root"));
        assert_eq!(decode_lookup(b"1001 bob\0"), found(1001, "bob"));
    }

    #[test]
    fn test_lookup_malformed_is_not_found() {
        for body in [
            &b""[..],
            b"alice",
            b"1000",
            b"1000 alice extra",
            b"abc alice",
            b"-5 alice",
            b"4294967296 alice",
            b"1000 al:ice",
            b"\xff\xfe alice",
        ] {
            assert_eq!(decode_lookup(body), Lookup::NotFound, "body {body:?}");
            assert!(try_decode_lookup(body).is_err(), "body {body:?}");
        }
    }
}
