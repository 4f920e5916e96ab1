//! Resolver and client behaviour against a stub directory service.

use directory_resolver::{DirectoryClient, DirectoryConfig, IdentityResolver};
use directory_resolver_sdk::{
    AuthResult, DirectoryError, Lookup, Password, ResolvedIdentity, ServiceEndpoint,
};
use httpmock::prelude::*;
use url::Url;

fn client() -> DirectoryClient {
    let mut config = DirectoryConfig::default();
    config.allow_insecure_http = true;
    DirectoryClient::from_config(&config).unwrap()
}

fn resolver() -> IdentityResolver {
    IdentityResolver::new(client())
}

fn endpoint(server: &MockServer, path: &str) -> ServiceEndpoint {
    ServiceEndpoint::parse(&server.url(path)).unwrap()
}

fn identity(id: u32, name: &str) -> Lookup {
    Lookup::Found(ResolvedIdentity::new(id, name).unwrap())
}

#[tokio::test]
async fn authenticate_accepts_leading_one() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/auth")
            .query_param("id", "alice")
            .query_param("pass", "correct");
        then.status(200).body("1");
    });

    let result = resolver()
        .authenticate(&endpoint(&server, "/auth"), "alice", &Password::new("correct"))
        .await;
    assert_eq!(result, AuthResult::Authenticated);
    mock.assert();
}

#[tokio::test]
async fn authenticate_denies_leading_zero() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/auth");
        then.status(200).body("0");
    });

    let result = resolver()
        .authenticate(&endpoint(&server, "/auth"), "alice", &Password::new("wrong"))
        .await;
    assert_eq!(result, AuthResult::Denied);
}

#[tokio::test]
async fn authenticate_server_error_is_service_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/auth");
        then.status(500).body("1");
    });

    let result = resolver()
        .authenticate(&endpoint(&server, "/auth"), "alice", &Password::new("correct"))
        .await;
    assert_eq!(result, AuthResult::ServiceError);
}

#[tokio::test]
async fn authenticate_percent_encodes_credentials() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/auth")
            .query_param("id", "a&b")
            .query_param("pass", "p?ss&id=root");
        then.status(200).body("1");
    });

    let result = resolver()
        .authenticate(
            &endpoint(&server, "/auth"),
            "a&b",
            &Password::new("p?ss&id=root"),
        )
        .await;
    assert_eq!(result, AuthResult::Authenticated);
    mock.assert();
}

#[tokio::test]
async fn lookup_round_trip() {
    let server = MockServer::start();
    let by_name = server.mock(|when, then| {
        when.method(GET).path("/nss").query_param("id", "alice");
        then.status(200).body("1000 alice");
    });
    let by_id = server.mock(|when, then| {
        when.method(GET).path("/nss").query_param("name", "1000");
        then.status(200).body("1000 alice\n");
    });

    let resolver = resolver();
    let ep = endpoint(&server, "/nss");

    let found = resolver.resolve_by_name(&ep, "alice").await.unwrap();
    let uid = found.into_identity().unwrap().numeric_id();
    assert_eq!(uid, 1000);

    let back = resolver.resolve_by_id(&ep, uid).await.unwrap();
    assert_eq!(back, identity(1000, "alice"));

    by_name.assert();
    by_id.assert();
}

#[tokio::test]
async fn lookup_not_found_shapes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/nss").query_param("id", "nobody");
        then.status(200).body("*");
    });
    server.mock(|when, then| {
        when.method(GET).path("/nss").query_param("id", "ghost");
        then.status(200).body("-1 ghost");
    });
    server.mock(|when, then| {
        when.method(GET).path("/nss").query_param("id", "garbled");
        then.status(200).body("not a record at all");
    });

    let resolver = resolver();
    let ep = endpoint(&server, "/nss");
    for name in ["nobody", "ghost", "garbled"] {
        assert_eq!(
            resolver.resolve_by_name(&ep, name).await.unwrap(),
            Lookup::NotFound,
            "{name}"
        );
    }
}

#[tokio::test]
async fn lookup_transport_failure_is_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/nss");
        then.status(404);
    });

    let err = resolver()
        .resolve_by_id(&endpoint(&server, "/nss"), 1000)
        .await
        .unwrap_err();
    assert!(matches!(err, DirectoryError::Transport(_)), "got {err:?}");
}

#[tokio::test]
async fn fetch_into_capacity_minus_one_fits() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/nss");
        then.status(200).body("123456789012345");
    });

    let url = Url::parse(&server.url("/nss")).unwrap();
    let mut dest = [0xAA_u8; 16];
    let len = client().fetch_into(&url, &mut dest).await.unwrap();

    assert_eq!(len, 15);
    assert_eq!(&dest[..15], b"123456789012345");
    assert_eq!(dest[15], 0);
}

#[tokio::test]
async fn fetch_into_full_capacity_overflows_untouched() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/nss");
        then.status(200).body("1234567890123456");
    });

    let url = Url::parse(&server.url("/nss")).unwrap();
    let mut dest = [0xAA_u8; 16];
    let err = client().fetch_into(&url, &mut dest).await.unwrap_err();

    assert!(
        matches!(err, DirectoryError::BufferOverflow { capacity: 16 }),
        "got {err:?}"
    );
    assert!(dest.iter().all(|b| *b == 0xAA), "destination was modified");
}

#[tokio::test]
async fn oversized_lookup_is_overflow_not_truncation() {
    let server = MockServer::start();
    let long_name = "a".repeat(300);
    server.mock(|when, then| {
        when.method(GET).path("/nss");
        then.status(200).body(format!("1000 {long_name}"));
    });

    let err = resolver()
        .resolve_by_name(&endpoint(&server, "/nss"), "alice")
        .await
        .unwrap_err();
    assert!(err.is_buffer_overflow(), "got {err:?}");
}

#[tokio::test]
async fn empty_name_short_circuits() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/nss");
        then.status(200).body("1000 alice");
    });

    let lookup = resolver()
        .resolve_by_name(&endpoint(&server, "/nss"), "")
        .await
        .unwrap();
    assert_eq!(lookup, Lookup::NotFound);
    mock.assert_calls(0);
}
