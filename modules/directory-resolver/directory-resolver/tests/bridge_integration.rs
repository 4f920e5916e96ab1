//! Blocking bridge: configuration handling and concurrent callers.

use std::io::Write;
use std::thread;

use directory_resolver::DirectoryBridge;
use directory_resolver_sdk::{AuthResult, IdentityDirectory, Lookup, Password};
use httpmock::prelude::*;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn yaml_for(server: &MockServer) -> String {
    format!(
        "base_url: {}\nallow_insecure_http: true\nrequest_timeout_ms: 2000\n",
        server.url("/nss")
    )
}

#[test]
fn unconfigured_endpoint_fails_without_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).body("1");
    });

    for contents in ["", "\n\n", "base_url: \"\"\n", "# nothing here\n"] {
        let file = config_file(contents);
        let bridge = DirectoryBridge::from_path(file.path());

        assert!(bridge.resolve_by_name("alice").unwrap_err().is_configuration());
        assert!(bridge.resolve_by_id(1000).unwrap_err().is_configuration());
        assert!(
            bridge
                .authenticate("alice", &Password::new("pw"))
                .unwrap_err()
                .is_configuration()
        );
    }

    mock.assert_calls(0);
}

#[test]
fn malformed_config_fails_without_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).body("1");
    });

    let file = config_file(&format!("{}unexpected_key: 1\n", yaml_for(&server)));
    let bridge = DirectoryBridge::from_path(file.path());
    assert!(bridge.resolve_by_name("alice").unwrap_err().is_configuration());
    mock.assert_calls(0);
}

#[test]
fn yaml_config_resolves_and_authenticates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/nss").query_param("id", "alice");
        then.status(200).body("1000 alice");
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/nss")
            .query_param("id", "bob")
            .query_param("pass", "secret");
        then.status(200).body("1");
    });

    let file = config_file(&yaml_for(&server));
    let bridge = DirectoryBridge::from_path(file.path());

    let lookup = bridge.resolve_by_name("alice").unwrap();
    assert_eq!(lookup.into_identity().unwrap().numeric_id(), 1000);
    assert_eq!(
        bridge
            .authenticate("bob", &Password::new("secret"))
            .unwrap(),
        AuthResult::Authenticated
    );
}

#[test]
fn legacy_file_refuses_plain_http() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET);
        then.status(200).body("1000 alice");
    });

    // A legacy file carries only the URL, so plain HTTP stays disallowed.
    let file = config_file(&format!("{}\n", server.url("/nss")));
    let bridge = DirectoryBridge::from_path(file.path());
    let err = bridge.resolve_by_name("alice").unwrap_err();
    assert!(!err.is_configuration(), "got {err:?}");
    mock.assert_calls(0);
}

#[tokio::test]
async fn bridge_works_inside_async_runtime() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/nss").query_param("name", "1000");
        then.status(200).body("1000 alice");
    });

    let file = config_file(&yaml_for(&server));
    let bridge = DirectoryBridge::from_path(file.path());
    let lookup = bridge.resolve_by_id(1000).unwrap();
    assert_eq!(lookup.into_identity().unwrap().name(), "alice");
}

#[test]
fn concurrent_lookups_get_their_own_identity() {
    const CALLERS: u32 = 16;

    let server = MockServer::start();
    for i in 0..CALLERS {
        let name = format!("user{i:02}");
        let body = format!("{} {name}", 2000 + i);
        server.mock(move |when, then| {
            when.method(GET).path("/nss").query_param("id", name.as_str());
            then.status(200).body(body.as_str());
        });
    }

    let file = config_file(&yaml_for(&server));
    let bridge = DirectoryBridge::from_path(file.path());

    thread::scope(|scope| {
        let handles: Vec<_> = (0..CALLERS)
            .map(|i| {
                let bridge = &bridge;
                scope.spawn(move || {
                    let name = format!("user{i:02}");
                    (i, name.clone(), bridge.resolve_by_name(&name))
                })
            })
            .collect();

        for handle in handles {
            let (i, name, result) = handle.join().unwrap();
            match result.unwrap() {
                Lookup::Found(identity) => {
                    assert_eq!(identity.numeric_id(), 2000 + i);
                    assert_eq!(identity.name(), name);
                }
                Lookup::NotFound => panic!("{name} not found"),
            }
        }
    });
}
