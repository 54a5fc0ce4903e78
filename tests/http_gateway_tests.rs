//! HTTP gateway tests against a mock server: envelope unwrapping, error
//! normalization, and auth header injection.

use std::time::Duration;

use pretty_assertions::assert_eq;
use url::Url;

use garrison_client::gateway::{Gateway, GatewayConfig, HttpGateway};
use garrison_client::types::{JobId, JobState, ModId, NewCollection};
use garrison_client::Error;

async fn gateway_for(server: &mockito::ServerGuard) -> HttpGateway {
    let config = GatewayConfig::new(Url::parse(&format!("{}/api", server.url())).unwrap())
        .with_timeout(Duration::from_secs(2));
    HttpGateway::new(config).unwrap()
}

#[tokio::test]
async fn job_status_decodes_wire_shape() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/async/job-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "RUNNING", "message": "downloading files"}"#)
        .create_async()
        .await;

    let gateway = gateway_for(&server).await;
    let status = gateway.job_status(&JobId::new("job-1")).await.unwrap();

    assert_eq!(status.state, JobState::Running);
    assert_eq!(status.message, "downloading files");
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_message_wins_over_canned_text() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/api/mod/subscription/3")
        .with_status(409)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "Mod is part of an active collection"}"#)
        .create_async()
        .await;

    let gateway = gateway_for(&server).await;
    let err = gateway.remove_mod(ModId(3)).await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 409);
            assert_eq!(message, "Mod is part of an active collection");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bodyless_error_falls_back_to_canned_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/mod/subscriptions")
        .with_status(404)
        .create_async()
        .await;

    let gateway = gateway_for(&server).await;
    let err = gateway.list_mods().await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Resource not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn auth_token_rides_as_bearer_header() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/health")
        .match_header("authorization", "Bearer sekrit")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "healthy", "message": "API is running"}"#)
        .create_async()
        .await;

    let config = GatewayConfig::new(Url::parse(&format!("{}/api", server.url())).unwrap())
        .with_auth_token("sekrit");
    let gateway = HttpGateway::new(config).unwrap();

    let ack = gateway.health().await.unwrap();
    assert_eq!(ack.message, "API is running");
    mock.assert_async().await;
}

#[tokio::test]
async fn list_envelope_is_unwrapped() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/mod/subscriptions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"results": [{"id": 1, "steam_id": 100, "name": "ACE"},
                            {"id": 2, "steam_id": 200}],
                "message": "Retrieved successfully"}"#,
        )
        .create_async()
        .await;

    let gateway = gateway_for(&server).await;
    let mods = gateway.list_mods().await.unwrap();

    assert_eq!(mods.len(), 2);
    assert_eq!(mods[0].name.as_deref(), Some("ACE"));
    assert_eq!(mods[1].display_name(), "Mod 200");
}

#[tokio::test]
async fn created_envelope_is_unwrapped() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/mod/collection")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"result": {"id": 9, "name": "Weekend", "mods": []},
                "message": "Successfully created"}"#,
        )
        .create_async()
        .await;

    let gateway = gateway_for(&server).await;
    let created = gateway
        .create_collection(&NewCollection {
            name: "Weekend".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();

    assert_eq!(created.id.0, 9);
    assert_eq!(created.name, "Weekend");
}

#[tokio::test]
async fn job_accept_response_carries_job_id() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/mod/5/download")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "dl-5-abc", "message": "Download queued"}"#)
        .create_async()
        .await;

    let gateway = gateway_for(&server).await;
    let accepted = gateway.download_mod(ModId(5)).await.unwrap();

    assert_eq!(accepted.job_id.as_str(), "dl-5-abc");
    assert_eq!(accepted.message, "Download queued");
}

#[tokio::test]
async fn image_bytes_pass_through_untouched() {
    let raw: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a];
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/mod/subscription/5/image")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(raw)
        .create_async()
        .await;

    let gateway = gateway_for(&server).await;
    let bytes = gateway.mod_image(ModId(5)).await.unwrap();
    assert_eq!(bytes.as_ref(), raw);
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/async/job-x")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "NOT_A_REAL_STATE", "message": ""}"#)
        .create_async()
        .await;

    let gateway = gateway_for(&server).await;
    let err = gateway.job_status(&JobId::new("job-x")).await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)), "got: {err:?}");
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // Nothing listens on port 1.
    let config = GatewayConfig::new(Url::parse("http://127.0.0.1:1/api").unwrap())
        .with_timeout(Duration::from_millis(300));
    let gateway = HttpGateway::new(config).unwrap();

    let err = gateway.health().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
}
