//! Outbound client tests against a `wiremock` stand-in for the Workspace API.

use std::time::Duration;

use reqwest::StatusCode;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use workspace_alert_bridge::auth::CredentialExchanger;
use workspace_alert_bridge::config::{Config, Credentials};
use workspace_alert_bridge::error::{AuthError, SendError};
use workspace_alert_bridge::sender::{Notifier, WorkspaceClient};
use workspace_alert_bridge::types::OutboundMessage;

const BASIC_AUTH: &str = "Basic YXBwLWlkOmFwcC1zZWNyZXQ=";

fn credentials() -> Credentials {
    Credentials {
        client_id: "app-id".into(),
        client_secret: "app-secret".into(),
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

fn workspace(server: &MockServer) -> WorkspaceClient {
    let client = http_client();
    let exchanger = CredentialExchanger::new(client.clone(), &server.uri(), credentials());
    WorkspaceClient::new(client, &server.uri(), exchanger)
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("authorization", BASIC_AUTH))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "jwt-123",
            "expires_in": 43199
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

// ── Credential exchange ────────────────────────────────────────────────

#[tokio::test]
async fn exchange_returns_bearer_token() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let exchanger = CredentialExchanger::new(http_client(), &server.uri(), credentials());
    let token = exchanger.authenticate().await.unwrap();
    assert_eq!(token.bearer(), "jwt-123");
}

#[tokio::test]
async fn exchange_rejection_is_a_distinct_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad client"))
        .mount(&server)
        .await;

    let exchanger = CredentialExchanger::new(http_client(), &server.uri(), credentials());
    match exchanger.authenticate().await {
        Err(AuthError::Rejected { status, body }) => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, "bad client");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn exchange_without_token_field_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "x" })),
        )
        .mount(&server)
        .await;

    let exchanger = CredentialExchanger::new(http_client(), &server.uri(), credentials());
    assert!(matches!(
        exchanger.authenticate().await,
        Err(AuthError::MalformedResponse(_))
    ));
}

// ── Message delivery ───────────────────────────────────────────────────

#[tokio::test]
async fn send_posts_annotated_message_with_bearer() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/v1/spaces/space-1/messages"))
        .and(header("authorization", "Bearer jwt-123"))
        .and(body_json(serde_json::json!({
            "type": "appMessage",
            "version": 1.0,
            "annotations": [{
                "type": "generic",
                "version": 1.0,
                "color": "#CC0000",
                "title": "Incident open web CPU",
                "text": "hot\nLink: [Incident 1](https://x/1)"
            }]
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let message = OutboundMessage::new(
        "space-1",
        "Incident open web CPU",
        "hot\nLink: [Incident 1](https://x/1)",
        Some("open"),
    );
    workspace(&server).send(message).await.unwrap();
}

#[tokio::test]
async fn every_send_reauthenticates() {
    let server = MockServer::start().await;
    mount_token(&server, 2).await;

    Mock::given(method("POST"))
        .and(path("/v1/spaces/s/messages"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;

    let client = workspace(&server);
    for _ in 0..2 {
        client
            .send(OutboundMessage::new("s", "Echo", "Yes", None))
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn non_created_status_is_a_delivery_error() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/v1/spaces/s/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok?"))
        .mount(&server)
        .await;

    let err = workspace(&server)
        .send(OutboundMessage::new("s", "Echo", "Yes", None))
        .await
        .unwrap_err();
    match err {
        SendError::Delivery { status, body } => {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, "ok?");
        }
        other => panic!("expected Delivery, got {other:?}"),
    }
}

#[tokio::test]
async fn auth_failure_skips_the_message_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/spaces/s/messages"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = workspace(&server)
        .send(OutboundMessage::new("s", "Echo", "Yes", None))
        .await
        .unwrap_err();
    assert!(err.is_auth());
    match err {
        SendError::Auth(AuthError::Rejected { status, .. }) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn client_from_config_targets_configured_api() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v1/spaces/cfg/messages"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let config = Config::from_lookup(|key| match key {
        "NEWRELIC_CLIENT_ID" => Some("app-id".into()),
        "NEWRELIC_CLIENT_SECRET" => Some("app-secret".into()),
        "NEWRELIC_WEBHOOK_SECRET" => Some("hook".into()),
        "WORKSPACE_API_URL" => Some(uri.clone()),
        _ => None,
    })
    .unwrap();

    WorkspaceClient::from_config(&config)
        .unwrap()
        .send(OutboundMessage::new("cfg", "Echo", "Yes", None))
        .await
        .unwrap();
}
