//! Token refresh against a mocked OAuth token endpoint

use std::path::Path;

use drivesync_core::ports::IRemoteStore;
use drivesync_drive::auth::{ClientCredentials, StoredToken, TokenRefresher, TokenSession};
use drivesync_drive::client::DriveClient;
use drivesync_drive::provider::DriveRemoteStore;
use tempfile::TempDir;
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::common;

const REFRESH: &str = "refresh-abc";

fn stale_token(expiry_date: Option<i64>) -> StoredToken {
    StoredToken {
        access_token: "stale".to_string(),
        refresh_token: Some(REFRESH.to_string()),
        scope: Some("https://www.googleapis.com/auth/drive.file".to_string()),
        token_type: Some("Bearer".to_string()),
        expiry_date,
    }
}

fn session_for(server: &MockServer, token_path: &Path, token: StoredToken) -> TokenSession {
    let credentials = ClientCredentials {
        client_id: "client-1".to_string(),
        client_secret: Some("secret-1".to_string()),
        token_uri: Some(format!("{}/token", server.uri())),
    };
    let refresher = TokenRefresher::new(&credentials, "https://unused.invalid/token").unwrap();
    TokenSession::new(token_path, token, Some(refresher))
}

async fn mount_token_endpoint(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains(format!("refresh_token={REFRESH}")))
        .and(body_string_contains("client_id=client-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh",
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn client_for(server: &MockServer, access_token: &str) -> DriveClient {
    DriveClient::with_base_urls(
        access_token,
        server.uri(),
        format!("{}/upload", server.uri()),
    )
}

#[tokio::test]
async fn test_unauthorized_request_refreshes_and_retries_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [common::folder_json("folder-1", "drive-sync")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = DriveRemoteStore::new(client_for(&server, "stale"))
        .with_session(session_for(&server, &token_path, stale_token(None)));

    let folders = store.find_folders("drive-sync").await.unwrap();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].id.as_str(), "folder-1");

    let saved = StoredToken::load(&token_path).unwrap();
    assert_eq!(saved.access_token, "fresh");
    assert_eq!(saved.refresh_token.as_deref(), Some(REFRESH));
    assert!(!saved.is_expired());
}

#[tokio::test]
async fn test_refreshed_token_is_kept_for_later_requests() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "files": [] })))
        .expect(2)
        .mount(&server)
        .await;

    let store = DriveRemoteStore::new(client_for(&server, "stale"))
        .with_session(session_for(&server, &token_path, stale_token(None)));

    assert!(store.find_folders("a").await.unwrap().is_empty());
    assert!(store.find_folders("b").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unauthorized_without_session_is_not_retried() {
    let (server, client) = common::setup_drive_mock().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_token_endpoint(&server, 0).await;

    let store = DriveRemoteStore::new(client);
    let err = store.find_folders("drive-sync").await.unwrap_err();

    assert!(format!("{err:#}").contains("Unauthorized"));
}

#[tokio::test]
async fn test_failed_refresh_is_reported() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = DriveRemoteStore::new(client_for(&server, "stale"))
        .with_session(session_for(&server, &token_path, stale_token(None)));

    let err = store.find_folders("drive-sync").await.unwrap_err();
    let rendered = format!("{err:#}");
    assert!(rendered.contains("Failed to refresh access token"), "{rendered}");
    assert!(rendered.contains("invalid_grant"), "{rendered}");
    assert!(!token_path.exists());
}

#[tokio::test]
async fn test_ensure_fresh_refreshes_expired_token() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    mount_token_endpoint(&server, 1).await;

    let mut session = session_for(&server, &token_path, stale_token(Some(1000)));
    assert!(session.token().is_expired());

    assert!(session.ensure_fresh().await.unwrap());
    assert_eq!(session.token().access_token, "fresh");
    assert!(!session.token().is_expired());

    // Already fresh: no second call
    assert!(!session.ensure_fresh().await.unwrap());
    assert_eq!(StoredToken::load(&token_path).unwrap().access_token, "fresh");
}

#[tokio::test]
async fn test_ensure_fresh_leaves_valid_token_alone() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let token_path = dir.path().join("token.json");
    mount_token_endpoint(&server, 0).await;

    let mut session = session_for(&server, &token_path, stale_token(Some(4102444800000)));

    assert!(!session.ensure_fresh().await.unwrap());
    assert_eq!(session.token().access_token, "stale");
    assert!(!token_path.exists());
}
