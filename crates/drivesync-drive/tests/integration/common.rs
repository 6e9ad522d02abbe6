//! Shared test helpers for drivesync-drive integration tests

use drivesync_drive::client::DriveClient;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Access token every mock expects
pub const TEST_TOKEN: &str = "test-access-token";

/// Starts a mock server and returns a client pointed at it
///
/// Metadata calls go to `<server>/files...`, uploads to
/// `<server>/upload/files...`.
pub async fn setup_drive_mock() -> (MockServer, DriveClient) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_urls(
        TEST_TOKEN,
        server.uri(),
        format!("{}/upload", server.uri()),
    );
    (server, client)
}

/// JSON for a plain file resource
pub fn file_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "name": name, "mimeType": "text/plain" })
}

/// JSON for a folder resource
pub fn folder_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "mimeType": "application/vnd.google-apps.folder"
    })
}

/// Mounts a single-page `files.list` answer for `query`
pub async fn mount_list(server: &MockServer, query: &str, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": files
        })))
        .mount(server)
        .await;
}

/// Mounts a media download for `file_id`
pub async fn mount_download(server: &MockServer, file_id: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/files/{file_id}")))
        .and(query_param("alt", "media"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .append_header("Content-Type", "application/octet-stream"),
        )
        .mount(server)
        .await;
}

/// Mounts a multipart upload endpoint answering with `id`
pub async fn mount_upload(server: &MockServer, id: &str, name: &str) {
    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .and(query_param("uploadType", "multipart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json(id, name)))
        .mount(server)
        .await;
}
