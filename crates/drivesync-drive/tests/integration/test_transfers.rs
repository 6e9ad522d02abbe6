//! Uploads and downloads against a mocked Drive API

use drivesync_core::domain::newtypes::{FileName, RemoteId};
use drivesync_core::ports::IRemoteStore;
use drivesync_drive::provider::DriveRemoteStore;
use drivesync_drive::DriveError;
use wiremock::{
    matchers::{body_string_contains, header_regex, method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::common;

fn id(s: &str) -> RemoteId {
    RemoteId::new(s.to_string()).unwrap()
}

fn name(s: &str) -> FileName {
    FileName::new(s.to_string()).unwrap()
}

#[tokio::test]
async fn test_upload_sends_multipart_related() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .and(query_param("uploadType", "multipart"))
        .and(header_regex("content-type", "^multipart/related; boundary=.+$"))
        .and(body_string_contains(r#""name":"report.txt""#))
        .and(body_string_contains(r#""parents":["folder-1"]"#))
        .and(body_string_contains("quarterly numbers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(common::file_json("up-1", "report.txt")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let uploaded = client
        .upload_multipart(&id("folder-1"), &name("report.txt"), b"quarterly numbers")
        .await
        .unwrap();

    assert_eq!(uploaded.id, "up-1");
}

#[tokio::test]
async fn test_store_upload_returns_new_id() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_upload(&server, "up-2", "a.txt").await;

    let store = DriveRemoteStore::new(client);
    let remote_id = store
        .upload_file(&id("folder-1"), &name("a.txt"), b"A".to_vec())
        .await
        .unwrap();

    assert_eq!(remote_id.as_str(), "up-2");
}

#[tokio::test]
async fn test_upload_error_status() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(ResponseTemplate::new(403).set_body_string("insufficientPermissions"))
        .mount(&server)
        .await;

    let err = client
        .upload_multipart(&id("folder-1"), &name("a.txt"), b"A")
        .await
        .unwrap_err();

    assert!(matches!(err, DriveError::Forbidden(_)));
}

#[tokio::test]
async fn test_download_streams_content() {
    let (server, client) = common::setup_drive_mock().await;
    let content = b"Hello, Drive! This is test content.";
    common::mount_download(&server, "dl-1", content).await;

    let mut sink: Vec<u8> = Vec::new();
    let written = client.download_to(&id("dl-1"), &mut sink).await.unwrap();

    assert_eq!(written, content.len() as u64);
    assert_eq!(sink, content);
}

#[tokio::test]
async fn test_download_large_file_to_disk() {
    let (server, client) = common::setup_drive_mock().await;
    let content: Vec<u8> = (0..1_048_576).map(|i| (i % 256) as u8).collect();
    common::mount_download(&server, "big", &content).await;

    let dir = tempfile::TempDir::new().unwrap();
    let target = dir.path().join("big.bin");
    let mut file = tokio::fs::File::create(&target).await.unwrap();

    let store = DriveRemoteStore::new(client);
    let written = store.download_file(&id("big"), &mut file).await.unwrap();
    drop(file);

    assert_eq!(written, 1_048_576);
    assert_eq!(std::fs::read(&target).unwrap(), content);
}

#[tokio::test]
async fn test_download_empty_file() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_download(&server, "empty", &[]).await;

    let mut sink: Vec<u8> = Vec::new();
    let written = client.download_to(&id("empty"), &mut sink).await.unwrap();

    assert_eq!(written, 0);
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_download_missing_file() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("File not found: gone."))
        .mount(&server)
        .await;

    let mut sink: Vec<u8> = Vec::new();
    let err = client.download_to(&id("gone"), &mut sink).await.unwrap_err();

    assert!(matches!(err, DriveError::NotFound(_)));
    assert!(sink.is_empty());
}
