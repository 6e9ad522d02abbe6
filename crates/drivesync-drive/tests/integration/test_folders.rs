//! Folder lookup, creation and listing against a mocked Drive API

use std::sync::Arc;
use std::time::Duration;

use drivesync_core::domain::newtypes::RemoteId;
use drivesync_core::ports::IRemoteStore;
use drivesync_core::usecases::ResolveFolderUseCase;
use drivesync_drive::files::{children_query, folder_query};
use drivesync_drive::provider::DriveRemoteStore;
use drivesync_drive::DriveError;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, ResponseTemplate,
};

use crate::common;

#[tokio::test]
async fn test_find_folders_sends_query_and_token() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(header("authorization", "Bearer test-access-token"))
        .and(query_param("q", folder_query("drive-sync").as_str()))
        .and(query_param("fields", "nextPageToken,files(id,name,mimeType)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [common::folder_json("folder-1", "drive-sync")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let folders = client.find_folders("drive-sync").await.unwrap();

    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].id, "folder-1");
    assert!(folders[0].is_folder());
}

#[tokio::test]
async fn test_find_folders_escapes_quotes() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_list(
        &server,
        "mimeType='application/vnd.google-apps.folder' and name='bob\\'s files' and trashed=false",
        serde_json::json!([common::folder_json("quoted", "bob's files")]),
    )
    .await;

    let folders = client.find_folders("bob's files").await.unwrap();
    assert_eq!(folders[0].id, "quoted");
}

#[tokio::test]
async fn test_create_folder_posts_metadata() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("fields", "id"))
        .and(body_json(serde_json::json!({
            "name": "drive-sync",
            "mimeType": "application/vnd.google-apps.folder"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "new-folder"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client.create_folder("drive-sync").await.unwrap();
    assert_eq!(id.as_str(), "new-folder");
}

#[tokio::test]
async fn test_list_children_follows_pages() {
    let (server, client) = common::setup_drive_mock().await;
    let folder = RemoteId::new("folder-1".to_string()).unwrap();
    let query = children_query(&folder);

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", query.as_str()))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [common::file_json("c", "c.txt")]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", query.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [common::file_json("a", "a.txt"), common::file_json("b", "b.txt")],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let children = client.list_children(&folder).await.unwrap();
    let ids: Vec<&str> = children.iter().map(|f| f.id.as_str()).collect();

    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_unauthorized_is_classified() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
        .mount(&server)
        .await;

    let err = client.find_folders("drive-sync").await.unwrap_err();
    assert!(matches!(err, DriveError::Unauthorized(ref body) if body.contains("Invalid")));
    assert!(err.is_auth_error());
}

#[tokio::test]
async fn test_rate_limit_carries_retry_after() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = client.find_folders("drive-sync").await.unwrap_err();
    match err {
        DriveError::TooManyRequests { retry_after } => {
            assert_eq!(retry_after, Some(Duration::from_secs(7)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_store_lists_children_as_entries() {
    let (server, client) = common::setup_drive_mock().await;
    let folder = RemoteId::new("folder-1".to_string()).unwrap();

    common::mount_list(
        &server,
        &children_query(&folder),
        serde_json::json!([
            common::file_json("f1", "notes.md"),
            common::folder_json("d1", "nested")
        ]),
    )
    .await;

    let store = DriveRemoteStore::new(client);
    let entries = store.list_children(&folder).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "notes.md");
    assert!(!entries[0].is_folder);
    assert!(entries[1].is_folder);
}

#[tokio::test]
async fn test_resolver_creates_folder_when_absent() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_list(&server, &folder_query("drive-sync"), serde_json::json!([])).await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "created"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = ResolveFolderUseCase::new(Arc::new(DriveRemoteStore::new(client)), "drive-sync");
    let id = resolver.execute().await.unwrap();

    assert_eq!(id.as_str(), "created");
}

#[tokio::test]
async fn test_resolver_reuses_existing_folder() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_list(
        &server,
        &folder_query("drive-sync"),
        serde_json::json!([
            common::folder_json("first", "drive-sync"),
            common::folder_json("second", "drive-sync")
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let resolver = ResolveFolderUseCase::new(Arc::new(DriveRemoteStore::new(client)), "drive-sync");

    assert_eq!(resolver.execute().await.unwrap().as_str(), "first");
    assert_eq!(resolver.execute().await.unwrap().as_str(), "first");
}
