//! Drive `files` endpoint operations
//!
//! Folder lookup and creation, paginated child listing, multipart uploads
//! and streamed downloads. All calls return a classified [`DriveError`].

use drivesync_core::domain::newtypes::{FileName, RemoteId};
use futures_util::StreamExt;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::client::DriveClient;
use crate::DriveError;

/// MIME type Drive assigns to folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Partial-response selector for listings
const LIST_FIELDS: &str = "nextPageToken,files(id,name,mimeType)";

/// Largest page size `files.list` accepts
const PAGE_SIZE: &str = "1000";

const BOUNDARY_BASE: &str = "drivesync_part_boundary";

// ============================================================================
// API types
// ============================================================================

/// A file resource as returned by `files.list` / `files.create`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// Drive file ID
    pub id: String,
    /// File name (absent when not requested through `fields`)
    #[serde(default)]
    pub name: Option<String>,
    /// MIME type
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl DriveFile {
    /// Whether this resource is a folder
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }

    /// Validated identifier of this resource
    pub fn remote_id(&self) -> Result<RemoteId, DriveError> {
        RemoteId::new(self.id.clone())
            .map_err(|e| DriveError::InvalidResponse(format!("bad file id: {e}")))
    }
}

/// One page of a `files.list` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

/// Metadata sent when creating a folder or file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMetadata<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parents: Vec<&'a str>,
}

// ============================================================================
// Query helpers
// ============================================================================

/// Escapes a value for use inside a single-quoted Drive query string
pub fn escape_query_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Query matching live folders named exactly `name`
pub fn folder_query(name: &str) -> String {
    format!(
        "mimeType='{}' and name='{}' and trashed=false",
        FOLDER_MIME_TYPE,
        escape_query_value(name)
    )
}

/// Query matching live children of `folder_id`
pub fn children_query(folder_id: &RemoteId) -> String {
    format!(
        "'{}' in parents and trashed=false",
        escape_query_value(folder_id.as_str())
    )
}

/// Picks a multipart boundary that does not occur inside `data`
fn choose_boundary(data: &[u8]) -> String {
    let mut attempt = 0u32;
    loop {
        let candidate = if attempt == 0 {
            BOUNDARY_BASE.to_string()
        } else {
            format!("{BOUNDARY_BASE}_{attempt}")
        };
        if !contains_subslice(data, candidate.as_bytes()) {
            return candidate;
        }
        attempt += 1;
    }
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

/// Builds a `multipart/related` body: JSON metadata part then media part
fn multipart_body(boundary: &str, metadata: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + metadata.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n--{boundary}\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

// ============================================================================
// Operations
// ============================================================================

impl DriveClient {
    /// Runs a paginated `files.list` query and collects every page
    async fn list_all(&self, query: &str) -> Result<Vec<DriveFile>, DriveError> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut params = vec![
                ("q", query.to_string()),
                ("fields", LIST_FIELDS.to_string()),
                ("pageSize", PAGE_SIZE.to_string()),
                ("spaces", "drive".to_string()),
            ];
            if let Some(token) = page_token.take() {
                params.push(("pageToken", token));
            }

            let response = self
                .send(self.request(Method::GET, "/files").query(&params))
                .await?;
            let page: DriveFileList = response
                .json()
                .await
                .map_err(|e| DriveError::InvalidResponse(format!("files.list: {e}")))?;

            pages += 1;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(query, pages, count = files.len(), "Listed files");
        Ok(files)
    }

    /// Lists live folders named exactly `name`, in API order
    pub async fn find_folders(&self, name: &str) -> Result<Vec<DriveFile>, DriveError> {
        self.list_all(&folder_query(name)).await
    }

    /// Lists live children of `folder_id` across all pages
    pub async fn list_children(&self, folder_id: &RemoteId) -> Result<Vec<DriveFile>, DriveError> {
        self.list_all(&children_query(folder_id)).await
    }

    /// Creates a folder at the Drive root and returns its ID
    pub async fn create_folder(&self, name: &str) -> Result<RemoteId, DriveError> {
        let metadata = CreateMetadata {
            name,
            mime_type: Some(FOLDER_MIME_TYPE),
            parents: Vec::new(),
        };

        let response = self
            .send(
                self.request(Method::POST, "/files")
                    .query(&[("fields", "id")])
                    .json(&metadata),
            )
            .await?;
        let created: DriveFile = response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(format!("files.create: {e}")))?;

        let id = created.remote_id()?;
        info!(name, id = %id, "Created Drive folder");
        Ok(id)
    }

    /// Uploads `data` as a new file called `name` inside `folder_id`
    ///
    /// Uses a single `multipart/related` request. An existing file with the
    /// same name is left untouched; Drive keeps both.
    pub async fn upload_multipart(
        &self,
        folder_id: &RemoteId,
        name: &FileName,
        data: &[u8],
    ) -> Result<DriveFile, DriveError> {
        let metadata = serde_json::to_string(&CreateMetadata {
            name: name.as_str(),
            mime_type: None,
            parents: vec![folder_id.as_str()],
        })
        .map_err(|e| DriveError::InvalidResponse(format!("metadata encoding: {e}")))?;

        let boundary = choose_boundary(data);
        let body = multipart_body(&boundary, &metadata, data);

        debug!(file = %name, bytes = data.len(), "Uploading file");

        let response = self
            .send(
                self.upload_request(Method::POST, "/files")
                    .query(&[("uploadType", "multipart"), ("fields", "id,name")])
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        format!("multipart/related; boundary={boundary}"),
                    )
                    .body(body),
            )
            .await?;
        let uploaded: DriveFile = response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(format!("upload: {e}")))?;

        // Validate before handing the id back
        uploaded.remote_id()?;
        Ok(uploaded)
    }

    /// Streams the content of `file_id` into `dest`, returning the byte count
    ///
    /// `dest` is flushed before returning. On error, whatever was already
    /// written stays written.
    pub async fn download_to<W>(&self, file_id: &RemoteId, dest: &mut W) -> Result<u64, DriveError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let path = format!("/files/{}", file_id.as_str());
        let response = self
            .send(self.request(Method::GET, &path).query(&[("alt", "media")]))
            .await?;

        let mut stream = std::pin::pin!(response.bytes_stream());
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            dest.write_all(&chunk).await.map_err(|e| {
                DriveError::InvalidResponse(format!("writing download of {file_id}: {e}"))
            })?;
            written += chunk.len() as u64;
        }
        dest.flush()
            .await
            .map_err(|e| DriveError::InvalidResponse(format!("flushing download of {file_id}: {e}")))?;

        debug!(id = %file_id, bytes = written, "Downloaded file");
        Ok(written)
    }
}
