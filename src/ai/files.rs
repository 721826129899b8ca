//! Generative Language Files API plumbing.
//!
//! Media too large for inline upload goes through the Files API: upload the
//! bytes, wait for the service to finish processing them, generate against
//! the file URI, then delete the remote copy.

use std::path::Path;
use std::time::Duration;

use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;

use crate::config::PollConfig;
use crate::error::ImportError;

/// Processing state of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FileState {
    #[serde(rename = "PROCESSING")]
    Processing,
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(other)]
    Unknown,
}

impl Default for FileState {
    fn default() -> Self {
        // Freshly uploaded files report PROCESSING or omit the field
        FileState::Processing
    }
}

/// Handle to a file uploaded to the service.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc-123`
    pub name: String,
    /// URI referenced from generation requests
    pub uri: String,
    #[serde(default)]
    pub state: FileState,
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
}

/// Upload a local media file.
pub async fn upload(
    client: &Client,
    base_url: &str,
    api_key: &str,
    path: &Path,
    mime_type: &str,
) -> Result<RemoteFile, ImportError> {
    let bytes = tokio::fs::read(path).await?;
    debug!("Uploading {} ({} bytes)", path.display(), bytes.len());

    let url = format!("{base_url}/upload/v1beta/files?key={api_key}");
    let response = client
        .post(&url)
        .header("X-Goog-Upload-Protocol", "raw")
        .header(CONTENT_TYPE, mime_type)
        .body(bytes)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ImportError::Api { status, body });
    }

    let body: Value = response.json().await?;
    let file: RemoteFile = serde_json::from_value(body["file"].clone())?;
    Ok(file)
}

/// Fetch the current metadata of an uploaded file.
pub async fn get(
    client: &Client,
    base_url: &str,
    api_key: &str,
    name: &str,
) -> Result<RemoteFile, ImportError> {
    let url = format!("{base_url}/v1beta/{name}?key={api_key}");
    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ImportError::Api { status, body });
    }

    Ok(response.json().await?)
}

/// Poll until the file leaves the processing state, within the configured
/// attempt budget. The delay grows with each attempt so a slow remote job
/// does not get hammered, and a stuck one cannot hang the caller forever.
pub async fn wait_until_active(
    client: &Client,
    base_url: &str,
    api_key: &str,
    file: RemoteFile,
    poll: &PollConfig,
) -> Result<RemoteFile, ImportError> {
    let mut file = file;
    let mut attempt = 0u32;

    loop {
        match file.state {
            FileState::Active => return Ok(file),
            FileState::Failed => {
                return Err(ImportError::Processing(format!(
                    "{} entered FAILED state",
                    file.name
                )));
            }
            FileState::Processing | FileState::Unknown => {
                if attempt >= poll.max_attempts {
                    return Err(ImportError::ProcessingTimeout {
                        attempts: poll.max_attempts,
                    });
                }
                attempt += 1;
                debug!(
                    "File {} still processing (attempt {}/{})",
                    file.name, attempt, poll.max_attempts
                );
                sleep(Duration::from_millis(poll.delay_ms * attempt as u64)).await;
                file = get(client, base_url, api_key, &file.name).await?;
            }
        }
    }
}

/// Delete an uploaded file. Callers treat failures as best-effort.
pub async fn delete(
    client: &Client,
    base_url: &str,
    api_key: &str,
    name: &str,
) -> Result<(), ImportError> {
    let url = format!("{base_url}/v1beta/{name}?key={api_key}");
    let response = client.delete(&url).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ImportError::Api { status, body });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fast_poll(max_attempts: u32) -> PollConfig {
        PollConfig {
            delay_ms: 1,
            max_attempts,
        }
    }

    #[tokio::test]
    async fn test_wait_until_active_polls_once() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1beta/files/abc?key=test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"name": "files/abc", "uri": "https://files/abc", "state": "ACTIVE", "mimeType": "video/mp4"}"#,
            )
            .create();

        let uploaded = RemoteFile {
            name: "files/abc".to_string(),
            uri: "https://files/abc".to_string(),
            state: FileState::Processing,
            mime_type: "video/mp4".to_string(),
        };

        let client = Client::new();
        let file = wait_until_active(&client, &server.url(), "test-key", uploaded, &fast_poll(5))
            .await
            .unwrap();
        assert_eq!(file.state, FileState::Active);
        mock.assert();
    }

    #[tokio::test]
    async fn test_wait_until_active_times_out() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v1beta/files/slow?key=test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "files/slow", "uri": "u", "state": "PROCESSING"}"#)
            .expect(3)
            .create();

        let uploaded = RemoteFile {
            name: "files/slow".to_string(),
            uri: "u".to_string(),
            state: FileState::Processing,
            mime_type: String::new(),
        };

        let client = Client::new();
        let err = wait_until_active(&client, &server.url(), "test-key", uploaded, &fast_poll(3))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ImportError::ProcessingTimeout { attempts: 3 }
        ));
        mock.assert();
    }

    #[tokio::test]
    async fn test_failed_state_is_surfaced() {
        let uploaded = RemoteFile {
            name: "files/bad".to_string(),
            uri: "u".to_string(),
            state: FileState::Failed,
            mime_type: String::new(),
        };

        let client = Client::new();
        let err = wait_until_active(
            &client,
            "http://localhost:1",
            "test-key",
            uploaded,
            &fast_poll(3),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ImportError::Processing(_)));
    }

    #[tokio::test]
    async fn test_delete_surfaces_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/v1beta/files/abc?key=test-key")
            .with_status(403)
            .with_body(r#"{"error": "forbidden"}"#)
            .create();

        let client = Client::new();
        let err = delete(&client, &server.url(), "test-key", "files/abc")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Api { status: 403, .. }));
        mock.assert();
    }
}
