use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hearth_core::images::ImageHost;
use hearth_core::{CoreError, CoreResult};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Client for the third-party image host. Photos are pushed as base64 and
/// come back as public URLs; the backend only ever stores the URL.
pub struct ImgurClient {
    http: reqwest::Client,
    upload_url: String,
    client_id: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    link: String,
}

impl ImgurClient {
    pub fn new(upload_url: &str, client_id: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            upload_url: upload_url.to_string(),
            client_id: client_id.to_string(),
        }
    }
}

#[async_trait]
impl ImageHost for ImgurClient {
    async fn upload(&self, bytes: &[u8]) -> CoreResult<String> {
        let body = json!({
            "image": STANDARD.encode(bytes),
            "type": "base64",
        });

        let response = self
            .http
            .post(&self.upload_url)
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::TransientNetwork(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(if status.is_server_error() {
                CoreError::TransientNetwork(format!("{}: {}", status, body))
            } else {
                CoreError::RemoteRejection(format!("Image host refused upload: {}", body))
            });
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| CoreError::RemoteRejection(format!("Malformed upload response: {}", e)))?;

        debug!("Uploaded {} bytes to image host", bytes.len());
        Ok(parsed.data.link)
    }
}
