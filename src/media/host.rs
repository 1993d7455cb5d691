//! Media Host contract and the Cloudinary-backed implementation.
//!
//! The board only needs one call from an asset host: take bytes, give
//! back a durable URL. Uploads go through Cloudinary's unsigned upload
//! endpoint with the preset configured in local prefs; the `auto`
//! resource type lets the host sort images from videos itself.

use async_trait::async_trait;

use crate::error::AppError;

/// File details sent alongside the bytes.
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub file_name: String,
    pub content_type: String,
}

/// The one-call asset host contract.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload a file, returning the durable URL to store.
    async fn upload(&self, bytes: Vec<u8>, metadata: &UploadMetadata) -> Result<String, AppError>;
}

/// Unsigned uploads against a Cloudinary cloud.
pub struct CloudinaryHost {
    client: reqwest::Client,
    cloud_name: String,
    upload_preset: String,
}

impl CloudinaryHost {
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/auto/upload",
            self.cloud_name
        )
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, bytes: Vec<u8>, metadata: &UploadMetadata) -> Result<String, AppError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(metadata.file_name.clone())
            .mime_str(&metadata.content_type)
            .map_err(|e| AppError::UploadFailed(format!("bad content type: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .part("file", part);

        log::info!(
            "Media: uploading {} ({}) to cloud {}",
            metadata.file_name,
            metadata.content_type,
            self.cloud_name
        );
        let response = self
            .client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::UploadFailed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UploadFailed(format!(
                "host returned {}",
                status
            )));
        }
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::UploadFailed(format!("unreadable response: {}", e)))?;
        body.get("secure_url")
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::UploadFailed("response missing secure_url".to_string()))
    }
}

/// Test double that records calls instead of talking to a host.
#[cfg(test)]
pub struct RecordingHost {
    uploads: std::sync::Mutex<Vec<UploadMetadata>>,
    fail_next: std::sync::Mutex<Option<String>>,
    url: String,
}

#[cfg(test)]
impl RecordingHost {
    pub fn new(url: &str) -> Self {
        Self {
            uploads: std::sync::Mutex::new(Vec::new()),
            fail_next: std::sync::Mutex::new(None),
            url: url.to_string(),
        }
    }

    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn last_metadata(&self) -> Option<UploadMetadata> {
        self.uploads.lock().unwrap().last().cloned()
    }
}

#[cfg(test)]
#[async_trait]
impl MediaHost for RecordingHost {
    async fn upload(&self, _bytes: Vec<u8>, metadata: &UploadMetadata) -> Result<String, AppError> {
        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(AppError::UploadFailed(message));
        }
        self.uploads.lock().unwrap().push(metadata.clone());
        Ok(self.url.clone())
    }
}
