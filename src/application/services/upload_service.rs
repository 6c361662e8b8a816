//! Upload Service
//!
//! Images are uploaded by clients straight to the media host. The API only
//! issues a short-lived signature over the upload parameters, so the media
//! host secret never leaves the server.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::application::dto::{UploadSignatureRequest, UploadSignatureResponse};
use crate::config::UploadSettings;
use crate::shared::error::AppError;
use crate::shared::validation::FieldErrors;

/// Upload service trait
#[async_trait]
pub trait UploadService: Send + Sync {
    async fn sign_upload(
        &self,
        request: UploadSignatureRequest,
    ) -> Result<UploadSignatureResponse, UploadError>;
}

/// Upload service errors
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Media uploads are not configured")]
    NotConfigured,

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::NotConfigured => AppError::Internal(e.to_string()),
            UploadError::App(inner) => inner,
        }
    }
}

/// UploadService implementation
pub struct UploadServiceImpl {
    settings: UploadSettings,
}

impl UploadServiceImpl {
    pub fn new(settings: UploadSettings) -> Self {
        Self { settings }
    }
}

/// `hex(sha256("folder=<folder>&timestamp=<timestamp>" + secret))`
pub fn sign(folder: &str, timestamp: i64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("folder={}&timestamp={}", folder, timestamp));
    hasher.update(secret);
    hex::encode(hasher.finalize())
}

#[async_trait]
impl UploadService for UploadServiceImpl {
    async fn sign_upload(
        &self,
        request: UploadSignatureRequest,
    ) -> Result<UploadSignatureResponse, UploadError> {
        let mut errors = FieldErrors::from_validator(request.validate());
        if let Some(folder) = request.folder.as_deref() {
            if folder.contains(['&', '=', '?']) {
                errors.add("folder", "Folder contains reserved characters", folder);
            }
        }
        errors.into_result()?;

        if self.settings.api_secret.is_empty() || self.settings.api_key.is_empty() {
            tracing::warn!("Upload signature requested but media host credentials are missing");
            return Err(UploadError::NotConfigured);
        }

        let folder = request
            .folder
            .unwrap_or_else(|| self.settings.default_folder.clone());
        let issued_at = Utc::now();
        let timestamp = issued_at.timestamp();

        tracing::debug!(folder = %folder, timestamp, "Issuing upload signature");

        Ok(UploadSignatureResponse {
            signature: sign(&folder, timestamp, &self.settings.api_secret),
            timestamp,
            api_key: self.settings.api_key.clone(),
            cloud_name: self.settings.cloud_name.clone(),
            folder,
            expires_at: issued_at + Duration::seconds(self.settings.signature_ttl_secs),
        })
    }
}
