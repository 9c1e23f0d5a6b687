use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_TYPES: [&str; 5] = ["image/jpeg", "image/jpg", "image/png", "image/webp", "image/gif"];

pub const DEFAULT_FOLDER: &str = "uploads";

/// A file received from the admin form.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// One stored image, returned to the caller and never persisted on its own.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub id: String,
    pub url: String,
    pub key: String,
    pub filename: String,
    pub size: usize,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UploadFailure {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct BatchUploadReport {
    pub uploaded: Vec<UploadedImage>,
    pub failed: Vec<UploadFailure>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteImagePayload {
    pub url: String,
}
