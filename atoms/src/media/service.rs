use super::model::{BatchUploadReport, UploadFailure, UploadFile, UploadedImage, ALLOWED_TYPES, DEFAULT_FOLDER, MAX_UPLOAD_BYTES};
use crate::error::ServiceError;
use crate::store::ObjectStore;
use futures::future::join_all;
use std::path::Path;

/// Keeps `[A-Za-z0-9_-/]`, drops empty segments, falls back to `uploads`.
pub fn sanitize_folder(folder: Option<&str>) -> String {
    let cleaned: String = folder
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '/'))
        .collect();

    let folder = cleaned
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if folder.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        folder
    }
}

fn sanitize_stem(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();

    if stem.trim_matches('_').is_empty() {
        "image".to_string()
    } else {
        stem
    }
}

fn extension_for(filename: &str, content_type: &str) -> String {
    let from_name = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.unwrap_or_else(|| {
        match content_type {
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "jpg",
        }
        .to_string()
    })
}

/// `<folder>/<unix-millis>-<stem>-<8 hex>.<ext>`
pub fn object_key(folder: &str, filename: &str, content_type: &str, millis: i64) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}/{}-{}-{}.{}",
        folder,
        millis,
        sanitize_stem(filename),
        &suffix[..8],
        extension_for(filename, content_type)
    )
}

/// Declared type, or a guess from the filename when the client sent none.
pub fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    match declared.map(str::trim).filter(|t| !t.is_empty()) {
        Some(declared) => declared.to_ascii_lowercase(),
        None => mime_guess::from_path(filename)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string()),
    }
}

pub fn validate_upload(file: Option<&UploadFile>) -> Result<&UploadFile, ServiceError> {
    let file = file.ok_or_else(|| ServiceError::Upload("No file provided".to_string()))?;

    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ServiceError::Upload("File size exceeds 10MB limit".to_string()));
    }
    if !ALLOWED_TYPES.contains(&file.content_type.as_str()) {
        return Err(ServiceError::Upload(
            "Invalid file type. Only JPEG, PNG, WebP and GIF images are allowed".to_string(),
        ));
    }

    Ok(file)
}

/// Validate and store one image under `folder`.
pub async fn upload_image<O: ObjectStore>(
    objects: &O,
    file: Option<&UploadFile>,
    folder: Option<&str>,
) -> Result<UploadedImage, ServiceError> {
    let file = validate_upload(file)?;
    let folder = sanitize_folder(folder);

    let now = chrono::Utc::now();
    let key = object_key(&folder, &file.filename, &file.content_type, now.timestamp_millis());

    objects
        .put_object(&key, file.bytes.clone(), &file.content_type)
        .await?;

    tracing::info!("Uploaded {} ({} bytes) to {}", file.filename, file.bytes.len(), key);

    Ok(UploadedImage {
        id: uuid::Uuid::new_v4().to_string(),
        url: objects.public_url(&key),
        key,
        filename: file.filename.clone(),
        size: file.bytes.len(),
        uploaded_at: now,
    })
}

/// Uploads every file concurrently. Never fails as a whole.
pub async fn upload_images<O: ObjectStore>(
    objects: &O,
    files: &[UploadFile],
    folder: Option<&str>,
) -> BatchUploadReport {
    let results = join_all(files.iter().map(|file| upload_image(objects, Some(file), folder))).await;

    let mut report = BatchUploadReport::default();
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(image) => report.uploaded.push(image),
            Err(e) => {
                tracing::warn!("Upload of {} failed: {}", file.filename, e);
                report.failed.push(UploadFailure {
                    filename: file.filename.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

/// Delete the stored object behind a public URL.
pub async fn delete_image<O: ObjectStore>(objects: &O, url: &str) -> Result<(), ServiceError> {
    let key = objects
        .key_from_url(url.trim())
        .ok_or_else(|| ServiceError::Upload("Invalid storage URL".to_string()))?;

    objects.delete_object(&key).await?;
    tracing::info!("Deleted stored object {}", key);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryObjectStore;
    use bytes::Bytes;

    fn file(name: &str, content_type: &str, size: usize) -> UploadFile {
        UploadFile {
            filename: name.to_string(),
            content_type: content_type.to_string(),
            bytes: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn folders_are_sanitized() {
        assert_eq!(sanitize_folder(None), "uploads");
        assert_eq!(sanitize_folder(Some("  ")), "uploads");
        assert_eq!(sanitize_folder(Some("courses/backgrounds")), "courses/backgrounds");
        assert_eq!(sanitize_folder(Some("../etc//pass wd")), "etc/passwd");
    }

    #[test]
    fn keys_follow_layout() {
        let key = object_key("courses", "My Photo.PNG", "image/png", 1700000000000);
        let (folder, name) = key.split_once('/').unwrap();
        assert_eq!(folder, "courses");
        assert!(name.starts_with("1700000000000-My_Photo-"));
        assert!(name.ends_with(".png"));
        assert_eq!(name.len(), "1700000000000-My_Photo-".len() + 8 + ".png".len());

        assert!(object_key("uploads", "blob", "image/webp", 1).ends_with(".webp"));
        assert!(object_key("uploads", "???.gif", "image/gif", 1).contains("-image-"));
    }

    #[test]
    fn content_type_falls_back_to_filename() {
        assert_eq!(resolve_content_type(Some("Image/PNG"), "x"), "image/png");
        assert_eq!(resolve_content_type(None, "photo.jpg"), "image/jpeg");
        assert_eq!(resolve_content_type(None, "noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn upload_rejects_oversized_and_disallowed_files() {
        let objects = MemoryObjectStore::default();

        let big = file("big.png", "image/png", 12 * 1024 * 1024);
        let err = upload_image(&objects, Some(&big), None).await.unwrap_err();
        assert_eq!(err.to_string(), "File size exceeds 10MB limit");

        let pdf = file("doc.pdf", "application/pdf", 1024);
        assert!(upload_image(&objects, Some(&pdf), None).await.is_err());

        let err = upload_image(&objects, None, None).await.unwrap_err();
        assert_eq!(err.to_string(), "No file provided");
        assert!(objects.is_empty());
    }

    #[tokio::test]
    async fn upload_stores_under_folder() {
        let objects = MemoryObjectStore::default();
        let png = file("cover.png", "image/png", 2 * 1024 * 1024);

        let image = upload_image(&objects, Some(&png), Some("courses")).await.unwrap();

        assert!(image.url.contains("/courses/"));
        assert_eq!(image.size, 2 * 1024 * 1024);
        assert_eq!(image.filename, "cover.png");
        let stored = objects.get(&image.key).unwrap();
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn batch_reports_failures_separately() {
        let objects = MemoryObjectStore::default();
        let files = vec![
            file("a.png", "image/png", 10),
            file("b.pdf", "application/pdf", 10),
            file("c.gif", "image/gif", 10),
        ];

        let report = upload_images(&objects, &files, Some("gallery")).await;
        assert_eq!(report.uploaded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].filename, "b.pdf");
        assert_eq!(objects.len(), 2);
    }

    #[tokio::test]
    async fn delete_requires_a_url_of_this_store() {
        let objects = MemoryObjectStore::default();
        let image = upload_image(&objects, Some(&file("a.webp", "image/webp", 10)), None)
            .await
            .unwrap();

        let err = delete_image(&objects, "https://elsewhere.example/a.webp").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid storage URL");

        delete_image(&objects, &image.url).await.unwrap();
        assert!(objects.is_empty());
    }
}
