use super::model::{DeleteImagePayload, UploadFile};
use super::service::{delete_image, resolve_content_type, upload_image, upload_images};
use crate::error::ServiceError;
use crate::response::{failure, json_response, parse_json, service_failure, success};
use crate::store::ObjectStore;
use bytes::Bytes;
use lambda_http::{http::StatusCode, Body, Error, Response};
use serde_json::json;

/// Parts of an upload form we care about.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<UploadFile>,
    pub folder: Option<String>,
}

fn multipart_error(e: multer::Error) -> ServiceError {
    ServiceError::Upload(format!("Invalid multipart body: {}", e))
}

/// Reads `file`/`files` parts and the `folder` field out of a buffered
/// multipart body. Parts with an empty body count as no file.
pub async fn parse_upload_form(content_type: Option<&str>, body: Bytes) -> Result<UploadForm, ServiceError> {
    let content_type = content_type.ok_or_else(|| ServiceError::Upload("Expected multipart/form-data".to_string()))?;
    let boundary = multer::parse_boundary(content_type).map_err(multipart_error)?;

    let stream = futures::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "files" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let declared = field.content_type().map(|m| m.essence_str().to_string());
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.is_empty() {
                    continue;
                }
                form.files.push(UploadFile {
                    content_type: resolve_content_type(declared.as_deref(), &filename),
                    filename,
                    bytes,
                });
            }
            "folder" => {
                form.folder = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// HTTP Handler: POST /upload
pub async fn upload_handler<O: ObjectStore>(
    objects: &O,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let form = match parse_upload_form(content_type, Bytes::copy_from_slice(body)).await {
        Ok(form) => form,
        Err(e) => return failure(StatusCode::BAD_REQUEST, e),
    };

    match upload_image(objects, form.files.first(), form.folder.as_deref()).await {
        Ok(image) => json_response(
            StatusCode::OK,
            &json!({
                "success": true,
                "url": image.url,
                "filename": image.filename,
                "data": image,
            }),
        ),
        Err(e) => service_failure(e),
    }
}

/// HTTP Handler: POST /upload/batch
pub async fn batch_upload_handler<O: ObjectStore>(
    objects: &O,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let form = match parse_upload_form(content_type, Bytes::copy_from_slice(body)).await {
        Ok(form) => form,
        Err(e) => return failure(StatusCode::BAD_REQUEST, e),
    };
    if form.files.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "No file provided");
    }

    let report = upload_images(objects, &form.files, form.folder.as_deref()).await;
    success(StatusCode::OK, &report)
}

/// HTTP Handler: DELETE /upload
pub async fn delete_upload_handler<O: ObjectStore>(objects: &O, body: &[u8]) -> Result<Response<Body>, Error> {
    let payload: DeleteImagePayload = match parse_json(body) {
        Ok(payload) => payload,
        Err(resp) => return resp,
    };

    match delete_image(objects, &payload.url).await {
        Ok(()) => json_response(StatusCode::OK, &json!({ "success": true })),
        Err(e) => service_failure(e),
    }
}
