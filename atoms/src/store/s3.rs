use super::{split_url, ObjectStore, StoreError, StoreErrorCode};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

#[derive(Clone, Debug)]
pub struct S3Store {
    client: S3Client,
    bucket: String,
    /// Base URL objects are served from, without trailing slash. Either the
    /// bucket's virtual-host endpoint or a CDN in front of it.
    public_base_url: String,
}

impl S3Store {
    pub fn new(client: S3Client, bucket: impl Into<String>, region: &str, public_base_url: Option<String>) -> Self {
        let bucket = bucket.into();
        let public_base_url = public_base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("https://{}.s3.{}.amazonaws.com", bucket, region));
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

fn sdk_error<E, R>(op: &str, err: SdkError<E, R>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let code = match &err {
        SdkError::TimeoutError(_) => StoreErrorCode::DeadlineExceeded,
        SdkError::DispatchFailure(_) => StoreErrorCode::Unavailable,
        _ => StoreErrorCode::from_aws_code(err.code()),
    };
    let detail = format!("S3 {} error: {}", op, DisplayErrorContext(&err));
    tracing::error!("{}", detail);
    StoreError::new(code, detail)
}

// Accepts the configured public base plus both raw S3 URL styles:
// 1. bucket.s3.<region>.amazonaws.com/key
// 2. s3.<region>.amazonaws.com/bucket/key
fn parse_key(url: &str, bucket: &str, public_base_url: &str) -> Option<String> {
    if let Some(rest) = url.strip_prefix(public_base_url).and_then(|r| r.strip_prefix('/')) {
        let key = rest.split(['?', '#']).next().unwrap_or(rest);
        return (!key.is_empty()).then(|| key.to_string());
    }

    let (host, path) = split_url(url)?;
    let key = if host.starts_with("s3.") || host == "s3.amazonaws.com" {
        let (url_bucket, key) = path.split_once('/')?;
        if url_bucket != bucket {
            return None;
        }
        key
    } else {
        let url_bucket = host.split(".s3").next()?;
        if url_bucket != bucket || !host.ends_with(".amazonaws.com") {
            return None;
        }
        path
    };

    (!key.is_empty()).then(|| key.to_string())
}

impl ObjectStore for S3Store {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| sdk_error("put_object", e))?;
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| sdk_error("delete_object", e))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        parse_key(url, &self.bucket, &self.public_base_url)
    }
}
