use std::fmt;

/// Failure categories reported by the managed stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    Unavailable,
    PermissionDenied,
    NotFound,
    AlreadyExists,
    InvalidArgument,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unauthenticated,
    ResourceExhausted,
    Cancelled,
    DataLoss,
    Internal,
    Unimplemented,
    DeadlineExceeded,
    Unknown,
}

impl StoreErrorCode {
    /// Message shown to the administrator for this category.
    pub fn user_message(self) -> &'static str {
        match self {
            StoreErrorCode::Unavailable => "Service is temporarily unavailable. Please try again.",
            StoreErrorCode::PermissionDenied => "You do not have permission to perform this operation.",
            StoreErrorCode::NotFound => "The requested record was not found.",
            StoreErrorCode::AlreadyExists => "A record with this identifier already exists.",
            StoreErrorCode::InvalidArgument => "Invalid data was provided.",
            StoreErrorCode::FailedPrecondition => "The operation was rejected because the record is not in the expected state.",
            StoreErrorCode::Aborted => "The operation was aborted. Please try again.",
            StoreErrorCode::OutOfRange => "A value is out of the accepted range.",
            StoreErrorCode::Unauthenticated => "Authentication with the storage service failed.",
            StoreErrorCode::ResourceExhausted => "Storage quota exceeded. Please try again later.",
            StoreErrorCode::Cancelled => "The operation was cancelled.",
            StoreErrorCode::DataLoss => "Unrecoverable data loss or corruption.",
            StoreErrorCode::Internal => "Internal storage error.",
            StoreErrorCode::Unimplemented => "This operation is not supported by the storage service.",
            StoreErrorCode::DeadlineExceeded => "The storage service took too long to respond.",
            StoreErrorCode::Unknown => "An unknown storage error occurred.",
        }
    }

    /// Maps an AWS error code (the `code` of the error metadata) to a category.
    /// DynamoDB and S3 share most of the generic codes.
    pub fn from_aws_code(code: Option<&str>) -> Self {
        match code {
            Some("ServiceUnavailable" | "ServiceUnavailableException" | "SlowDown") => {
                StoreErrorCode::Unavailable
            }
            Some("AccessDenied" | "AccessDeniedException" | "AllAccessDisabled") => {
                StoreErrorCode::PermissionDenied
            }
            Some("ResourceNotFoundException" | "NoSuchKey" | "NoSuchBucket" | "NotFound") => {
                StoreErrorCode::NotFound
            }
            Some("ResourceInUseException" | "BucketAlreadyExists" | "BucketAlreadyOwnedByYou") => {
                StoreErrorCode::AlreadyExists
            }
            Some("ValidationException" | "SerializationException" | "InvalidArgument" | "InvalidRequest") => {
                StoreErrorCode::InvalidArgument
            }
            Some("ConditionalCheckFailedException" | "PreconditionFailed") => {
                StoreErrorCode::FailedPrecondition
            }
            Some("TransactionCanceledException" | "TransactionConflictException") => {
                StoreErrorCode::Aborted
            }
            Some("ItemCollectionSizeLimitExceededException" | "EntityTooLarge" | "InvalidRange") => {
                StoreErrorCode::OutOfRange
            }
            Some(
                "UnrecognizedClientException"
                | "ExpiredTokenException"
                | "InvalidAccessKeyId"
                | "SignatureDoesNotMatch"
                | "MissingAuthenticationToken",
            ) => StoreErrorCode::Unauthenticated,
            Some(
                "ProvisionedThroughputExceededException"
                | "RequestLimitExceeded"
                | "ThrottlingException"
                | "LimitExceededException",
            ) => StoreErrorCode::ResourceExhausted,
            Some("RequestCanceledException") => StoreErrorCode::Cancelled,
            // Body failed its integrity check on the way into S3.
            Some("BadDigest" | "XAmzContentSHA256Mismatch" | "InvalidDigest") => StoreErrorCode::DataLoss,
            Some("InternalServerError" | "InternalError" | "InternalFailure") => StoreErrorCode::Internal,
            Some("NotImplemented" | "UnknownOperationException") => StoreErrorCode::Unimplemented,
            Some("RequestTimeout" | "RequestTimeoutException") => StoreErrorCode::DeadlineExceeded,
            _ => StoreErrorCode::Unknown,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreErrorCode::Unavailable => "unavailable",
            StoreErrorCode::PermissionDenied => "permission-denied",
            StoreErrorCode::NotFound => "not-found",
            StoreErrorCode::AlreadyExists => "already-exists",
            StoreErrorCode::InvalidArgument => "invalid-argument",
            StoreErrorCode::FailedPrecondition => "failed-precondition",
            StoreErrorCode::Aborted => "aborted",
            StoreErrorCode::OutOfRange => "out-of-range",
            StoreErrorCode::Unauthenticated => "unauthenticated",
            StoreErrorCode::ResourceExhausted => "resource-exhausted",
            StoreErrorCode::Cancelled => "cancelled",
            StoreErrorCode::DataLoss => "data-loss",
            StoreErrorCode::Internal => "internal",
            StoreErrorCode::Unimplemented => "unimplemented",
            StoreErrorCode::DeadlineExceeded => "deadline-exceeded",
            StoreErrorCode::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A failure from the document or object store, already classified.
///
/// `Display` yields only the user-facing message; `detail` keeps the raw SDK
/// text for logs.
#[derive(thiserror::Error, Debug, Clone)]
#[error("{}", .code.user_message())]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub detail: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }
}
