use crate::store::StoreError;

/// Failure of a facade operation. `Display` is the message shown to the
/// administrator.
#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    /// Every violated rule, in rule order.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Upload(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn not_found(what: &str) -> Self {
        ServiceError::NotFound(format!("{} not found", what))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreErrorCode;

    #[test]
    fn validation_message_lists_every_rule() {
        let err = ServiceError::Validation(vec!["Title is required".into(), "Category is required".into()]);
        assert_eq!(err.to_string(), "Validation failed: Title is required, Category is required");
    }

    #[test]
    fn store_errors_surface_the_user_message() {
        let err: ServiceError = StoreError::new(StoreErrorCode::PermissionDenied, "AccessDeniedException").into();
        assert_eq!(err.to_string(), "You do not have permission to perform this operation.");
        assert!(!err.is_not_found());
        assert!(ServiceError::not_found("Course").is_not_found());
    }
}
