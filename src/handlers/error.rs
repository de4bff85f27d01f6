//! API error type
//!
//! Maps module errors onto HTTP status codes and the
//! `{ errors: [{ message }] }` body.

use super::response::{ApiResponse, ErrorBody};
use crate::auth::AuthError;
use crate::router::RouterError;
use crate::store::StoreError;
use hyper::StatusCode;
use thiserror::Error;

pub const PRODUCT_NOT_FOUND: &str = "Data Product Not Found";

/// Errors surfaced to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// Ordered field messages
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Token verified but its user is gone
    #[error("User is not authenticated")]
    Unauthenticated,

    #[error("{0}")]
    NotFound(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// Missing or unverifiable access token
    #[error("{0}")]
    Token(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn product_not_found() -> Self {
        Self::NotFound(PRODUCT_NOT_FOUND.to_string())
    }

    /// HTTP status for this error
    ///
    /// Token failures answer 500, which is what existing clients of this
    /// API expect for a bad `access_token`.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Token(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Messages placed in the response body
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(messages) => messages.clone(),
            Self::Internal(_) => vec!["Internal Server Error".to_string()],
            other => vec![other.to_string()],
        }
    }

    pub fn into_response(self) -> ApiResponse {
        ApiResponse::json(self.status_code(), &ErrorBody::new(self.messages()))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            token_err if token_err.is_token_error() => Self::Token(token_err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound {
                entity: "Product", ..
            } => Self::product_not_found(),
            StoreError::NotFound { entity: "User", .. } => Self::Unauthenticated,
            StoreError::NotFound { .. } => Self::Internal(err.to_string()),
            StoreError::DuplicateEmail(_) => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<RouterError> for ApiError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::NotFound(_) => Self::NotFound("Not Found".to_string()),
            RouterError::MethodNotAllowed { .. } => Self::MethodNotAllowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_keeps_order() {
        let response = ApiError::Validation(vec![
            "Name is required field".into(),
            "Image_url is required field".into(),
        ])
        .into_response();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json_body().unwrap(),
            json!({ "errors": [
                { "message": "Name is required field" },
                { "message": "Image_url is required field" }
            ]})
        );
    }

    #[test]
    fn test_malformed_token_is_500() {
        let err: ApiError = AuthError::MalformedToken.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.messages(), ["jwt malformed"]);
    }

    #[test]
    fn test_non_token_auth_failures_are_internal() {
        let err: ApiError = AuthError::TokenIssue("exp overflow".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(err.messages(), ["Internal Server Error"]);
    }

    #[test]
    fn test_product_not_found_from_store() {
        let err: ApiError = StoreError::product_not_found(2987).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.messages(), [PRODUCT_NOT_FOUND]);
    }

    #[test]
    fn test_internal_detail_not_exposed() {
        let err = ApiError::Internal("argon2 exploded".into());
        assert_eq!(err.messages(), ["Internal Server Error"]);
    }

    #[test]
    fn test_router_errors() {
        let err: ApiError = RouterError::NotFound("/nope".into()).into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.messages(), ["Not Found"]);

        let err: ApiError = RouterError::MethodNotAllowed {
            method: "PUT".into(),
            path: "/products".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
