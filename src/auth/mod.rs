//! Authentication module
//!
//! Provides password hashing for the login endpoint and JWT access tokens
//! for the product endpoints.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

pub mod jwt;
pub mod password;

/// Authentication errors
///
/// The token variants display the message returned to clients, so keep
/// them short and free of token contents.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("jwt must be provided")]
    MissingToken,

    #[error("jwt malformed")]
    MalformedToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("jwt expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Failed to issue token: {0}")]
    TokenIssue(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl AuthError {
    /// Whether the error came from inspecting a presented token
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            Self::MissingToken
                | Self::MalformedToken
                | Self::InvalidSignature
                | Self::TokenExpired
                | Self::InvalidToken(_)
        )
    }
}

/// The authenticated caller
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
}

/// Authenticator trait
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate a request
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;
}

/// Authentication request context
#[derive(Debug, Default)]
pub struct AuthRequest {
    /// Header names are lowercase
    pub headers: HashMap<String, String>,
    pub method: String,
    pub path: String,
}

impl AuthRequest {
    /// Build a context from a method, path and header list
    pub fn new<'a, I>(method: &str, path: &str, headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    /// Header lookup by lowercase name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_request_lowercases_headers() {
        let request = AuthRequest::new("GET", "/products", [("Access_Token", "abc")]);
        assert_eq!(request.header("access_token"), Some("abc"));
        assert_eq!(request.header("Access_Token"), None);
    }

    #[test]
    fn test_token_error_messages() {
        assert_eq!(AuthError::MalformedToken.to_string(), "jwt malformed");
        assert_eq!(AuthError::MissingToken.to_string(), "jwt must be provided");
        assert!(AuthError::TokenExpired.is_token_error());
        assert!(!AuthError::InvalidCredentials.is_token_error());
    }
}
