//! JWT access tokens
//!
//! Tokens are HS256-signed and carried in a custom request header
//! (`access_token` unless configured otherwise), not `Authorization`.

use super::{AuthError, AuthRequest, Authenticator, Identity};
use crate::config::AuthConfig;
use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub id: i64,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

/// Issues and verifies access tokens
///
/// # Example
///
/// ```
/// use product_api::auth::jwt::JwtAuthenticator;
///
/// let auth = JwtAuthenticator::new_hs256("my-secret").with_header("x-token");
/// let token = auth.issue(1, "someone@example.com").unwrap();
/// let claims = auth.verify(&token).unwrap();
/// assert_eq!(claims.id, 1);
/// ```
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    header_name: String,
    ttl_secs: u64,
}

impl JwtAuthenticator {
    /// Create a new JWT authenticator with a secret key (HS256)
    pub fn new_hs256(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            header_name: "access_token".to_string(),
            ttl_secs: 86400,
        }
    }

    /// Build from the `auth` section of the configuration
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new_hs256(&config.jwt_secret)
            .with_header(&config.token_header)
            .with_ttl_secs(config.token_ttl_secs)
    }

    /// Set the request header the token is read from
    #[must_use]
    pub fn with_header(mut self, name: &str) -> Self {
        self.header_name = name.to_lowercase();
        self
    }

    /// Set the lifetime of issued tokens
    #[must_use]
    pub fn with_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Name of the header carrying the token
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Issue a signed token for a user
    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp().max(0) as usize;
        let exp = usize::try_from(self.ttl_secs)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| {
                AuthError::TokenIssue(format!("token ttl of {}s overflows exp", self.ttl_secs))
            })?;
        let claims = Claims {
            sub: user_id.to_string(),
            id: user_id,
            email: email.to_string(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenIssue(e.to_string()))
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => AuthError::MalformedToken,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    fn extract_token<'a>(&self, request: &'a AuthRequest) -> Option<&'a str> {
        request
            .header(&self.header_name)
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let token = self.extract_token(request).ok_or(AuthError::MissingToken)?;
        let claims = self.verify(token)?;

        tracing::debug!(user_id = claims.id, "access token accepted");

        Ok(Identity {
            user_id: claims.id,
            email: claims.email,
        })
    }
}
