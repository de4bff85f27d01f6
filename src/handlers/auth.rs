//! Login endpoint

use super::{ApiError, ApiRequest, ApiResponse};
use crate::auth::AuthError;
use crate::metrics;
use crate::server::state::AppState;
use crate::store::UserRepository;
use hyper::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

pub const EMAIL_REQUIRED: &str = "Email is required field";
pub const PASSWORD_REQUIRED: &str = "Password is required field";

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// `POST /users/login`
pub async fn login(state: &AppState, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
    let payload = request.json_object()?;

    let email = non_empty_str(payload.get("email"));
    let password = non_empty_str(payload.get("password"));

    let (email, password) = match (email, password) {
        (Some(email), Some(password)) => (email, password),
        (email, password) => {
            let mut errors = Vec::new();
            if email.is_none() {
                errors.push(EMAIL_REQUIRED.to_string());
            }
            if password.is_none() {
                errors.push(PASSWORD_REQUIRED.to_string());
            }
            return Err(ApiError::Validation(errors));
        }
    };

    let Some(user) = state.store.find_user_by_email(email).await else {
        warn!("login failed: unknown email");
        metrics::record_auth_attempt("login", false);
        return Err(ApiError::InvalidCredentials);
    };

    // Argon2 verification blocks.
    let hasher = state.hasher.clone();
    let password = password.to_string();
    let stored_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if let Err(err) = verified {
        warn!(user_id = user.id, "login failed: password mismatch");
        metrics::record_auth_attempt("login", false);
        return Err(match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            other => other.into(),
        });
    }

    let token = state.authenticator.issue(user.id, &user.email)?;
    metrics::record_auth_attempt("login", true);
    info!(user_id = user.id, "user logged in");

    Ok(ApiResponse::json(
        StatusCode::OK,
        &LoginResponse {
            id: user.id,
            email: user.email,
            token,
        },
    ))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
