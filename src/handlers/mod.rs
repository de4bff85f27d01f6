//! Request handlers
//!
//! [`dispatch`] routes a buffered request to its handler and renders the
//! result, so handlers can be exercised without a socket.

use crate::auth::{AuthError, AuthRequest};
use crate::metrics;
use crate::router::ApiRoute;
use crate::server::state::AppState;
use bytes::Bytes;
use hyper::{Method, StatusCode};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{error, warn};

pub mod auth;
pub mod error;
pub mod products;
pub mod response;

pub use error::ApiError;
pub use response::ApiResponse;

/// A buffered HTTP request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Header names are lowercase
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HashMap::new(),
            body: Bytes::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn json(mut self, value: &Value) -> Self {
        self.body = Bytes::from(value.to_string());
        self
    }

    /// Context handed to the authenticator
    pub fn auth_request(&self) -> AuthRequest {
        AuthRequest {
            headers: self.headers.clone(),
            method: self.method.to_string(),
            path: self.path.clone(),
        }
    }

    /// Parse the body as a JSON object; an empty body is `{}`
    pub fn json_object(&self) -> Result<Map<String, Value>, ApiError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(ApiError::BadRequest(
                "Request body must be valid JSON".to_string(),
            )),
        }
    }
}

/// Route and handle a request
pub async fn dispatch(state: &AppState, request: ApiRequest) -> ApiResponse {
    let started = Instant::now();

    let (label, result) = match ApiRoute::parse(&request.method, &request.path) {
        Ok(route) => (route.label(), handle(state, &route, &request).await),
        Err(e) => ("unmatched", Err(e.into())),
    };

    let response = match result {
        Ok(response) => response,
        Err(err) => {
            if err.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
                error!(route = label, error = %err, "request failed");
            } else {
                warn!(route = label, error = %err, "request rejected");
            }
            err.into_response()
        }
    };

    metrics::record_request(
        label,
        response.status.as_u16(),
        started.elapsed().as_secs_f64(),
    );

    response
}

async fn handle(
    state: &AppState,
    route: &ApiRoute,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError> {
    let identity = if route.requires_token() {
        Some(products::authenticate(state, request).await?)
    } else {
        None
    };

    match (route, identity.as_ref()) {
        (ApiRoute::Health, _) => Ok(ApiResponse::text(StatusCode::OK, "text/plain", "ok")),
        (ApiRoute::Metrics, _) => {
            if !state.metrics_enabled {
                return Err(ApiError::NotFound("Not Found".to_string()));
            }
            let text =
                metrics::gather_text().map_err(|e| ApiError::Internal(e.to_string()))?;
            Ok(ApiResponse::text(
                StatusCode::OK,
                "text/plain; version=0.0.4",
                text,
            ))
        }
        (ApiRoute::Login, _) => auth::login(state, request).await,
        (ApiRoute::ListProducts, Some(caller)) => products::list(state, caller).await,
        (ApiRoute::CreateProduct, Some(caller)) => {
            products::create(state, caller, request).await
        }
        (ApiRoute::GetProduct { id }, Some(caller)) => products::get(state, caller, id).await,
        (ApiRoute::UpdateProduct { id }, Some(caller)) => {
            products::update(state, caller, request, id).await
        }
        (ApiRoute::DeleteProduct { id }, Some(caller)) => {
            products::delete(state, caller, id).await
        }
        // A product route reached without a resolved caller
        (_, None) => Err(ApiError::Token(AuthError::MissingToken.to_string())),
    }
}
