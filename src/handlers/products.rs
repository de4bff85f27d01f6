//! Product endpoints
//!
//! Handlers receive the caller already resolved by [`authenticate`] and
//! scope store access to it. A product owned by someone else answers 404,
//! same as a missing one.

use super::{ApiError, ApiRequest, ApiResponse};
use crate::auth::{Authenticator, Identity};
use crate::metrics;
use crate::product::validation::{validate_changes, validate_new};
use crate::product::Product;
use crate::server::state::AppState;
use crate::store::{ProductRepository, UserRepository};
use hyper::StatusCode;
use serde::Serialize;
use tracing::{info, warn};

pub const UPDATED: &str = "Data successfully updated";
pub const DELETED: &str = "Data successfully deleted";

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

/// Resolve the caller from the access token
pub async fn authenticate(state: &AppState, request: &ApiRequest) -> Result<Identity, ApiError> {
    let identity = match state
        .authenticator
        .authenticate(&request.auth_request())
        .await
    {
        Ok(identity) => identity,
        Err(err) => {
            warn!(
                path = %request.path,
                header = state.authenticator.header_name(),
                reason = %err,
                "access token rejected"
            );
            metrics::record_auth_attempt("token", false);
            return Err(err.into());
        }
    };

    if state.store.find_user(identity.user_id).await.is_none() {
        warn!(user_id = identity.user_id, "token refers to unknown user");
        metrics::record_auth_attempt("token", false);
        return Err(ApiError::Unauthenticated);
    }

    metrics::record_auth_attempt("token", true);
    Ok(identity)
}

fn parse_product_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::product_not_found())
}

/// `POST /products`
pub async fn create(
    state: &AppState,
    identity: &Identity,
    request: &ApiRequest,
) -> Result<ApiResponse, ApiError> {
    let payload = request.json_object()?;
    let new_product = validate_new(&payload).map_err(ApiError::Validation)?;

    let product = state
        .store
        .create_product(identity.user_id, new_product)
        .await?;

    metrics::record_product_operation("create");
    info!(
        user_id = identity.user_id,
        product_id = product.id,
        "product created"
    );

    Ok(ApiResponse::json(StatusCode::CREATED, &product))
}

/// `GET /products`
pub async fn list(state: &AppState, identity: &Identity) -> Result<ApiResponse, ApiError> {
    let products = state.store.list_products(identity.user_id).await;

    Ok(ApiResponse::json(StatusCode::OK, &ProductList { products }))
}

/// `GET /products/{id}`
pub async fn get(
    state: &AppState,
    identity: &Identity,
    raw_id: &str,
) -> Result<ApiResponse, ApiError> {
    let id = parse_product_id(raw_id)?;
    let product = state.store.find_product(identity.user_id, id).await?;

    Ok(ApiResponse::json(StatusCode::OK, &product))
}

/// `PATCH /products/{id}`
pub async fn update(
    state: &AppState,
    identity: &Identity,
    request: &ApiRequest,
    raw_id: &str,
) -> Result<ApiResponse, ApiError> {
    let id = parse_product_id(raw_id)?;

    // Existence is checked before the payload.
    state.store.find_product(identity.user_id, id).await?;

    let payload = request.json_object()?;
    let changes = validate_changes(&payload).map_err(ApiError::Validation)?;

    if !changes.is_empty() {
        state
            .store
            .update_product(identity.user_id, id, changes)
            .await?;
        metrics::record_product_operation("update");
        info!(user_id = identity.user_id, product_id = id, "product updated");
    }

    Ok(ApiResponse::message(StatusCode::OK, UPDATED))
}

/// `DELETE /products/{id}`
pub async fn delete(
    state: &AppState,
    identity: &Identity,
    raw_id: &str,
) -> Result<ApiResponse, ApiError> {
    let id = parse_product_id(raw_id)?;

    state.store.delete_product(identity.user_id, id).await?;

    metrics::record_product_operation("delete");
    info!(user_id = identity.user_id, product_id = id, "product deleted");

    Ok(ApiResponse::message(StatusCode::OK, DELETED))
}
