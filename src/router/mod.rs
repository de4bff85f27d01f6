//! API Router
//!
//! Parses an incoming method and path into an [`ApiRoute`].

use hyper::Method;
use thiserror::Error;

/// Router errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouterError {
    #[error("No route for path: {0}")]
    NotFound(String),

    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed { method: String, path: String },
}

/// API operations
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRoute {
    /// GET /health
    Health,
    /// GET /metrics
    Metrics,
    /// POST /users/login
    Login,
    /// GET /products
    ListProducts,
    /// POST /products
    CreateProduct,
    /// GET /products/{id}
    GetProduct { id: String },
    /// PATCH /products/{id}
    UpdateProduct { id: String },
    /// DELETE /products/{id}
    DeleteProduct { id: String },
}

impl ApiRoute {
    /// Parse a request into a route
    ///
    /// The item id is kept as the raw path segment; resolving it (and
    /// rejecting non-numeric ids) is up to the product handlers.
    pub fn parse(method: &Method, path: &str) -> Result<Self, RouterError> {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.trim_start_matches('/').split('/').collect();

        let not_allowed = || RouterError::MethodNotAllowed {
            method: method.to_string(),
            path: path.to_string(),
        };

        match segments.as_slice() {
            ["health"] => match *method {
                Method::GET => Ok(Self::Health),
                _ => Err(not_allowed()),
            },
            ["metrics"] => match *method {
                Method::GET => Ok(Self::Metrics),
                _ => Err(not_allowed()),
            },
            ["users", "login"] => match *method {
                Method::POST => Ok(Self::Login),
                _ => Err(not_allowed()),
            },
            ["products"] => match *method {
                Method::GET => Ok(Self::ListProducts),
                Method::POST => Ok(Self::CreateProduct),
                _ => Err(not_allowed()),
            },
            ["products", id] if !id.is_empty() => {
                let id = id.to_string();
                match *method {
                    Method::GET => Ok(Self::GetProduct { id }),
                    Method::PATCH => Ok(Self::UpdateProduct { id }),
                    Method::DELETE => Ok(Self::DeleteProduct { id }),
                    _ => Err(not_allowed()),
                }
            }
            _ => Err(RouterError::NotFound(path.to_string())),
        }
    }

    /// Stable label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Metrics => "metrics",
            Self::Login => "users.login",
            Self::ListProducts => "products.list",
            Self::CreateProduct => "products.create",
            Self::GetProduct { .. } => "products.get",
            Self::UpdateProduct { .. } => "products.update",
            Self::DeleteProduct { .. } => "products.delete",
        }
    }

    /// Whether the route needs an access token
    pub fn requires_token(&self) -> bool {
        !matches!(self, Self::Health | Self::Metrics | Self::Login)
    }
}
