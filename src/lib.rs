//! Product API Library
//!
//! Authenticated product catalogue REST API.
//!
//! # Endpoints
//!
//! - `POST /users/login` exchanges email and password for an access token
//! - `GET|POST /products` lists or creates the caller's products
//! - `GET|PATCH|DELETE /products/{id}` reads, updates or deletes one product
//! - `GET /health` and `GET /metrics`
//!
//! Product endpoints read the token from the `access_token` header.
//!
//! # Example
//!
//! ```no_run
//! use product_api::{config::Config, server::Server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let server = Server::new(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod product;
pub mod router;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use server::Server;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
