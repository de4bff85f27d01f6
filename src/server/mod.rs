//! HTTP server module
//!
//! Accepts connections with `hyper` on `tokio`, buffers each request and
//! hands it to [`crate::handlers::dispatch`].
//!
//! # Example
//!
//! ```no_run
//! use product_api::{config::Config, server::Server};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("config.yaml")?;
//! let server = Server::new(config).await?;
//! println!("listening on {}", server.local_addr());
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::handlers::{dispatch, ApiError, ApiRequest, ApiResponse};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info, warn, Instrument};

pub mod state;

use state::AppState;

pub const BODY_TOO_LARGE: &str = "Request body too large";

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(String),

    #[error("Startup failed: {0}")]
    Startup(String),
}

/// HTTP Server
///
/// Binds on construction, so `local_addr` reports the real port when the
/// configured one is 0.
pub struct Server {
    state: Arc<AppState>,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Server {
    /// Build state from configuration (seeding users) and bind
    pub async fn new(config: Config) -> Result<Self, ServerError> {
        let addr = config
            .server
            .socket_addr()
            .map_err(|e| ServerError::BindError(e.to_string()))?;
        let state = AppState::from_config(&config).await?;
        Self::bind(addr, state).await
    }

    /// Bind with an already built state
    pub async fn bind(addr: SocketAddr, state: AppState) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("Failed to bind to {}: {}", addr, e)))?;

        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::BindError(format!("Failed to get local address: {}", e)))?;

        info!("Server bound to {}", local_addr);

        Ok(Self {
            state: Arc::new(state),
            listener,
            local_addr,
        })
    }

    /// Address the server is listening on
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run until Ctrl-C
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .await
    }

    /// Run until `shutdown` resolves
    ///
    /// Stops accepting new connections once the signal fires; connections
    /// already being served finish on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        info!("Starting server on {}", self.local_addr);
        tokio::pin!(shutdown);

        loop {
            let (stream, peer_addr) = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down server");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        continue;
                    }
                },
            };

            let state = Arc::clone(&self.state);

            tokio::spawn(async move {
                let io = TokioIo::new(stream);

                let service = service_fn(move |req| {
                    let state = Arc::clone(&state);
                    async move { handle_request(req, state).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection from {}: {}", peer_addr, e);
                }
            });
        }
    }
}

/// Buffer a hyper request, dispatch it, and convert the response
async fn handle_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http.request",
        http.method = %method,
        http.target = %path,
        http.status_code = tracing::field::Empty,
    );

    async move {
        let mut headers = HashMap::new();
        for (name, value) in req.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_string(), v.to_string());
            }
        }

        let response = match Limited::new(req.into_body(), state.max_body_bytes)
            .collect()
            .await
        {
            Ok(collected) => {
                let request = ApiRequest {
                    method,
                    path,
                    headers,
                    body: collected.to_bytes(),
                };
                dispatch(&state, request).await
            }
            Err(e) if e.is::<LengthLimitError>() => {
                warn!(limit = state.max_body_bytes, "request body too large");
                ApiError::BadRequest(BODY_TOO_LARGE.to_string()).into_response()
            }
            Err(e) => {
                error!("Failed to read request body: {}", e);
                ApiError::BadRequest("Failed to read request body".to_string()).into_response()
            }
        };

        tracing::Span::current().record("http.status_code", response.status.as_u16());
        info!(status = response.status.as_u16(), "request handled");

        Ok(into_hyper(response))
    }
    .instrument(span)
    .await
}

fn into_hyper(response: ApiResponse) -> Response<Full<Bytes>> {
    let mut hyper_response = Response::new(Full::new(response.body));
    *hyper_response.status_mut() = response.status;
    hyper_response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(response.content_type));
    hyper_response
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::StatusCode;
    use crate::config::{AuthConfig, LoggingConfig, MetricsConfig, SeedUser, ServerConfig};

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                address: "127.0.0.1:0".into(),
                ..Default::default()
            },
            auth: AuthConfig::with_secret("server-test-secret"),
            users: vec![],
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[tokio::test]
    async fn test_server_new_binds_ephemeral_port() {
        let server = Server::new(test_config()).await.unwrap();
        assert_ne!(server.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_server_invalid_address() {
        let mut config = test_config();
        config.server.address = "invalid".into();
        let result = Server::new(config).await;
        assert!(matches!(result, Err(ServerError::BindError(_))));
    }

    #[tokio::test]
    async fn test_bad_seed_hash_fails_startup() {
        let mut config = test_config();
        config.users = vec![SeedUser {
            email: "a@mail.com".into(),
            password: None,
            password_hash: Some("plaintext".into()),
        }];
        let result = Server::new(config).await;
        assert!(matches!(result, Err(ServerError::Startup(_))));
    }

    #[tokio::test]
    async fn test_run_until_stops_on_signal() {
        let server = Server::new(test_config()).await.unwrap();
        let result = server.run_until(async {}).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_into_hyper_sets_content_type() {
        let response = into_hyper(ApiResponse::text(StatusCode::OK, "text/plain", "ok"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }
}
