//! Common Integration Test Infrastructure
//!
//! Every test gets its own server and store, so tests never share rows.
//! - Test server management
//! - Login and request helpers
//! - Token generation for failure cases

#![allow(dead_code)]

use product_api::config::{
    AuthConfig, Config, LoggingConfig, MetricsConfig, SeedUser, ServerConfig,
};
use product_api::server::Server;
use serde_json::Value;
use std::net::SocketAddr;
use std::time::Duration;

/// JWT secret for test tokens
pub const JWT_SECRET: &str = "integration-test-secret-key";

/// Seeded user credentials
pub const USER_EMAIL: &str = "testing@mail.com";
pub const USER_PASSWORD: &str = "123456789";

/// Second user, for ownership checks
pub const OTHER_EMAIL: &str = "other@mail.com";
pub const OTHER_PASSWORD: &str = "987654321";

/// A running server plus an HTTP client
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    _server_handle: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Start a server with the default seeded users
    pub async fn spawn() -> Self {
        Self::with_config(Self::default_config()).await
    }

    /// Start a server with a custom configuration
    pub async fn with_config(config: Config) -> Self {
        let server = Server::new(config)
            .await
            .expect("test server should start");
        let addr = server.local_addr();

        let server_handle = tokio::spawn(async move {
            let _ = server.run_until(std::future::pending()).await;
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("client should build");

        Self {
            addr,
            client,
            _server_handle: server_handle,
        }
    }

    pub fn default_config() -> Config {
        Config {
            server: ServerConfig {
                address: "127.0.0.1:0".into(),
                ..Default::default()
            },
            auth: AuthConfig::with_secret(JWT_SECRET),
            users: vec![
                SeedUser::with_password(USER_EMAIL, USER_PASSWORD),
                SeedUser::with_password(OTHER_EMAIL, OTHER_PASSWORD),
            ],
            metrics: MetricsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST /users/login with an arbitrary body
    pub async fn login_raw(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/users/login"))
            .json(body)
            .send()
            .await
            .expect("login request should be sent")
    }

    /// Log in and return `(user id, token)`
    pub async fn login(&self, email: &str, password: &str) -> (i64, String) {
        let response = self
            .login_raw(&serde_json::json!({ "email": email, "password": password }))
            .await;
        assert_eq!(response.status(), 200, "login should succeed");

        let body: Value = response.json().await.expect("login body is JSON");
        let id = body["id"].as_i64().expect("login body has numeric id");
        let token = body["token"]
            .as_str()
            .expect("login body has a token")
            .to_string();
        (id, token)
    }

    /// Log in as the default seeded user
    pub async fn login_default(&self) -> (i64, String) {
        self.login(USER_EMAIL, USER_PASSWORD).await
    }

    /// Send a request with an `access_token` header and optional JSON body
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> reqwest::Response {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = token {
            request = request.header("access_token", token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.expect("request should be sent")
    }

    /// Create a product and return its JSON
    pub async fn create_product(&self, token: &str, product: &Value) -> Value {
        let response = self
            .send(reqwest::Method::POST, "/products", Some(token), Some(product))
            .await;
        assert_eq!(response.status(), 201, "product should be created");
        response.json().await.expect("product body is JSON")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._server_handle.abort();
    }
}

/// Sign a token with arbitrary claims and secret
pub fn sign_token(secret: &str, user_id: i64, exp_offset_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp();
    let claims = serde_json::json!({
        "sub": user_id.to_string(),
        "id": user_id,
        "email": USER_EMAIL,
        "iat": now,
        "exp": now + exp_offset_secs,
    });

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token should sign")
}
