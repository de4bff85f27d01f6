//! Shared application state

use crate::auth::jwt::JwtAuthenticator;
use crate::auth::password::{PasswordHasherService, PasswordPolicy};
use crate::config::{Config, SeedUser};
use crate::server::ServerError;
use crate::store::{InMemoryStore, Store, UserRepository};
use std::sync::Arc;
use tracing::info;

/// State shared by every connection
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub authenticator: JwtAuthenticator,
    pub hasher: PasswordHasherService,
    pub metrics_enabled: bool,
    /// Request bodies above this size are rejected
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, authenticator: JwtAuthenticator) -> Self {
        Self {
            store,
            authenticator,
            hasher: PasswordHasherService::default(),
            metrics_enabled: true,
            max_body_bytes: 1024 * 1024,
        }
    }

    #[must_use]
    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.hasher = PasswordHasherService::new(policy);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Build an in-memory state from configuration and seed its users
    pub async fn from_config(config: &Config) -> Result<Self, ServerError> {
        let state = Self::new(
            Arc::new(InMemoryStore::new()),
            JwtAuthenticator::from_config(&config.auth),
        )
        .with_metrics(config.metrics.enabled)
        .with_max_body_bytes(config.server.max_body_bytes);

        state.seed_users(&config.users).await?;
        Ok(state)
    }

    /// Insert seed users, hashing plaintext passwords
    pub async fn seed_users(&self, users: &[SeedUser]) -> Result<(), ServerError> {
        for user in users {
            let hash = match (&user.password, &user.password_hash) {
                (_, Some(hash)) => {
                    if !PasswordHasherService::is_hash(hash) {
                        return Err(ServerError::Startup(format!(
                            "password_hash for '{}' is not a PHC string",
                            user.email
                        )));
                    }
                    hash.clone()
                }
                (Some(password), None) => self
                    .hasher
                    .hash(password)
                    .map_err(|e| ServerError::Startup(e.to_string()))?,
                (None, None) => {
                    return Err(ServerError::Startup(format!(
                        "seed user '{}' has no password",
                        user.email
                    )))
                }
            };

            let created = self
                .store
                .insert_user(&user.email, &hash)
                .await
                .map_err(|e| ServerError::Startup(e.to_string()))?;
            info!(user_id = created.id, email = %created.email, "seeded user");
        }

        Ok(())
    }
}
