//! Persistence
//!
//! Repositories for users and products. Every product query is scoped to
//! an owner, so a product owned by someone else is indistinguishable from
//! one that does not exist.

use crate::product::{NewProduct, Product, ProductChanges};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

mod memory;

pub use memory::InMemoryStore;

/// Store errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),
}

impl StoreError {
    pub fn product_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "Product",
            id,
        }
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Emails are unique, compared case-insensitively.
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_user(&self, id: i64) -> Option<User>;

    async fn find_user_by_email(&self, email: &str) -> Option<User>;
}

/// Product persistence, scoped by owner
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Create a product for an existing user
    async fn create_product(&self, owner: i64, product: NewProduct)
        -> Result<Product, StoreError>;

    /// All products of an owner, ascending by id
    async fn list_products(&self, owner: i64) -> Vec<Product>;

    async fn find_product(&self, owner: i64, id: i64) -> Result<Product, StoreError>;

    async fn update_product(
        &self,
        owner: i64,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Product, StoreError>;

    /// Remove a product and return it
    async fn delete_product(&self, owner: i64, id: i64) -> Result<Product, StoreError>;
}

/// Both repositories behind one handle
pub trait Store: UserRepository + ProductRepository {}

impl<T: UserRepository + ProductRepository> Store for T {}
