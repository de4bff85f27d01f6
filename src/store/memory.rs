//! In-process store
//!
//! Products live in a [`DashMap`] keyed by id; users are few and sit in a
//! `parking_lot` lock. Ids come from atomic sequences starting at 1 and are
//! never reused.

use super::{ProductRepository, StoreError, User, UserRepository};
use crate::product::{NewProduct, Product, ProductChanges};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory implementation of both repositories
#[derive(Debug)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    products: DashMap<i64, Product>,
    next_user_id: AtomicI64,
    next_product_id: AtomicI64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            products: DashMap::new(),
            next_user_id: AtomicI64::new(1),
            next_product_id: AtomicI64::new(1),
        }
    }

    fn user_exists(&self, id: i64) -> bool {
        self.users.read().iter().any(|u| u.id == id)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
            return Err(StoreError::DuplicateEmail(email.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: self.next_user_id.fetch_add(1, Ordering::Relaxed),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> Option<User> {
        self.users.read().iter().find(|u| u.id == id).cloned()
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn create_product(
        &self,
        owner: i64,
        product: NewProduct,
    ) -> Result<Product, StoreError> {
        if !self.user_exists(owner) {
            return Err(StoreError::NotFound {
                entity: "User",
                id: owner,
            });
        }

        let now = Utc::now();
        let product = Product {
            id: self.next_product_id.fetch_add(1, Ordering::Relaxed),
            name: product.name,
            image_url: product.image_url,
            price: product.price,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn list_products(&self, owner: i64) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|entry| entry.user_id == owner)
            .map(|entry| entry.value().clone())
            .collect();
        products.sort_by_key(|p| p.id);
        products
    }

    async fn find_product(&self, owner: i64, id: i64) -> Result<Product, StoreError> {
        self.products
            .get(&id)
            .filter(|entry| entry.user_id == owner)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::product_not_found(id))
    }

    async fn update_product(
        &self,
        owner: i64,
        id: i64,
        changes: ProductChanges,
    ) -> Result<Product, StoreError> {
        match self.products.get_mut(&id) {
            Some(mut entry) if entry.user_id == owner => {
                entry.apply(changes);
                Ok(entry.value().clone())
            }
            _ => Err(StoreError::product_not_found(id)),
        }
    }

    async fn delete_product(&self, owner: i64, id: i64) -> Result<Product, StoreError> {
        self.products
            .remove_if(&id, |_, product| product.user_id == owner)
            .map(|(_, product)| product)
            .ok_or(StoreError::product_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orange() -> NewProduct {
        NewProduct {
            name: "orange fruit".into(),
            image_url: "https://google.com".into(),
            price: 20000.into(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryStore::new();
        store.insert_user("testing@mail.com", "h").await.unwrap();
        let err = store.insert_user("TESTING@mail.com", "h").await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail("TESTING@mail.com".into()));
    }

    #[tokio::test]
    async fn test_find_user_by_email_ignores_case() {
        let store = InMemoryStore::new();
        let user = store.insert_user("testing@mail.com", "h").await.unwrap();
        let found = store.find_user_by_email("Testing@Mail.com").await.unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_user_by_email("other@mail.com").await.is_none());
    }

    #[tokio::test]
    async fn test_product_requires_existing_owner() {
        let store = InMemoryStore::new();
        let err = store.create_product(42, orange()).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                entity: "User",
                id: 42
            }
        );
    }

    #[tokio::test]
    async fn test_products_are_scoped_to_owner() {
        let store = InMemoryStore::new();
        let alice = store.insert_user("alice@mail.com", "h").await.unwrap();
        let bob = store.insert_user("bob@mail.com", "h").await.unwrap();

        let product = store.create_product(alice.id, orange()).await.unwrap();

        assert_eq!(store.list_products(alice.id).await, vec![product.clone()]);
        assert!(store.list_products(bob.id).await.is_empty());
        assert!(store.find_product(bob.id, product.id).await.is_err());
        assert!(store
            .update_product(bob.id, product.id, ProductChanges::default())
            .await
            .is_err());
        assert!(store.delete_product(bob.id, product.id).await.is_err());
        assert_eq!(store.find_product(alice.id, product.id).await, Ok(product));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let store = InMemoryStore::new();
        let user = store.insert_user("a@mail.com", "h").await.unwrap();

        let first = store.create_product(user.id, orange()).await.unwrap();
        store.delete_product(user.id, first.id).await.unwrap();
        let second = store.create_product(user.id, orange()).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_update_then_find() {
        let store = InMemoryStore::new();
        let user = store.insert_user("a@mail.com", "h").await.unwrap();
        let product = store.create_product(user.id, orange()).await.unwrap();

        store
            .update_product(
                user.id,
                product.id,
                ProductChanges {
                    name: Some("red orange fruits".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let found = store.find_product(user.id, product.id).await.unwrap();
        assert_eq!(found.name, "red orange fruits");
        assert_eq!(found.price, serde_json::Number::from(20000));
    }

    #[test]
    fn test_usable_as_dyn_store() {
        let store: std::sync::Arc<dyn crate::store::Store> =
            std::sync::Arc::new(InMemoryStore::new());
        let user = tokio_test::block_on(store.insert_user("a@mail.com", "h")).unwrap();
        let found = tokio_test::block_on(store.find_user(user.id)).unwrap();
        assert_eq!(found.email, "a@mail.com");
        assert!(tokio_test::block_on(store.list_products(user.id)).is_empty());
    }

    #[tokio::test]
    async fn test_list_sorted_by_id() {
        let store = InMemoryStore::new();
        let user = store.insert_user("a@mail.com", "h").await.unwrap();
        for _ in 0..5 {
            store.create_product(user.id, orange()).await.unwrap();
        }
        let ids: Vec<i64> = store
            .list_products(user.id)
            .await
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, [1, 2, 3, 4, 5]);
    }
}
