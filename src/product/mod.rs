//! Product model
//!
//! [`Product`] is the persisted record. [`NewProduct`] and
//! [`ProductChanges`] are the validated inputs produced by
//! [`validation`] from request payloads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Number;

pub mod validation;

/// A product owned by a user
///
/// Serializes to `{ id, name, image_url, price, userId }`. The price is
/// kept as the JSON number the client sent, so `20000` stays an integer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub image_url: String,
    pub price: Number,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Apply a validated partial update
    pub fn apply(&mut self, changes: ProductChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(image_url) = changes.image_url {
            self.image_url = image_url;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        self.updated_at = Utc::now();
    }
}

/// Validated input for creating a product
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub image_url: String,
    pub price: Number,
}

/// Validated partial update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Number>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image_url.is_none() && self.price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Product {
        let now = Utc::now();
        Product {
            id: 4,
            name: "orange fruit".into(),
            image_url: "https://google.com".into(),
            price: Number::from(20000),
            user_id: 9,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["id", "image_url", "name", "price", "userId"]);
        assert_eq!(value["userId"], json!(9));
        assert_eq!(value["price"], json!(20000));
    }

    #[test]
    fn test_apply_partial_update() {
        let mut product = sample();
        product.apply(ProductChanges {
            price: Some(Number::from(40000)),
            ..Default::default()
        });
        assert_eq!(product.price, Number::from(40000));
        assert_eq!(product.name, "orange fruit");
        assert!(product.updated_at >= product.created_at);
    }

    #[test]
    fn test_price_serialized_as_sent() {
        let mut product = sample();
        let text = serde_json::to_string(&product).unwrap();
        assert!(text.contains(r#""price":20000,"#), "{text}");

        product.price = serde_json::from_str("19.5").unwrap();
        assert_eq!(serde_json::to_value(&product).unwrap()["price"], json!(19.5));

        product.price = Number::from(9_007_199_254_740_993_u64);
        assert_eq!(
            serde_json::to_value(&product).unwrap()["price"],
            json!(9_007_199_254_740_993_u64)
        );
    }
}
