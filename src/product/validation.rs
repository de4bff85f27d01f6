//! Product payload validation
//!
//! Fields are checked in a fixed order (name, image_url, price) and every
//! violation is collected, so a payload missing all three fields yields
//! three messages in that order.

use super::{NewProduct, ProductChanges};
use serde_json::{Map, Number, Value};

pub const NAME_REQUIRED: &str = "Name is required field";
pub const NAME_NOT_STRING: &str = "Name must be a string";
pub const IMAGE_URL_REQUIRED: &str = "Image_url is required field";
pub const IMAGE_URL_NOT_STRING: &str = "Image_url must be a string";
pub const IMAGE_URL_NOT_URL: &str = "this field must be url like";
pub const PRICE_REQUIRED: &str = "Price is required field";
pub const PRICE_NOT_NUMBER: &str = "Price must be a number";
pub const PRICE_NOT_POSITIVE: &str = "Price must be greater than 0";

lazy_static::lazy_static! {
    // Optional scheme, optional userinfo, a dotted host with an alphabetic
    // TLD or an IPv4 literal, optional port, optional path/query/fragment.
    static ref URL_PATTERN: regex_lite::Regex = regex_lite::Regex::new(
        r"^(?:(?:https?|ftp)://)?(?:[^\s:@/]+(?::[^\s@/]*)?@)?(?:(?:\d{1,3}\.){3}\d{1,3}|(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63})(?::\d{1,5})?(?:[/?#]\S*)?$"
    )
    .expect("url pattern is a valid regex");
}

/// Whether a string is shaped like a URL (`https://google.com`,
/// `facebook.com/page`, `http://10.0.0.1:8080/x.png`)
pub fn is_url_like(value: &str) -> bool {
    if value.len() > 2083 {
        return false;
    }
    URL_PATTERN.is_match(value)
}

/// Validate a creation payload. Absent and `null` fields are both missing.
pub fn validate_new(payload: &Map<String, Value>) -> Result<NewProduct, Vec<String>> {
    let mut errors = Vec::new();

    let name = required(payload.get("name"), NAME_REQUIRED, &mut errors)
        .and_then(|v| name_field(v, &mut errors));
    let image_url = required(payload.get("image_url"), IMAGE_URL_REQUIRED, &mut errors)
        .and_then(|v| image_url_field(v, &mut errors));
    let price = required(payload.get("price"), PRICE_REQUIRED, &mut errors)
        .and_then(|v| price_field(v, &mut errors));

    match (name, image_url, price) {
        (Some(name), Some(image_url), Some(price)) if errors.is_empty() => Ok(NewProduct {
            name,
            image_url,
            price,
        }),
        _ => Err(errors),
    }
}

/// Validate a partial update. Absent fields are left alone; an explicit
/// `null` or empty string is reported as a missing required field.
pub fn validate_changes(payload: &Map<String, Value>) -> Result<ProductChanges, Vec<String>> {
    let mut errors = Vec::new();

    let changes = ProductChanges {
        name: payload.get("name").and_then(|v| name_field(v, &mut errors)),
        image_url: payload
            .get("image_url")
            .and_then(|v| image_url_field(v, &mut errors)),
        price: payload.get("price").and_then(|v| price_field(v, &mut errors)),
    };

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(errors)
    }
}

fn required<'a>(
    value: Option<&'a Value>,
    message: &str,
    errors: &mut Vec<String>,
) -> Option<&'a Value> {
    if value.is_none() {
        errors.push(message.to_string());
    }
    value
}

fn text_field(
    value: &Value,
    required: &str,
    not_string: &str,
    errors: &mut Vec<String>,
) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null => {
            errors.push(required.to_string());
            None
        }
        _ => {
            errors.push(not_string.to_string());
            None
        }
    }
}

fn name_field(value: &Value, errors: &mut Vec<String>) -> Option<String> {
    text_field(value, NAME_REQUIRED, NAME_NOT_STRING, errors)
}

fn image_url_field(value: &Value, errors: &mut Vec<String>) -> Option<String> {
    let url = text_field(value, IMAGE_URL_REQUIRED, IMAGE_URL_NOT_STRING, errors)?;
    if is_url_like(&url) {
        Some(url)
    } else {
        errors.push(IMAGE_URL_NOT_URL.to_string());
        None
    }
}

/// The accepted number is returned untouched so it serializes back
/// exactly as submitted.
fn price_field(value: &Value, errors: &mut Vec<String>) -> Option<Number> {
    match value {
        Value::Number(n) if n.as_f64().is_some_and(|price| price > 0.0) => Some(n.clone()),
        Value::Number(_) => {
            errors.push(PRICE_NOT_POSITIVE.to_string());
            None
        }
        Value::Null => {
            errors.push(PRICE_REQUIRED.to_string());
            None
        }
        Value::String(s) if s.trim().is_empty() => {
            errors.push(PRICE_REQUIRED.to_string());
            None
        }
        _ => {
            errors.push(PRICE_NOT_NUMBER.to_string());
            None
        }
    }
}
