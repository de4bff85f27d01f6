//! Response types and helpers for HTTP endpoints.

use bytes::Bytes;
use hyper::StatusCode;
use serde::{Deserialize, Serialize};

/// `{ "message": "..." }`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageBody {
    pub message: String,
}

/// `{ "errors": [{ "message": "..." }, ...] }`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub errors: Vec<MessageBody>,
}

impl ErrorBody {
    pub fn new<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            errors: messages
                .into_iter()
                .map(|m| MessageBody { message: m.into() })
                .collect(),
        }
    }
}

/// A fully rendered response, independent of the HTTP stack
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl ApiResponse {
    /// Serialize a value as the JSON body
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body: Bytes::from(body),
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response body");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    content_type: "application/json",
                    body: Bytes::from_static(
                        br#"{"errors":[{"message":"Internal Server Error"}]}"#,
                    ),
                }
            }
        }
    }

    /// `{ message }` body
    pub fn message(status: StatusCode, message: &str) -> Self {
        Self::json(
            status,
            &MessageBody {
                message: message.to_string(),
            },
        )
    }

    /// Plain text body
    pub fn text(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    /// Parse the body back as JSON
    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}
