//! # Response Envelope
//!
//! Every endpoint answers with the same JSON wrapper:
//! `{success, message, data?, errors?}`.

use serde::Serialize;
use serde_json::Value;

use crate::validation::FieldError;

/// The uniform response body
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl Envelope {
    /// Successful response carrying a payload
    pub fn ok(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            errors: None,
        }
    }

    /// Failure with a message only
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            errors: None,
        }
    }

    /// Validation failure carrying one entry per violated field
    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: "Validation failed".to_string(),
            data: None,
            errors: Some(errors),
        }
    }
}
