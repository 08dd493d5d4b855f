//! Uniform error envelope
//!
//! Every rejection response from the auth service carries this shape, and the
//! console client parses it back out of failed requests.

use serde::{Deserialize, Serialize};

/// Error response body: `{"success": false, "message": ..., "errors": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(message: S) -> Self {
        ErrorBody {
            success: false,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors<S: Into<String>>(message: S, errors: Vec<String>) -> Self {
        ErrorBody {
            success: false,
            message: message.into(),
            errors: Some(errors),
        }
    }
}
