//! Control response envelope.

use serde::Serialize;
use serde_json::Value;

use crate::error::ControlError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Reply to one control-plane call: either `result` or `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlResponse {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl ControlResponse {
    pub fn success(method: impl Into<String>, result: Value) -> Self {
        Self {
            method: method.into(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(method: impl Into<String>, error: &ControlError) -> Self {
        Self {
            method: method.into(),
            result: None,
            error: Some(ErrorBody {
                code: error.error_code(),
                message: error.to_string(),
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
