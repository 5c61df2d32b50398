//! Control request envelope.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ControlError;

/// One control-plane call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControlRequest {
    #[serde(rename = "api", alias = "namespace")]
    pub namespace: String,
    #[serde(rename = "name", alias = "method")]
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl ControlRequest {
    pub fn parse(bytes: &[u8]) -> Result<Self, ControlError> {
        serde_json::from_slice(bytes).map_err(|e| ControlError::MalformedRequest(e.to_string()))
    }

    /// The params re-encoded as the byte payload handlers receive.
    pub fn params_bytes(&self) -> Vec<u8> {
        self.params.to_string().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_original_keys() {
        let req =
            ControlRequest::parse(br#"{"api":"local","name":"changeChat","params":{"query":"x"}}"#)
                .unwrap();
        assert_eq!(req.namespace, "local");
        assert_eq!(req.method, "changeChat");
        assert_eq!(req.params, json!({"query": "x"}));
        assert_eq!(req.params_bytes(), br#"{"query":"x"}"#);
    }

    #[test]
    fn test_parse_alias_keys_and_missing_params() {
        let req = ControlRequest::parse(br#"{"namespace":"local","method":"isAuthenticated"}"#)
            .unwrap();
        assert_eq!(req.namespace, "local");
        assert_eq!(req.method, "isAuthenticated");
        assert_eq!(req.params, Value::Null);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            ControlRequest::parse(b"not json"),
            Err(ControlError::MalformedRequest(_))
        ));
        assert!(matches!(
            ControlRequest::parse(br#"{"api":"local"}"#),
            Err(ControlError::MalformedRequest(_))
        ));
    }
}
