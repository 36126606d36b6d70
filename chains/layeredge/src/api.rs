//! LayerEdge light-node endpoints and response interpretation.

use serde::Serialize;
use serde_json::Value;

pub const ACTIVATION_SUCCESS_MESSAGE: &str = "node action executed successfully";

#[derive(Debug, Clone)]
pub struct NodeApi {
    base: String,
}

impl NodeApi {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn status_url(&self, address: &str) -> String {
        format!("{}/api/light-node/node-status/{}", self.base, address)
    }

    pub fn activation_url(&self, address: &str) -> String {
        format!("{}/api/light-node/node-action/{}/start", self.base, address)
    }
}

/// Body of the activation POST. `timestamp` is the same value that was signed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActivationRequest {
    pub sign: String,
    pub timestamp: i64,
}

pub fn activation_message(address: &str, timestamp: i64) -> String {
    format!("Node activation request for {} at {}", address, timestamp)
}

/// A node is active when `data.startTimestamp` holds a truthy value.
pub fn is_node_active(body: &Value) -> bool {
    body.pointer("/data/startTimestamp")
        .map(is_truthy)
        .unwrap_or(false)
}

pub fn is_activation_confirmed(body: &Value) -> bool {
    body.get("message").and_then(Value::as_str) == Some(ACTIVATION_SUCCESS_MESSAGE)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_urls() {
        let api = NodeApi::new("https://referralapi.layeredge.io/");
        assert_eq!(
            api.status_url("0xAbC"),
            "https://referralapi.layeredge.io/api/light-node/node-status/0xAbC"
        );
        assert_eq!(
            api.activation_url("0xAbC"),
            "https://referralapi.layeredge.io/api/light-node/node-action/0xAbC/start"
        );
    }

    #[test]
    fn test_status_interpretation() {
        assert!(is_node_active(
            &json!({"data": {"startTimestamp": 1718000000}})
        ));
        assert!(is_node_active(
            &json!({"data": {"startTimestamp": "2024-06-10T00:00:00Z"}})
        ));

        assert!(!is_node_active(&json!({"data": {"startTimestamp": null}})));
        assert!(!is_node_active(&json!({"data": {"startTimestamp": 0}})));
        assert!(!is_node_active(&json!({"data": {"startTimestamp": ""}})));
        assert!(!is_node_active(&json!({"data": {}})));
        assert!(!is_node_active(&json!({"data": null})));
        assert!(!is_node_active(&json!({})));
    }

    #[test]
    fn test_activation_interpretation() {
        assert!(is_activation_confirmed(
            &json!({"message": "node action executed successfully"})
        ));

        assert!(!is_activation_confirmed(
            &json!({"message": "Node action executed successfully"})
        ));
        assert!(!is_activation_confirmed(
            &json!({"message": "node action executed successfully "})
        ));
        assert!(!is_activation_confirmed(&json!({"message": null})));
        assert!(!is_activation_confirmed(&json!({"data": {}})));
    }

    #[test]
    fn test_activation_request_body_shape() {
        let body = serde_json::to_value(ActivationRequest {
            sign: "0xdead".to_string(),
            timestamp: 1718000000123,
        })
        .unwrap();
        assert_eq!(body, json!({"sign": "0xdead", "timestamp": 1718000000123i64}));
    }

    #[test]
    fn test_activation_message() {
        assert_eq!(
            activation_message("0xAbC", 1718000000123),
            "Node activation request for 0xAbC at 1718000000123"
        );
    }
}
