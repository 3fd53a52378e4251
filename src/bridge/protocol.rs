use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum IncomingMessage {
    #[serde(rename = "call")]
    Call {
        id: u64,
        method: String,
        #[serde(default)]
        arguments: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum OutgoingMessage {
    #[serde(rename = "response")]
    Response { id: u64, result: MethodResponse },
    /// Unsolicited call from the native side; no reply is expected.
    #[serde(rename = "invoke")]
    Invoke { method: String, arguments: Value },
}

/// Outcome of a bridge call.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success { value: Value },
    Error { code: String, message: String },
    NotImplemented,
}

impl MethodResponse {
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success { value: value.into() }
    }

    /// Acknowledgement without a payload.
    pub fn ack() -> Self {
        Self::Success { value: Value::Null }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_without_arguments_parses() {
        let msg: IncomingMessage =
            serde_json::from_str(r#"{"type":"call","id":7,"method":"showLockScreen"}"#).unwrap();
        assert_eq!(
            msg,
            IncomingMessage::Call {
                id: 7,
                method: "showLockScreen".into(),
                arguments: Value::Null,
            }
        );
    }

    #[test]
    fn test_response_wire_shapes() {
        let ok = OutgoingMessage::Response { id: 1, result: MethodResponse::success(true) };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"type": "response", "id": 1, "result": {"status": "success", "value": true}})
        );

        let missing = OutgoingMessage::Response { id: 2, result: MethodResponse::NotImplemented };
        assert_eq!(
            serde_json::to_value(&missing).unwrap(),
            json!({"type": "response", "id": 2, "result": {"status": "not_implemented"}})
        );
    }

    #[test]
    fn test_invoke_wire_shape() {
        let push = OutgoingMessage::Invoke {
            method: "navigateToLockScreen".into(),
            arguments: json!("com.a"),
        };
        assert_eq!(
            serde_json::to_value(&push).unwrap(),
            json!({"type": "invoke", "method": "navigateToLockScreen", "arguments": "com.a"})
        );
    }
}
