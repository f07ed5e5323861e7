use crate::core::errors::{NormalizedError, TransportError, UNKNOWN_ERROR_CODE};
use serde_json::Value;

/// Reduce any transport failure to a [`NormalizedError`]. Never fails.
///
/// First match wins:
/// 1. a decoded response carrying a numeric `code`;
/// 2. a text body that parses as an error envelope;
/// 3. the failure's own code (or -1) with its message, or the raw body.
pub fn normalize(error: &TransportError) -> NormalizedError {
    match error {
        TransportError::Structured { response, .. } => from_response(response)
            .unwrap_or_else(|| NormalizedError::unknown(Some(response.to_string()))),
        TransportError::Text { response_text, .. } => serde_json::from_str::<Value>(response_text)
            .ok()
            .and_then(|response| from_response(&response))
            .unwrap_or_else(|| NormalizedError::unknown(non_empty(response_text))),
        TransportError::Failed { code, message } => NormalizedError {
            code: code.unwrap_or(UNKNOWN_ERROR_CODE),
            error: non_empty(message),
        },
    }
}

fn from_response(response: &Value) -> Option<NormalizedError> {
    let code = response.get("code")?.as_i64()?;
    let error = match response.get("error") {
        None | Some(Value::Null) => None,
        Some(Value::String(message)) => Some(message.clone()),
        Some(other) => Some(other.to_string()),
    };
    Some(NormalizedError { code, error })
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_response() {
        let error = TransportError::Structured {
            status: 404,
            response: json!({"code": 101, "error": "Object not found."}),
        };
        assert_eq!(normalize(&error), NormalizedError::new(101, "Object not found."));
    }

    #[test]
    fn test_structured_response_without_code() {
        let error = TransportError::Structured {
            status: 502,
            response: json!({"message": "bad gateway"}),
        };
        let normalized = normalize(&error);
        assert_eq!(normalized.code, -1);
        assert_eq!(normalized.error.as_deref(), Some(r#"{"message":"bad gateway"}"#));
    }

    #[test]
    fn test_text_body_envelope() {
        let error = TransportError::Text {
            status: 400,
            response_text: r#"{"code":142,"error":"Cloud Code validation failed."}"#.to_string(),
        };
        assert_eq!(
            normalize(&error),
            NormalizedError::new(142, "Cloud Code validation failed.")
        );
    }

    #[test]
    fn test_text_body_envelope_with_structured_error() {
        let error = TransportError::Text {
            status: 400,
            response_text: r#"{"code":1,"error":{"msg":"quota exceeded"}}"#.to_string(),
        };
        assert_eq!(
            normalize(&error),
            NormalizedError::new(1, r#"{"msg":"quota exceeded"}"#)
        );
    }

    #[test]
    fn test_text_body_not_json() {
        let error = TransportError::Text {
            status: 503,
            response_text: "<html>Service Unavailable</html>".to_string(),
        };
        assert_eq!(
            normalize(&error),
            NormalizedError::unknown(Some("<html>Service Unavailable</html>".to_string()))
        );
    }

    #[test]
    fn test_text_body_json_without_code() {
        let error = TransportError::Text {
            status: 500,
            response_text: r#"{"error":"oops"}"#.to_string(),
        };
        assert_eq!(normalize(&error).code, -1);
    }

    #[test]
    fn test_transport_failure() {
        let error = TransportError::Failed {
            code: None,
            message: "operation timed out".to_string(),
        };
        assert_eq!(
            normalize(&error),
            NormalizedError::unknown(Some("operation timed out".to_string()))
        );

        let error = TransportError::Failed {
            code: Some(408),
            message: "timeout".to_string(),
        };
        assert_eq!(normalize(&error), NormalizedError::new(408, "timeout"));
    }

    #[test]
    fn test_empty_failure() {
        let error = TransportError::Failed {
            code: None,
            message: String::new(),
        };
        assert_eq!(normalize(&error), NormalizedError::unknown(None));

        let error = TransportError::Text {
            status: 500,
            response_text: String::new(),
        };
        assert_eq!(normalize(&error), NormalizedError::unknown(None));
    }
}
