/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Acknowledgments returned by the backend for acknowledged emits.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Acknowledgment body, e.g. `{ "code": 200, "message": "ok" }`.
///
/// Everything besides `code` is backend-defined and kept in `fields`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ack {
    pub code: u16,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Ack {
    pub const OK: u16 = 200;

    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        serde_json::from_value(value).map_err(DecodeError::schema("acknowledgment"))
    }

    pub fn is_ok(&self) -> bool {
        self.code == Self::OK
    }
}

/// Mirrors the JavaScript truthiness test the backend contract was written
/// against: `null`, `false`, `0`, `""` mean "no acknowledgment".
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ack_decodes_code_and_extra_fields() {
        let ack = Ack::from_value(json!({ "code": 404, "message": "conversation not found" }))
            .unwrap();
        assert!(!ack.is_ok());
        assert_eq!(ack.fields["message"], "conversation not found");
    }

    #[test]
    fn test_ack_without_code_is_rejected() {
        assert!(Ack::from_value(json!({ "message": "ok" })).is_err());
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!("resumed")));
    }
}
