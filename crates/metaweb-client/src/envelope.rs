//! JSON envelope types shared by all Metaweb services

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status code every service returns on success. Any other value is a
/// failure.
pub const STATUS_OK: &str = "/api/status/ok";

/// One entry of a failure envelope's `messages` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub code: String,
    pub message: String,
}

/// The failure payload carried inside a `ClientError::Service`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub code: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Parsed response envelope from a JSON service.
///
/// Batched reads nest one envelope per query under `q0`, `q1`, ... of the
/// outer envelope; those land in `slots`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    pub code: String,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub cursor: Cursor,
    #[serde(flatten)]
    pub slots: Map<String, Value>,
}

impl ResponseEnvelope {
    pub fn is_ok(&self) -> bool {
        self.code == STATUS_OK
    }

    /// The failure payload of this envelope.
    pub fn error_envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            code: self.code.clone(),
            messages: self.messages.clone(),
        }
    }

    /// Inner envelope of batch slot `i`, if the server returned one.
    pub fn slot(&self, i: usize) -> Option<ResponseEnvelope> {
        let value = self.slots.get(&format!("q{i}"))?.clone();
        serde_json::from_value(value).ok()
    }
}

/// Cursor state of a paginated read.
///
/// The first request sends the JSON literal `true`; the server answers with
/// an opaque continuation token while more results remain, and something
/// falsy once the result set is exhausted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    /// First page marker, serialized as `true`.
    Start,
    /// Opaque continuation token from the previous page.
    Token(String),
    /// Result set exhausted.
    #[default]
    Done,
}

impl Cursor {
    pub fn has_more(&self) -> bool {
        !matches!(self, Cursor::Done)
    }

    pub fn to_value(&self) -> Value {
        match self {
            Cursor::Start => Value::Bool(true),
            Cursor::Token(token) => Value::String(token.clone()),
            Cursor::Done => Value::Bool(false),
        }
    }

    pub fn from_value(value: &Value) -> Cursor {
        match value {
            Value::Bool(true) => Cursor::Start,
            Value::String(token) if !token.is_empty() => Cursor::Token(token.clone()),
            _ => Cursor::Done,
        }
    }
}

impl Serialize for Cursor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Cursor::from_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cursor_decoding() {
        assert_eq!(Cursor::from_value(&json!(true)), Cursor::Start);
        assert_eq!(
            Cursor::from_value(&json!("token-17")),
            Cursor::Token("token-17".to_string())
        );
        assert_eq!(Cursor::from_value(&json!(false)), Cursor::Done);
        assert_eq!(Cursor::from_value(&json!(null)), Cursor::Done);
        assert_eq!(Cursor::from_value(&json!("")), Cursor::Done);
    }

    #[test]
    fn test_cursor_encoding() {
        assert_eq!(Cursor::Start.to_value(), json!(true));
        assert_eq!(Cursor::Token("abc".to_string()).to_value(), json!("abc"));
        assert_eq!(Cursor::Done.to_value(), json!(false));
    }

    #[test]
    fn test_envelope_parsing() {
        let envelope: ResponseEnvelope = serde_json::from_str(
            r#"{"code":"/api/status/ok","result":[1,2],"cursor":"next-page"}"#,
        )
        .unwrap();
        assert!(envelope.is_ok());
        assert_eq!(envelope.result, Some(json!([1, 2])));
        assert_eq!(envelope.cursor, Cursor::Token("next-page".to_string()));
    }

    #[test]
    fn test_envelope_missing_cursor_means_done() {
        let envelope: ResponseEnvelope =
            serde_json::from_str(r#"{"code":"/api/status/ok","result":[]}"#).unwrap();
        assert_eq!(envelope.cursor, Cursor::Done);
    }

    #[test]
    fn test_batch_slots() {
        let envelope: ResponseEnvelope = serde_json::from_str(
            r#"{
                "code": "/api/status/ok",
                "q1": {"code": "/api/status/ok", "result": "second"},
                "q0": {"code": "/api/status/ok", "result": "first"}
            }"#,
        )
        .unwrap();

        let q0 = envelope.slot(0).unwrap();
        let q1 = envelope.slot(1).unwrap();
        assert_eq!(q0.result, Some(json!("first")));
        assert_eq!(q1.result, Some(json!("second")));
        assert!(envelope.slot(2).is_none());
    }

    #[test]
    fn test_failure_envelope() {
        let envelope: ResponseEnvelope = serde_json::from_str(
            r#"{
                "code": "/api/status/error",
                "messages": [{"code": "/api/status/error/mql/type", "message": "no such type"}]
            }"#,
        )
        .unwrap();
        assert!(!envelope.is_ok());

        let details = envelope.error_envelope();
        assert_eq!(details.code, "/api/status/error");
        assert_eq!(details.messages[0].message, "no such type");
    }
}
