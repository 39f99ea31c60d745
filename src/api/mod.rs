use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::message::Role;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role: role.as_str().to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponseChoice {
    #[serde(default)]
    pub message: Option<ChatResponseMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Providers send this as either a string or a number.
    #[serde(default)]
    pub code: Option<Value>,
}

impl ApiErrorBody {
    pub fn code_string(&self) -> Option<String> {
        match self.code.as_ref()? {
            Value::Null => None,
            Value::String(code) => Some(code.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Option<Vec<ChatResponseChoice>>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_wire_keys() {
        let request = ChatRequest {
            model: "deepseek-chat".to_string(),
            messages: vec![ChatMessage::new(Role::User, "hi")],
            temperature: 0.7,
            max_tokens: 4000,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "deepseek-chat",
                "messages": [{"role": "user", "content": "hi"}],
                "temperature": 0.7,
                "max_tokens": 4000
            })
        );
    }

    #[test]
    fn error_code_accepts_strings_and_numbers() {
        let text: ApiErrorBody =
            serde_json::from_str(r#"{"message":"bad","code":"invalid_key"}"#).unwrap();
        let number: ApiErrorBody = serde_json::from_str(r#"{"message":"bad","code":401}"#).unwrap();
        let null: ApiErrorBody = serde_json::from_str(r#"{"message":"bad","code":null}"#).unwrap();

        assert_eq!(text.code_string().as_deref(), Some("invalid_key"));
        assert_eq!(number.code_string().as_deref(), Some("401"));
        assert_eq!(null.code_string(), None);
    }

    #[test]
    fn response_fields_are_optional() {
        let response: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(response.choices.is_none());
        assert!(response.error.is_none());
    }
}
