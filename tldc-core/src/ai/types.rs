use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One entry of a conversation's message log. Stored as a JSON document per
/// history row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Set on tool results: the call being answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Set on tool results: the tool that produced them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            tool_name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(MessageRole::Assistant, content)
        }
    }

    pub fn tool_result(result: &ToolResult) -> Self {
        Self {
            tool_call_id: Some(result.tool_call_id.clone()),
            tool_name: Some(result.name.clone()),
            ..Self::new(MessageRole::Tool, result.content.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Id for backends that do not assign their own
    pub fn generate_id() -> String {
        format!("call_{}", uuid::Uuid::new_v4().simple())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub name: String,
    pub content: String,
    pub is_error: bool,
}

/// What is new since the previous model call.
#[derive(Debug, Clone, Copy)]
pub enum TurnInput<'a> {
    Prompt(&'a str),
    ToolResults(&'a [ToolResult]),
}

/// Everything an adapter may need for one model call. Stateless adapters
/// replay `messages`; stateful ones send `input` and keep their cursor in
/// `context`.
pub struct ConversationRequest<'a> {
    pub system_prompt: &'a str,
    /// The full persisted log, `input` already appended
    pub messages: &'a [Message],
    pub input: TurnInput<'a>,
    pub tools: &'a [ToolDefinition],
    pub context: &'a crate::chat::ConversationContext,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConversationResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ConversationResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_json_shape() {
        let user = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(user, json!({"role": "user", "content": "hi"}));

        let result = ToolResult {
            tool_call_id: "call_1".to_string(),
            name: "read_file".to_string(),
            content: "data".to_string(),
            is_error: false,
        };
        let tool = serde_json::to_value(Message::tool_result(&result)).unwrap();
        assert_eq!(
            tool,
            json!({
                "role": "tool",
                "content": "data",
                "tool_call_id": "call_1",
                "tool_name": "read_file"
            })
        );
    }

    #[test]
    fn test_assistant_message_survives_storage() {
        let message = Message::assistant(
            "",
            vec![ToolCall::new("call_1", "list_dir", json!({"path": "src"}))],
        );
        let stored = serde_json::to_string(&message).unwrap();
        let loaded: Message = serde_json::from_str(&stored).unwrap();
        assert_eq!(loaded, message);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = ToolCall::generate_id();
        let b = ToolCall::generate_id();
        assert!(a.starts_with("call_"));
        assert_ne!(a, b);
    }
}
