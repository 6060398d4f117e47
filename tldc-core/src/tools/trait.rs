use anyhow::Result;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Request passed to tool execution
#[derive(Debug, Clone)]
pub struct ToolRequest {
    /// The arguments for the tool
    pub arguments: Value,
    /// The unique ID for this tool call
    pub tool_call_id: String,
}

impl ToolRequest {
    pub fn new(arguments: Value, tool_call_id: String) -> Self {
        Self {
            arguments,
            tool_call_id,
        }
    }
}

/// What the model gets back from a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Success(String),
    /// A failure the model can react to, e.g. a missing file
    Error(String),
}

impl ToolOutput {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn into_content(self) -> String {
        match self {
            Self::Success(content) | Self::Error(content) => content,
        }
    }
}

/// A tool the model may call. `Err` is reserved for failures that must end
/// the turn (storage); everything the model can fix is a `ToolOutput::Error`.
#[async_trait::async_trait]
pub trait ToolExecutor: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> Value;

    async fn execute(&self, request: &ToolRequest) -> Result<ToolOutput>;
}

pub type SharedTool = Arc<dyn ToolExecutor>;

/// JSON schema of a request struct, as sent to the backends
pub fn schema_of<T: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_default();
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    schema
}

/// Decodes tool arguments into their request struct. A missing argument
/// object counts as empty.
pub fn decode_arguments<T: DeserializeOwned>(arguments: &Value) -> Result<T, String> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other.clone(),
    };
    serde_json::from_value(arguments).map_err(|e| format!("Invalid arguments: {e}"))
}
