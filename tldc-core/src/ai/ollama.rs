use crate::ai::{error::AiError, provider::AiProvider, types::*};
use anyhow::anyhow;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Stateless chat backend: the whole message log is replayed on every call.
#[derive(Clone)]
pub struct OllamaProvider {
    client: Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(url: String, model: String, timeout: Duration) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Terminal(anyhow!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            model,
        })
    }

    async fn chat(&self, body: &OllamaChatRequest<'_>) -> Result<OllamaChatResponse, AiError> {
        let endpoint = format!("{}/api/chat", self.url);
        debug!(
            %endpoint,
            messages = body.messages.len(),
            tools = body.tools.is_some(),
            "Sending Ollama request"
        );

        let response = self.client.post(&endpoint).json(body).send().await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            debug!(?status, %response_text, "Ollama returned error");
            if status == StatusCode::BAD_REQUEST && body.tools.is_some() {
                return Err(AiError::SchemaRejected(response_text));
            }
            return Err(AiError::Terminal(anyhow!(
                "Ollama request failed with {status}: {response_text}"
            )));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            AiError::Terminal(anyhow!("Failed to parse Ollama response: {e}: {response_text}"))
        })
    }
}

#[async_trait::async_trait]
impl AiProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn send(
        &self,
        request: ConversationRequest<'_>,
    ) -> Result<ConversationResponse, AiError> {
        let messages: Vec<OllamaMessage> =
            request.messages.iter().map(OllamaMessage::from).collect();
        let tools: Vec<OllamaTool> = request.tools.iter().map(OllamaTool::from).collect();

        let mut body = OllamaChatRequest {
            model: &self.model,
            messages,
            tools: (!tools.is_empty()).then_some(tools),
            stream: false,
        };

        let response = match self.chat(&body).await {
            Err(AiError::SchemaRejected(reason)) => {
                warn!(%reason, "Backend rejected the tool schema, retrying once without tools");
                body.tools = None;
                self.chat(&body).await?
            }
            other => other?,
        };

        Ok(response.message.into_response())
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OllamaTool>>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<OllamaToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

impl From<&Message> for OllamaMessage {
    fn from(message: &Message) -> Self {
        let role = match message.role {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        };
        Self {
            role: role.to_string(),
            content: message.content.clone(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| OllamaToolCall {
                    id: Some(call.id.clone()),
                    function: OllamaFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.clone(),
                    },
                })
                .collect(),
            tool_call_id: message.tool_call_id.clone(),
            tool_name: message.tool_name.clone(),
        }
    }
}

impl OllamaMessage {
    fn into_response(self) -> ConversationResponse {
        let tool_calls = self
            .tool_calls
            .into_iter()
            .map(|call| {
                let id = call.id.unwrap_or_else(ToolCall::generate_id);
                ToolCall::new(id, call.function.name, decode_arguments(call.function.arguments))
            })
            .collect();
        ConversationResponse {
            content: self.content,
            tool_calls,
        }
    }
}

/// Some models send the arguments as a JSON encoded string instead of an
/// object. Undecodable strings are passed through for the registry to reject.
fn decode_arguments(arguments: Value) -> Value {
    match arguments {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    function: OllamaFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Serialize)]
struct OllamaTool {
    r#type: &'static str,
    function: OllamaFunction,
}

#[derive(Serialize)]
struct OllamaFunction {
    name: String,
    description: String,
    parameters: Value,
}

impl From<&ToolDefinition> for OllamaTool {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            r#type: "function",
            function: OllamaFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        }
    }
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}
