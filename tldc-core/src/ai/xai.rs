use crate::ai::{error::AiError, provider::AiProvider, types::*};
use anyhow::anyhow;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Stateful backend using the Responses API. The server keeps the
/// conversation; each call sends only the new input plus the id of the
/// previous response, which is stored as the context's cursor.
#[derive(Clone)]
pub struct XaiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl XaiProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Terminal(anyhow!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn build_input(
        system_prompt: &str,
        input: TurnInput<'_>,
        cursor: Option<&str>,
    ) -> Result<Vec<Value>, AiError> {
        match (input, cursor) {
            (TurnInput::Prompt(prompt), Some(_)) => {
                Ok(vec![json!({"role": "user", "content": prompt})])
            }
            (TurnInput::Prompt(prompt), None) => Ok(vec![
                json!({"role": "system", "content": system_prompt}),
                json!({"role": "user", "content": prompt}),
            ]),
            (TurnInput::ToolResults(results), Some(_)) => Ok(results
                .iter()
                .map(|result| {
                    json!({
                        "type": "function_call_output",
                        "call_id": result.tool_call_id,
                        "output": result.content,
                    })
                })
                .collect()),
            (TurnInput::ToolResults(_), None) => Err(AiError::Terminal(anyhow!(
                "Tool results are pending but the conversation has no response cursor"
            ))),
        }
    }
}

#[async_trait::async_trait]
impl AiProvider for XaiProvider {
    fn name(&self) -> &'static str {
        "xai"
    }

    async fn send(
        &self,
        request: ConversationRequest<'_>,
    ) -> Result<ConversationResponse, AiError> {
        let cursor = request
            .context
            .response_cursor()
            .await
            .map_err(AiError::Terminal)?;
        let input = Self::build_input(request.system_prompt, request.input, cursor.as_deref())?;

        let body = ResponsesRequest {
            model: &self.model,
            input,
            previous_response_id: cursor.as_deref(),
            store: true,
            tool_choice: (!request.tools.is_empty()).then_some("auto"),
            tools: request.tools.iter().map(function_tool).collect(),
        };

        let endpoint = format!("{}/responses", self.base_url);
        debug!(
            %endpoint,
            resumed = cursor.is_some(),
            items = body.input.len(),
            "Sending xAI request"
        );

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            debug!(?status, %response_text, "xAI returned error");
            return Err(AiError::Terminal(anyhow!(
                "xAI request failed with {status}: {response_text}"
            )));
        }

        let parsed: ResponsesResponse = serde_json::from_str(&response_text).map_err(|e| {
            AiError::Terminal(anyhow!("Failed to parse xAI response: {e}: {response_text}"))
        })?;

        request
            .context
            .set_response_cursor(&parsed.id)
            .await
            .map_err(AiError::Terminal)?;

        parsed.into_response()
    }
}

fn function_tool(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "name": tool.name,
        "description": tool.description,
        "parameters": tool.input_schema,
    })
}

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
    store: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Deserialize)]
struct ResponsesResponse {
    id: String,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<OutputContent>,
    },
    FunctionCall {
        call_id: String,
        name: String,
        #[serde(default)]
        arguments: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputContent {
    OutputText {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl ResponsesResponse {
    fn into_response(self) -> Result<ConversationResponse, AiError> {
        let mut response = ConversationResponse::default();
        for item in self.output {
            match item {
                OutputItem::Message { content } => {
                    for part in content {
                        if let OutputContent::OutputText { text } = part {
                            response.content.push_str(&text);
                        }
                    }
                }
                OutputItem::FunctionCall {
                    call_id,
                    name,
                    arguments,
                } => {
                    let arguments = if arguments.trim().is_empty() {
                        json!({})
                    } else {
                        serde_json::from_str(&arguments).unwrap_or(Value::String(arguments))
                    };
                    response.tool_calls.push(ToolCall::new(call_id, name, arguments));
                }
                OutputItem::Other => {}
            }
        }
        Ok(response)
    }
}
