use crate::ai::{error::AiError, provider::AiProvider, types::*};
use anyhow::anyhow;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted reply of the mock provider
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Finish the turn with this text
    Text(String),
    /// Ask for tool calls, with optional free text alongside
    ToolCalls {
        content: String,
        calls: Vec<ToolCall>,
    },
    SchemaRejected,
    Timeout,
    TerminalError(String),
}

impl MockBehavior {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// A single tool call with a fresh id
    pub fn tool_call(name: &str, arguments: Value) -> Self {
        Self::ToolCalls {
            content: String::new(),
            calls: vec![ToolCall::new(ToolCall::generate_id(), name, arguments)],
        }
    }
}

/// Owned copy of a [`ConversationRequest`] as seen by the mock
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub system_prompt: String,
    pub messages: Vec<Message>,
    pub input: CapturedInput,
    pub tool_names: Vec<String>,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CapturedInput {
    Prompt(String),
    ToolResults(Vec<ToolResult>),
}

/// Mock AI provider for testing. Replies are taken from a queue; once it
/// runs dry every call answers "Mock response".
#[derive(Clone)]
pub struct MockProvider {
    behaviors: Arc<Mutex<VecDeque<MockBehavior>>>,
    call_count: Arc<Mutex<usize>>,
    captured_requests: Arc<Mutex<Vec<CapturedRequest>>>,
    stateful: bool,
    delay: Option<Duration>,
}

impl MockProvider {
    pub fn new(behaviors: Vec<MockBehavior>) -> Self {
        Self {
            behaviors: Arc::new(Mutex::new(behaviors.into())),
            call_count: Arc::new(Mutex::new(0)),
            captured_requests: Arc::new(Mutex::new(Vec::new())),
            stateful: false,
            delay: None,
        }
    }

    /// Behaves like a cursor based backend: every successful call stores a
    /// new response id in the conversation context.
    pub fn stateful(behaviors: Vec<MockBehavior>) -> Self {
        Self {
            stateful: true,
            ..Self::new(behaviors)
        }
    }

    /// Every call waits this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_behavior(&self, behavior: MockBehavior) {
        self.behaviors.lock().unwrap().push_back(behavior);
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn get_captured_requests(&self) -> Vec<CapturedRequest> {
        self.captured_requests.lock().unwrap().clone()
    }

    pub fn get_last_captured_request(&self) -> Option<CapturedRequest> {
        self.captured_requests.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
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

        if self.stateful && cursor.is_none() && matches!(request.input, TurnInput::ToolResults(_))
        {
            return Err(AiError::Terminal(anyhow!(
                "Tool results are pending but the conversation has no response cursor"
            )));
        }

        self.captured_requests.lock().unwrap().push(CapturedRequest {
            system_prompt: request.system_prompt.to_string(),
            messages: request.messages.to_vec(),
            input: match request.input {
                TurnInput::Prompt(prompt) => CapturedInput::Prompt(prompt.to_string()),
                TurnInput::ToolResults(results) => CapturedInput::ToolResults(results.to_vec()),
            },
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
            cursor,
        });

        let call_number = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockBehavior::text("Mock response"));

        let response = match behavior {
            MockBehavior::Text(content) => ConversationResponse::text(content),
            MockBehavior::ToolCalls { content, calls } => ConversationResponse {
                content,
                tool_calls: calls,
            },
            MockBehavior::SchemaRejected => {
                return Err(AiError::SchemaRejected("Mock schema rejection".to_string()))
            }
            MockBehavior::Timeout => return Err(AiError::Timeout("Mock timeout".to_string())),
            MockBehavior::TerminalError(reason) => return Err(AiError::Terminal(anyhow!(reason))),
        };

        if self.stateful {
            request
                .context
                .set_response_cursor(&format!("mock_resp_{call_number}"))
                .await
                .map_err(AiError::Terminal)?;
        }

        Ok(response)
    }
}
