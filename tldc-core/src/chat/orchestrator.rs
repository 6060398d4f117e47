use crate::ai::{AiError, AiProvider, ConversationRequest, Message, ToolResult, TurnInput};
use crate::chat::context::ConversationContext;
use crate::chat::lock::ContextLocks;
use crate::chat::state::TurnState;
use crate::settings::config::SYSTEM_PROMPT;
use crate::sync::StalenessCache;
use crate::tools::ToolRegistry;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 50;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Provider(#[from] AiError),

    #[error("Model requested an unknown tool: {0}")]
    UnknownTool(String),

    #[error("No final answer after {0} model rounds")]
    RoundLimitExceeded(usize),

    #[error("Storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// Runs prompts against one conversation context.
pub struct Orchestrator {
    provider: Arc<dyn AiProvider>,
    registry: ToolRegistry,
    context: ConversationContext,
    cache: Arc<StalenessCache>,
    locks: ContextLocks,
    system_prompt: String,
    max_tool_rounds: usize,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn AiProvider>,
        registry: ToolRegistry,
        context: ConversationContext,
        cache: Arc<StalenessCache>,
    ) -> Self {
        Self {
            provider,
            registry,
            context,
            cache,
            locks: ContextLocks::new(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Shares locks with other orchestrators working on the same contexts
    pub fn with_locks(mut self, locks: ContextLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Sends `prompt` and keeps executing tool calls until the model answers
    /// with plain text, which is returned.
    ///
    /// Every message is persisted as soon as it exists: the user message
    /// before the first model call, each assistant message before its tools
    /// run, each tool result right after.
    pub async fn prompt(&self, prompt: &str) -> Result<String, ChatError> {
        let _guard = self.locks.acquire(self.context.key()).await;

        let mut state = TurnState::LoadingHistory;
        debug!(context = %self.context.key(), %state, "Prompt started");

        let mut messages = self.context.messages().await?;
        if messages.is_empty() {
            let system = Message::system(self.system_prompt.clone());
            self.context.append(&system).await?;
            messages.push(system);
        }

        let user = Message::user(prompt);
        self.context.append(&user).await?;
        messages.push(user);

        let tools = self.registry.definitions();
        let mut tool_results: Vec<ToolResult> = Vec::new();

        for round in 1..=self.max_tool_rounds {
            transition(&mut state, TurnState::AwaitingModel { round });

            let input = if round == 1 {
                TurnInput::Prompt(prompt)
            } else {
                TurnInput::ToolResults(&tool_results)
            };

            let response = self
                .provider
                .send(ConversationRequest {
                    system_prompt: &self.system_prompt,
                    messages: &messages,
                    input,
                    tools: &tools,
                    context: &self.context,
                })
                .await?;

            if response.tool_calls.is_empty() {
                let answer = Message::assistant(response.content.clone(), Vec::new());
                self.context.append(&answer).await?;
                transition(&mut state, TurnState::Done);
                return Ok(response.content);
            }

            if let Some(unknown) = response
                .tool_calls
                .iter()
                .find(|call| !self.registry.contains(&call.name))
            {
                error!(tool_name = %unknown.name, "Model requested an unknown tool");
                self.drop_cursor().await?;
                return Err(ChatError::UnknownTool(unknown.name.clone()));
            }

            if !response.content.trim().is_empty() {
                info!("Superfluous message content: {}", response.content);
            }

            transition(
                &mut state,
                TurnState::ToolRound {
                    round,
                    calls: response.tool_calls.len(),
                },
            );

            let calls = response.tool_calls.clone();
            let assistant = Message::assistant(response.content, response.tool_calls);
            self.context.append(&assistant).await?;
            messages.push(assistant);

            tool_results.clear();
            for call in &calls {
                let result = self.registry.execute(call).await?;
                let message = Message::tool_result(&result);
                self.context.append(&message).await?;
                messages.push(message);
                tool_results.push(result);
            }
        }

        error!(max = self.max_tool_rounds, "Tool round limit reached");
        self.drop_cursor().await?;
        Err(ChatError::RoundLimitExceeded(self.max_tool_rounds))
    }

    /// Forgets the conversation and marks every tracked path stale.
    pub async fn reset(&self) -> Result<(), ChatError> {
        let _guard = self.locks.acquire(self.context.key()).await;

        self.context.clear().await?;
        let touched = self.cache.invalidate_all().await?;
        info!(context = %self.context.key(), touched, "Context reset");
        Ok(())
    }

    /// A stored response with unanswered tool calls cannot be resumed, so a
    /// stateful backend starts over from the system prompt next time.
    async fn drop_cursor(&self) -> Result<(), ChatError> {
        if self.context.response_cursor().await?.is_some() {
            warn!(
                context = %self.context.key(),
                "Dropping response cursor with pending tool calls"
            );
            self.context.clear_response_cursor().await?;
        }
        Ok(())
    }
}

fn transition(state: &mut TurnState, next: TurnState) {
    debug!(from = %state, to = %next, "Turn state");
    *state = next;
}
