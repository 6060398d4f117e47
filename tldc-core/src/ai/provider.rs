use crate::ai::{error::AiError, types::*};

/// A chat backend. Each call either finishes the turn with text or asks for
/// tool calls.
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(
        &self,
        request: ConversationRequest<'_>,
    ) -> Result<ConversationResponse, AiError>;
}
