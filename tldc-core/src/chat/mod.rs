//! Drives one prompt from the user's text to the model's final answer,
//! executing the tool calls the model makes along the way.

pub mod context;
pub mod lock;
pub mod orchestrator;
pub mod state;

pub use context::ConversationContext;
pub use lock::ContextLocks;
pub use orchestrator::{ChatError, Orchestrator};
pub use state::TurnState;
