pub mod ai;
pub mod chat;
pub mod file;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sync;
pub mod tools;

pub use ai::provider::AiProvider;
pub use chat::{ChatError, Orchestrator};
pub use session::Session;
pub use settings::{Settings, SettingsManager};
pub use tools::r#trait::ToolExecutor;
