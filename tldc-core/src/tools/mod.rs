pub mod file;
pub mod registry;
pub mod r#trait;

pub use registry::ToolRegistry;

/// Bumped whenever a tool name, argument or result format changes.
pub const TOOLSET_VERSION: u32 = 1;
