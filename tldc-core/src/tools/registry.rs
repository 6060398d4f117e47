use crate::ai::{ToolCall, ToolDefinition, ToolResult};
use crate::file::FileAccessGateway;
use crate::tools::file::list_dir::{ListCurrentDirTool, ListDirTool};
use crate::tools::file::read_file::ReadFileTool;
use crate::tools::file::write_file::WriteFileTool;
use crate::tools::r#trait::{SharedTool, ToolOutput, ToolRequest};
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ToolRegistry {
    tools: BTreeMap<String, SharedTool>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<SharedTool>) -> Self {
        let mut registry = Self {
            tools: BTreeMap::new(),
        };

        for tool in tools {
            registry.register_tool(tool);
        }

        registry
    }

    /// The file tools, bound to `gateway`
    pub fn file_tools(gateway: FileAccessGateway) -> Self {
        Self::new(vec![
            Arc::new(ReadFileTool::new(gateway.clone())),
            Arc::new(WriteFileTool::new(gateway.clone())),
            Arc::new(ListCurrentDirTool::new(gateway.clone())),
            Arc::new(ListDirTool::new(gateway)),
        ])
    }

    pub fn register_tool(&mut self, tool: SharedTool) {
        let name = tool.name().to_string();
        debug!(tool_name = %name, "Registering tool");
        self.tools.insert(name, tool);
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Runs one tool call. Errors are storage failures; anything the model
    /// can fix comes back as an error result.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let Some(tool) = self.tools.get(&call.name) else {
            bail!("Unknown tool: {}", call.name);
        };

        debug!(tool_name = %call.name, arguments = %call.arguments, "Executing tool");
        let request = ToolRequest::new(call.arguments.clone(), call.id.clone());
        let output = tool.execute(&request).await?;

        if let ToolOutput::Error(message) = &output {
            warn!(tool_name = %call.name, %message, "Tool call failed");
        }

        Ok(ToolResult {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            is_error: output.is_error(),
            content: output.into_content(),
        })
    }
}
