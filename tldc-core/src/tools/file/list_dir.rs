use crate::file::{FileAccessGateway, ListEntry};
use crate::tools::file::access_failure;
use crate::tools::r#trait::{decode_arguments, schema_of, ToolExecutor, ToolOutput, ToolRequest};
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListCurrentDirRequest {}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListDirRequest {
    /// Relative path to the directory whose contents to list.
    pub path: String,
}

fn render(entries: &[ListEntry]) -> Result<ToolOutput> {
    let json = serde_json::to_string(entries).context("Failed to serialize listing")?;
    Ok(ToolOutput::Success(json))
}

#[derive(Clone)]
pub struct ListCurrentDirTool {
    gateway: FileAccessGateway,
}

impl ListCurrentDirTool {
    pub fn new(gateway: FileAccessGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait::async_trait]
impl ToolExecutor for ListCurrentDirTool {
    fn name(&self) -> &'static str {
        "list_current_dir"
    }

    fn description(&self) -> &'static str {
        "Returns json list of direct child entries (files and directories) in the current working \
         directory. Each entry has 'path', 'is_dir' (boolean) and 'synced' (boolean, false when \
         the entry changed since it was last read)."
    }

    fn input_schema(&self) -> Value {
        schema_of::<ListCurrentDirRequest>()
    }

    async fn execute(&self, request: &ToolRequest) -> Result<ToolOutput> {
        if let Err(e) = decode_arguments::<ListCurrentDirRequest>(&request.arguments) {
            return Ok(ToolOutput::Error(e));
        }

        match self.gateway.list(None).await {
            Ok(entries) => render(&entries),
            Err(e) => access_failure("list", ".", e),
        }
    }
}

#[derive(Clone)]
pub struct ListDirTool {
    gateway: FileAccessGateway,
}

impl ListDirTool {
    pub fn new(gateway: FileAccessGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait::async_trait]
impl ToolExecutor for ListDirTool {
    fn name(&self) -> &'static str {
        "list_dir"
    }

    fn description(&self) -> &'static str {
        "Returns json list of direct child entries (files and directories) in the given relative \
         directory path. Paths are relative to the working directory. Each entry has 'path', \
         'is_dir' (boolean) and 'synced' (boolean)."
    }

    fn input_schema(&self) -> Value {
        schema_of::<ListDirRequest>()
    }

    async fn execute(&self, request: &ToolRequest) -> Result<ToolOutput> {
        let args: ListDirRequest = match decode_arguments(&request.arguments) {
            Ok(args) => args,
            Err(e) => return Ok(ToolOutput::Error(e)),
        };

        match self.gateway.list(Some(&args.path)).await {
            Ok(entries) => render(&entries),
            Err(e) => access_failure("list", &args.path, e),
        }
    }
}
