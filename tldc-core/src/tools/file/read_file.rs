use crate::file::FileAccessGateway;
use crate::tools::file::access_failure;
use crate::tools::r#trait::{decode_arguments, schema_of, ToolExecutor, ToolOutput, ToolRequest};
use anyhow::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReadFileRequest {
    /// Path to the file, relative to the working directory.
    pub path: String,
}

#[derive(Clone)]
pub struct ReadFileTool {
    gateway: FileAccessGateway,
}

impl ReadFileTool {
    pub fn new(gateway: FileAccessGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait::async_trait]
impl ToolExecutor for ReadFileTool {
    fn name(&self) -> &'static str {
        "read_file"
    }

    fn description(&self) -> &'static str {
        "Returns file contents from given path or an error message. Reading a file marks it as synced."
    }

    fn input_schema(&self) -> Value {
        schema_of::<ReadFileRequest>()
    }

    async fn execute(&self, request: &ToolRequest) -> Result<ToolOutput> {
        let args: ReadFileRequest = match decode_arguments(&request.arguments) {
            Ok(args) => args,
            Err(e) => return Ok(ToolOutput::Error(e)),
        };

        match self.gateway.read(&args.path).await {
            Ok(content) => Ok(ToolOutput::Success(content)),
            Err(e) => access_failure("read", &args.path, e),
        }
    }
}
