use crate::file::FileAccessGateway;
use crate::tools::file::access_failure;
use crate::tools::r#trait::{decode_arguments, schema_of, ToolExecutor, ToolOutput, ToolRequest};
use anyhow::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct WriteFileRequest {
    /// Path to the file, relative to the working directory.
    pub path: String,
    /// Part of the file to replace. Exactly as it appears in the file, no extra escape codes.
    /// When only adding new code, search for surrounding lines and include them in the
    /// replacement. There should be only one match. If empty, entire file will be rewritten.
    #[serde(default)]
    pub search: String,
    /// Text to replace search with. Perfectly formatted, with correct indentation, as it's
    /// supposed to look like in the file.
    #[serde(alias = "text")]
    pub replace: String,
}

#[derive(Clone)]
pub struct WriteFileTool {
    gateway: FileAccessGateway,
}

impl WriteFileTool {
    pub fn new(gateway: FileAccessGateway) -> Self {
        Self { gateway }
    }
}

#[async_trait::async_trait]
impl ToolExecutor for WriteFileTool {
    fn name(&self) -> &'static str {
        "write_file"
    }

    fn description(&self) -> &'static str {
        "Writes file contents to given path. Returns OK or an error message."
    }

    fn input_schema(&self) -> Value {
        schema_of::<WriteFileRequest>()
    }

    async fn execute(&self, request: &ToolRequest) -> Result<ToolOutput> {
        let args: WriteFileRequest = match decode_arguments(&request.arguments) {
            Ok(args) => args,
            Err(e) => return Ok(ToolOutput::Error(e)),
        };

        match self.gateway.write(&args.path, &args.search, &args.replace).await {
            Ok(_) => Ok(ToolOutput::Success("OK".to_string())),
            Err(e) => access_failure("update", &args.path, e),
        }
    }
}
