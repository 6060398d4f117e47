pub mod list_dir;
pub mod read_file;
pub mod write_file;

use crate::file::FileError;
use crate::tools::r#trait::ToolOutput;

/// Turns a gateway failure into something the model can act on. Storage
/// failures are not the model's business and end the turn instead.
fn access_failure(operation: &str, path: &str, error: FileError) -> anyhow::Result<ToolOutput> {
    match error {
        FileError::Access(e) => Ok(ToolOutput::Error(format!("Trying to {operation} {path}: {e}"))),
        FileError::Storage(e) => Err(e),
    }
}
