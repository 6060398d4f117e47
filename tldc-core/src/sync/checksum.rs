use crate::file::tree::WorkingDirectory;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Checksum of a path that does not exist or cannot be read.
pub const MISSING_CHECKSUM: &str = "missing";

/// Content checksum of a file, or of a directory's listing.
///
/// A directory hashes the names and modification times of its visible
/// direct children, so it changes when a child is added, removed, renamed or
/// touched, but not when something deeper in the tree changes.
pub async fn checksum(tree: &WorkingDirectory, path: &Path) -> String {
    let Ok(metadata) = tokio::fs::metadata(path).await else {
        return MISSING_CHECKSUM.to_string();
    };

    if metadata.is_dir() {
        directory_checksum(tree, path).await
    } else {
        file_checksum(path).await
    }
}

async fn file_checksum(path: &Path) -> String {
    match tokio::fs::read(path).await {
        Ok(bytes) => format!("{:x}", Sha256::digest(&bytes)),
        Err(_) => MISSING_CHECKSUM.to_string(),
    }
}

async fn directory_checksum(tree: &WorkingDirectory, path: &Path) -> String {
    let Ok(children) = tree.visible_children(path).await else {
        return MISSING_CHECKSUM.to_string();
    };

    let mut hasher = Sha256::new();
    for child in &children {
        hasher.update(child.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(child.mtime_nanos.to_string().as_bytes());
        hasher.update([b'\n']);
    }
    format!("{:x}", hasher.finalize())
}
