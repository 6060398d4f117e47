use crate::file::error::{AccessError, FileError};
use crate::file::modify::apply_edit;
use crate::file::resolver::{ResolvedPath, Resolver};
use crate::sync::StalenessCache;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

/// One entry of a directory listing as shown to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    pub path: String,
    pub is_dir: bool,
    pub synced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Updated,
}

/// The only way the assistant touches the working directory.
#[derive(Clone)]
pub struct FileAccessGateway {
    resolver: Resolver,
    cache: Arc<StalenessCache>,
}

impl FileAccessGateway {
    pub fn new(cache: Arc<StalenessCache>) -> Self {
        let resolver = Resolver::new(cache.tree().root().to_path_buf());
        Self { resolver, cache }
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn cache(&self) -> &Arc<StalenessCache> {
        &self.cache
    }

    /// Reads a whole file as UTF-8 and marks it synced.
    pub async fn read(&self, path: &str) -> Result<String, FileError> {
        let resolved = self.resolve("read", path)?;
        let shown = self.display(&resolved);

        let metadata = fs::metadata(&resolved.real_path).await?;
        if metadata.is_dir() {
            return Err(AccessError::is_a_directory().into());
        }

        info!("Reading {shown}");
        let content = fs::read_to_string(&resolved.real_path).await?;
        self.cache.mark_synced(&resolved.real_path).await?;
        Ok(content)
    }

    /// With an empty `search` the file is replaced by `replace` (and created
    /// with its parent directories if needed). Otherwise `search` has to
    /// occur exactly once in the existing file.
    pub async fn write(
        &self,
        path: &str,
        search: &str,
        replace: &str,
    ) -> Result<WriteOutcome, FileError> {
        let resolved = self.resolve("write", path)?;
        let shown = self.display(&resolved);
        let target = &resolved.real_path;

        let existing = match fs::metadata(target).await {
            Ok(metadata) if metadata.is_dir() => {
                return Err(AccessError::is_a_directory().into());
            }
            Ok(_) => Some(fs::read_to_string(target).await?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let (content, outcome) = match (existing, search.is_empty()) {
            (None, true) => (replace.to_string(), WriteOutcome::Created),
            (Some(_), true) => (replace.to_string(), WriteOutcome::Updated),
            (None, false) => return Err(AccessError::NotFound.into()),
            (Some(current), false) => {
                (apply_edit(&current, search, replace)?, WriteOutcome::Updated)
            }
        };

        match outcome {
            WriteOutcome::Created => info!("Creating {shown}"),
            WriteOutcome::Updated => info!("Updating {shown}"),
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(target, content).await?;

        self.cache.mark_synced(target).await?;
        self.cache.invalidate_ancestors(target).await?;
        Ok(outcome)
    }

    /// Lists the visible direct children of a directory, the root when
    /// `path` is `None`. Each entry reports whether the model has seen its
    /// current content; the directory itself is marked synced.
    pub async fn list(&self, path: Option<&str>) -> Result<Vec<ListEntry>, FileError> {
        let resolved = self.resolve("list", path.unwrap_or("."))?;
        let shown = self.display(&resolved);

        let metadata = fs::metadata(&resolved.real_path).await?;
        if !metadata.is_dir() {
            return Err(AccessError::not_a_directory().into());
        }

        info!("Listing {shown}");
        let tree = self.cache.tree();
        let children = tree.visible_children(&resolved.real_path).await?;

        let mut entries = Vec::with_capacity(children.len());
        for child in children {
            let synced = self.cache.is_synced(&child.path).await?;
            entries.push(ListEntry {
                path: tree.display_relative(&child.path),
                is_dir: child.is_dir,
                synced,
            });
        }

        self.cache.mark_synced(&resolved.real_path).await?;
        Ok(entries)
    }

    fn resolve(&self, operation: &str, path: &str) -> Result<ResolvedPath, AccessError> {
        self.resolver.resolve(path).inspect_err(|e| {
            warn!("Refused to {operation} {path}: {e}");
        })
    }

    fn display(&self, resolved: &ResolvedPath) -> String {
        self.cache.tree().display_relative(&resolved.real_path)
    }
}
