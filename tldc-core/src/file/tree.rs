use crate::file::exclude::Exclusions;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::warn;
use walkdir::WalkDir;

/// A direct child of a directory, as seen through the exclusion rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// Modification time in nanoseconds since the epoch, 0 when unavailable
    pub mtime_nanos: u128,
}

/// The directory the assistant operates in.
#[derive(Debug, Clone)]
pub struct WorkingDirectory {
    root: PathBuf,
    exclusions: Exclusions,
}

impl WorkingDirectory {
    pub fn new(root: &Path, exclusions: Exclusions) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Working directory {} does not exist", root.display()))?;
        if !root.is_dir() {
            bail!("Working directory {} is not a directory", root.display());
        }
        Ok(Self { root, exclusions })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path relative to the root, `None` if `path` lies outside it
    pub fn relative<'a>(&self, path: &'a Path) -> Option<&'a Path> {
        path.strip_prefix(&self.root).ok()
    }

    /// Relative path as shown to the model; the root itself is `.`
    pub fn display_relative(&self, path: &Path) -> String {
        match self.relative(path) {
            Some(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Some(rel) => rel.to_string_lossy().into_owned(),
            None => path.to_string_lossy().into_owned(),
        }
    }

    /// Inside the root and not hidden by an exclusion rule
    pub fn is_visible(&self, path: &Path) -> bool {
        self.relative(path)
            .is_some_and(|rel| !self.exclusions.is_excluded(rel))
    }

    /// Every visible path below the root, the root included, in a stable
    /// order. Fails when more than `limit` paths are found.
    pub fn enumerate(&self, limit: usize) -> Result<Vec<PathBuf>> {
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.is_visible(entry.path()));

        let mut paths = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable entry during enumeration");
                    continue;
                }
            };

            if paths.len() == limit {
                bail!(
                    "Working directory {} holds more than {limit} paths; \
                     raise max_tracked_paths or exclude large directories",
                    self.root.display()
                );
            }
            paths.push(entry.into_path());
        }
        Ok(paths)
    }

    /// Visible direct children of `dir`, sorted by name.
    pub async fn visible_children(&self, dir: &Path) -> std::io::Result<Vec<ChildEntry>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut children = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !self.is_visible(&path) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(?path, error = %e, "Skipping entry without metadata");
                    continue;
                }
            };

            children.push(ChildEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                is_dir: metadata.is_dir(),
                mtime_nanos: mtime_nanos(&metadata),
            });
        }

        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }
}

fn mtime_nanos(metadata: &std::fs::Metadata) -> u128 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_nanos())
        .unwrap_or(0)
}
