use crate::settings::Settings;
use std::collections::HashSet;
use std::path::{Component, Path};

/// Paths that never take part in tracking or listing.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    /// Matched against the full relative path and each of its ancestors
    exact: HashSet<String>,
    /// Matched against every component of the relative path
    anywhere: HashSet<String>,
}

impl Exclusions {
    pub fn new(exact: &[String], anywhere: &[String]) -> Self {
        Self {
            exact: exact.iter().map(|p| p.trim_matches('/').to_string()).collect(),
            anywhere: anywhere.iter().cloned().collect(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.exclude, &settings.exclude_anywhere)
    }

    /// `relative` is relative to the working directory root. The root itself
    /// (an empty path) is never excluded.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let mut prefix = String::new();
        for component in relative.components() {
            let Component::Normal(name) = component else {
                continue;
            };
            let name = name.to_string_lossy();

            if self.anywhere.contains(name.as_ref()) {
                return true;
            }

            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(&name);
            if self.exact.contains(&prefix) {
                return true;
            }
        }
        false
    }
}
