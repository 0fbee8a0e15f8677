//! Exclusion rules
//!
//! An [`ExclusionSet`] is built once per run and shared read-only between all
//! workers. It answers two questions: is this exact path excluded, and does
//! this file name end with an excluded suffix.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Immutable set of exclusion rules for a backup run
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    /// Exact paths to skip (files or whole directory subtrees)
    exact: HashSet<PathBuf>,
    /// File name suffixes to skip, e.g. ".tmp" or "~"
    suffixes: Vec<String>,
}

impl ExclusionSet {
    /// Build an exclusion set from explicit paths and file name suffixes
    pub fn new(
        paths: impl IntoIterator<Item = PathBuf>,
        suffixes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            exact: paths.into_iter().collect(),
            suffixes: suffixes
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Check whether the path itself is excluded
    pub fn is_excluded_path(&self, path: &Path) -> bool {
        self.exact.contains(path)
    }

    /// Check whether the file name ends with an excluded suffix
    pub fn matches_suffix(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    /// True when no rule is configured
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.suffixes.is_empty()
    }

    /// Excluded exact paths, for reporting
    pub fn excluded_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.exact.iter().cloned().collect();
        paths.sort();
        paths
    }
}
