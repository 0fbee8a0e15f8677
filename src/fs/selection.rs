//! Backup selection entries and the pre-run file count
//!
//! The selection is the user-chosen list of files and directories to back
//! up. Before any copying starts the engine walks the whole selection once
//! to fix the total number of progress units for the run.

use crate::fs::ExclusionSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a selection entry points at on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Missing, unreadable, or a special file (socket, device, ...)
    Other,
}

/// One user-chosen file or directory to back up
#[derive(Debug, Clone)]
pub struct SelectionEntry {
    /// Absolute path of the entry
    pub path: PathBuf,
    /// Kind observed at selection time
    pub kind: SelectionKind,
}

impl SelectionEntry {
    /// Classify a path into a selection entry
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = match std::fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => SelectionKind::Directory,
            Ok(meta) if meta.is_file() => SelectionKind::File,
            _ => SelectionKind::Other,
        };
        Self { path, kind }
    }
}

/// Count the progress units a backup of `roots` will emit.
///
/// Every file outside an excluded subtree is one unit, including files that
/// will be skipped for their suffix. An exactly-excluded entry (file or
/// directory) is one unit and its subtree contributes nothing, matching the
/// single unit the worker emits when it prunes it.
pub fn count_total_files(roots: &[PathBuf], exclusions: &ExclusionSet) -> u64 {
    let mut total = 0u64;

    for root in roots {
        total += count_one_root(root, exclusions);
    }

    total
}

fn count_one_root(root: &Path, exclusions: &ExclusionSet) -> u64 {
    let mut total = 0u64;
    let mut walker = WalkDir::new(root).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            // Unreadable subtrees emit no progress at run time either
            Err(_) => continue,
        };

        // Exclusion rules apply to children, never to the selection root
        if entry.depth() == 0 {
            if entry.file_type().is_file() {
                total += 1;
            }
            continue;
        }

        if exclusions.is_excluded_path(entry.path()) {
            total += 1;
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        if entry.file_type().is_file() {
            total += 1;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn test_selection_kind() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f");
        touch(&file);

        assert_eq!(
            SelectionEntry::from_path(dir.path()).kind,
            SelectionKind::Directory
        );
        assert_eq!(SelectionEntry::from_path(&file).kind, SelectionKind::File);
        assert_eq!(
            SelectionEntry::from_path(dir.path().join("missing")).kind,
            SelectionKind::Other
        );
    }

    #[test]
    fn test_count_nested_tree() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        touch(&dir.path().join("top.txt"));
        touch(&dir.path().join("a/one.txt"));
        touch(&dir.path().join("a/b/two.txt"));

        let roots = vec![dir.path().to_path_buf()];
        assert_eq!(count_total_files(&roots, &ExclusionSet::default()), 3);
    }

    #[test]
    fn test_excluded_directory_counts_once() {
        let dir = TempDir::new().unwrap();
        let skipped = dir.path().join("skipped");
        fs::create_dir_all(skipped.join("deep")).unwrap();
        touch(&skipped.join("a.txt"));
        touch(&skipped.join("deep/b.txt"));
        touch(&dir.path().join("kept.txt"));

        let exclusions = ExclusionSet::new(vec![skipped], vec![]);
        let roots = vec![dir.path().to_path_buf()];

        // one unit for the pruned directory, one for kept.txt
        assert_eq!(count_total_files(&roots, &exclusions), 2);
    }

    #[test]
    fn test_suffix_excluded_files_still_counted() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("keep.txt"));
        touch(&dir.path().join("drop.tmp"));

        let exclusions = ExclusionSet::new(vec![], vec![".tmp".to_string()]);
        let roots = vec![dir.path().to_path_buf()];

        assert_eq!(count_total_files(&roots, &exclusions), 2);
    }

    #[test]
    fn test_root_file_selection() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("single.txt");
        touch(&file);

        assert_eq!(count_total_files(&[file], &ExclusionSet::default()), 1);
    }
}
