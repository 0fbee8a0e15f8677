//! File operations
//!
//! Buffered file copy with modification time preservation, plus the
//! incremental-copy predicate that compares source and destination mtimes.

use crate::error::{BackupError, IoResultExt, Result};
use filetime::FileTime;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Buffer size for copy I/O
const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// Copy a file, preserving its modification time. Returns the bytes written.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64> {
    let src_file = File::open(source).with_path(source)?;
    let dst_file = File::create(dest).with_path(dest)?;

    let size = src_file.metadata().with_path(source)?.len();
    if size > 0 {
        let _ = dst_file.set_len(size);
    }

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, src_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dst_file);

    let bytes_copied =
        std::io::copy(&mut reader, &mut writer).map_err(|e| BackupError::io(source, e))?;

    writer.flush().with_path(dest)?;

    preserve_mtime(source, dest)?;

    Ok(bytes_copied)
}

/// Carry the source modification time over to the destination
fn preserve_mtime(source: &Path, dest: &Path) -> Result<()> {
    let metadata = std::fs::metadata(source).with_path(source)?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_mtime(dest, mtime).with_path(dest)?;
    Ok(())
}

/// Create a directory and any missing parents; succeeds if it already exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).with_path(path)?;
    Ok(())
}

/// Incremental predicate: is the source strictly newer than the destination?
///
/// Equal modification times mean the destination is current and must not be
/// overwritten.
pub fn is_source_newer(source: &Path, dest: &Path) -> Result<bool> {
    let src_meta = std::fs::metadata(source).with_path(source)?;
    let dst_meta = std::fs::metadata(dest).with_path(dest)?;

    let src_mtime = FileTime::from_last_modification_time(&src_meta);
    let dst_mtime = FileTime::from_last_modification_time(&dst_meta);

    Ok(src_mtime > dst_mtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_copy_file_contents_and_size() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();

        let src = create_test_file(src_dir.path(), "a.txt", b"hello backup");
        let dst = dst_dir.path().join("a.txt");

        let bytes = copy_file(&src, &dst).unwrap();
        assert_eq!(bytes, 12);
        assert_eq!(std::fs::read(&dst).unwrap(), b"hello backup");
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();

        let src = create_test_file(src_dir.path(), "a.txt", b"data");
        let old = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_mtime(&src, old).unwrap();

        let dst = dst_dir.path().join("a.txt");
        copy_file(&src, &dst).unwrap();

        let dst_meta = std::fs::metadata(&dst).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&dst_meta), old);
    }

    #[test]
    fn test_copy_empty_file() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();

        let src = create_test_file(src_dir.path(), "empty", b"");
        let dst = dst_dir.path().join("empty");

        let bytes = copy_file(&src, &dst).unwrap();
        assert_eq!(bytes, 0);
        assert!(dst.exists());
    }

    #[test]
    fn test_ensure_dir_idempotent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");

        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_is_source_newer_strict() {
        let dir = TempDir::new().unwrap();
        let src = create_test_file(dir.path(), "src", b"x");
        let dst = create_test_file(dir.path(), "dst", b"x");

        let base = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&src, base).unwrap();
        filetime::set_file_mtime(&dst, base).unwrap();
        assert!(!is_source_newer(&src, &dst).unwrap());

        let newer = FileTime::from_unix_time(1_600_000_001, 0);
        filetime::set_file_mtime(&src, newer).unwrap();
        assert!(is_source_newer(&src, &dst).unwrap());

        filetime::set_file_mtime(&dst, FileTime::from_unix_time(1_600_000_002, 0)).unwrap();
        assert!(!is_source_newer(&src, &dst).unwrap());
    }
}
