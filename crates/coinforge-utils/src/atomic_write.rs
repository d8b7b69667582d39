//! Atomic file operations
//!
//! Writes go to a temporary file in the target directory, are fsynced,
//! then atomically renamed over the destination. A copy→fsync→replace
//! fallback covers the cross-filesystem case.

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use std::io::Write;

use tempfile::NamedTempFile;

/// Atomically write content to a file using temp file + fsync + rename.
///
/// Line endings are normalized to LF so saved artifacts diff cleanly
/// across platforms.
pub fn write_file_atomic(path: &Utf8Path, content: &str) -> Result<()> {
    let normalized_content = normalize_line_endings(content);

    if let Some(parent) = path.parent() {
        crate::paths::ensure_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {parent}"))?;
    }

    // Temp file must live in the target directory so the rename stays on
    // one filesystem in the common case.
    let temp_dir = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let mut temp_file = NamedTempFile::new_in(temp_dir)
        .with_context(|| format!("Failed to create temporary file in: {temp_dir}"))?;

    temp_file
        .write_all(normalized_content.as_bytes())
        .context("Failed to write content to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to fsync temporary file")?;

    let temp_path = temp_file.path().to_path_buf();
    match temp_file.persist(path.as_std_path()) {
        Ok(_) => Ok(()),
        Err(persist_error) if is_cross_filesystem_error(&persist_error.error) => {
            // copy→fsync→replace fallback
            fs::copy(&temp_path, path.as_std_path())
                .with_context(|| format!("Cross-filesystem copy failed for: {path}"))?;
            let f = fs::File::open(path.as_std_path())
                .with_context(|| format!("Failed to reopen for fsync: {path}"))?;
            f.sync_all()
                .with_context(|| format!("Failed to fsync destination: {path}"))?;
            let _ = fs::remove_file(&temp_path);
            Ok(())
        }
        Err(persist_error) => Err(anyhow::Error::new(persist_error.error))
            .with_context(|| format!("Failed to atomically write file: {path}")),
    }
}

/// Normalize line endings to LF
fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}

fn is_cross_filesystem_error(e: &std::io::Error) -> bool {
    // EXDEV on unix; CrossesDevices is unstable, so match on raw errno.
    #[cfg(unix)]
    {
        e.raw_os_error() == Some(libc_exdev())
    }
    #[cfg(not(unix))]
    {
        let _ = e;
        false
    }
}

#[cfg(unix)]
const fn libc_exdev() -> i32 {
    18 // EXDEV
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn writes_content_atomically() {
        let td = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(td.path().join("nested/out.md")).unwrap();

        write_file_atomic(&path, "hello\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");

        // Overwrite succeeds and replaces content
        write_file_atomic(&path, "goodbye\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "goodbye\n");
    }

    #[test]
    fn normalizes_crlf_to_lf() {
        let td = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(td.path().join("out.txt")).unwrap();

        write_file_atomic(&path, "a\r\nb\rc\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\nc\n");
    }
}
