use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// An existing file is replaced; a reader never sees a half-written report.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            parent
        }
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        atomic_write(&path, b"# Board").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Board");
    }

    #[test]
    fn atomic_write_overwrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("README.md");
        std::fs::write(&path, "old content that is longer").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn atomic_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("docs/board/README.md");
        atomic_write(&path, b"x").unwrap();
        assert!(path.exists());
    }
}
