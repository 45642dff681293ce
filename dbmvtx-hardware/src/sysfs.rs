//! Plain-text attribute file helpers

use dbmvtx_core::{PlatformError, Result};
use std::fs;
use std::path::Path;

/// Read a text attribute and strip surrounding whitespace
pub fn read_trimmed(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?.trim().to_string())
}

/// Read a text attribute holding a decimal integer
pub fn read_int(path: &Path) -> Result<i64> {
    let text = read_trimmed(path)?;
    text.parse::<i64>().map_err(|e| {
        PlatformError::Parse(format!("{}: '{}' is not an integer: {}", path.display(), text, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_trimmed_strips_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state");
        fs::write(&path, "active\n").unwrap();

        assert_eq!(read_trimmed(&path).unwrap(), "active");
    }

    #[test]
    fn test_read_int() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("timeleft");
        fs::write(&path, " 42\n").unwrap();
        assert_eq!(read_int(&path).unwrap(), 42);

        fs::write(&path, "soon").unwrap();
        assert!(matches!(read_int(&path), Err(PlatformError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = read_trimmed(&dir.path().join("missing"));
        assert!(matches!(result, Err(PlatformError::Io(_))));
    }
}
