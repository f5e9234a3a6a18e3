//! Utility functions and helpers.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Expands a path starting with `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is empty.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        anyhow::bail!("Path cannot be empty");
    }
    if path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return Ok(home.join(&path[2..]));
        }
    }
    Ok(PathBuf::from(path))
}

/// Make `path` relative to `base` if possible, otherwise return `path` as is.
///
/// # Errors
/// If `base` is not a prefix of `path`, an error is returned.
pub fn make_relative(path: &Path, base: &Path) -> Result<PathBuf> {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .map_err(|_| anyhow::anyhow!("{} is not under {}", path.display(), base.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_plain_path() {
        let path = expand_tilde("/etc/hosts").unwrap();
        assert_eq!(path, PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn test_expand_tilde_empty_fails() {
        assert!(expand_tilde("").is_err());
    }

    #[test]
    fn test_make_relative() {
        let rel = make_relative(Path::new("/home/user/x"), Path::new("/home/user")).unwrap();
        assert_eq!(rel, PathBuf::from("x"));
        assert!(make_relative(Path::new("/srv/x"), Path::new("/home/user")).is_err());
    }
}
