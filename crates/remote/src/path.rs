//! Remote path validation.
//!
//! Repository paths are always `/`-separated regardless of platform, so this
//! works on strings rather than [`std::path::Path`].

use crate::error::{ErrorKind, Result};

/// Validates a repository path for security and correctness.
/// Ensures that paths don't escape the repository root (no `..` traversal).
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use gallery_remote::validate_path;
/// // Valid paths
/// assert!(validate_path("images/1700000000000_cat.png").is_ok());
/// assert!(validate_path("a/../images").is_ok()); // (never leaves repository root)
/// // Invalid paths
/// assert!(validate_path("../secrets").is_err());
/// assert!(validate_path("a/../../b").is_err());
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(validate_path("wrong/../audio//./1_song.mp3/").unwrap(), "audio/1_song.mp3");
/// ```
pub fn validate(path: impl AsRef<str>) -> Result<String> {
    let raw = path.as_ref();
    let mut components: Vec<&str> = Vec::new();
    for component in raw.split('/') {
        match component {
            "" | "." => {},
            ".." => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(raw.to_string()));
                }
            },
            // Null bytes truncate in anything C-based on the other end.
            s if s.contains('\0') => exn::bail!(ErrorKind::InvalidPath(raw.to_string())),
            s => components.push(s),
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(raw.to_string())),
        false => Ok(components.join("/")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("images/1_a.png", "images/1_a.png")]
    #[case("videos", "videos")]
    #[case("a//b//c", "a/b/c")]
    #[case("a/./b/./c", "a/b/c")]
    #[case("/audio/1_x.mp3", "audio/1_x.mp3")]
    #[case("images/", "images")]
    #[case("a/b/..", "a")]
    #[case("images/1_with space.png", "images/1_with space.png")]
    fn test_valid_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("./")]
    #[case("//")]
    #[case("..")]
    #[case("../etc/passwd")]
    #[case("a/../../b")]
    #[case("a\0b")]
    fn test_invalid_paths(#[case] input: &str) {
        let err = validate(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }
}
