use crate::is_space;
use alloc::string::String;
use boot_error::{Error, Result};

/// Leading `/` or `\`, or a URL.
#[must_use]
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(['/', '\\']) || path.contains("://")
}

/// Drop whitespace and fold every run of `/` and `\` into one `/`. The
/// `//` of the first `scheme://` survives.
#[must_use]
pub fn sanitize_path(path: &str) -> String {
    // Byte range of the "//" in the first "://", if any.
    let scheme = path.find("://").map(|i| i + 1..i + 3);

    let mut out = String::with_capacity(path.len());
    let mut slash = false;
    for (i, c) in path.char_indices() {
        if is_space(c) {
            continue;
        }
        if c == '/' || c == '\\' {
            if !slash || scheme.as_ref().is_some_and(|r| r.contains(&i)) {
                out.push('/');
                slash = true;
            }
        } else {
            out.push(c);
            slash = false;
        }
    }
    out
}

/// `rel` made absolute against `root`, then sanitized.
///
/// # Errors
/// [`Error::InvalidParameter`] for a relative path without a root.
pub fn make_path(root: &str, rel: &str) -> Result<String> {
    let rel = rel.trim_start_matches(is_space);
    if is_absolute(rel) {
        return Ok(sanitize_path(rel));
    }

    let root = root.trim_start_matches(is_space);
    if root.is_empty() {
        return Err(Error::InvalidParameter);
    }
    let mut joined = String::with_capacity(root.len() + 1 + rel.len());
    joined.push_str(root);
    joined.push('/');
    joined.push_str(rel);
    Ok(sanitize_path(&joined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize() {
        assert_eq!(sanitize_path(" \\EFI\\\\BOOT// survey.cfg "), "/EFI/BOOT/survey.cfg");
        assert_eq!(sanitize_path("tftp://10.0.0.1//boot///a"), "tftp://10.0.0.1/boot/a");
        assert_eq!(sanitize_path("file:\\\\\\x"), "file:/x");
    }

    #[test]
    fn joining() {
        assert_eq!(make_path("/a/", "b").unwrap(), "/a/b");
        assert_eq!(make_path("  /a", " b//c").unwrap(), "/a/b/c");
        assert_eq!(make_path("/a", "\\b").unwrap(), "/b");
        assert_eq!(make_path("", "b"), Err(Error::InvalidParameter));
        assert_eq!(make_path("", "/b").unwrap(), "/b");
    }
}
