use alloc::string::String;
use boot_error::{Error, Result};

/// C-locale `isspace`.
#[must_use]
pub const fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

/// Trim, and collapse every whitespace run into a single space.
#[must_use]
pub fn str_merge_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split(is_space).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Optional `-` followed by decimal digits only. The empty string counts.
#[must_use]
pub fn is_number(s: &str) -> bool {
    s.strip_prefix('-')
        .unwrap_or(s)
        .bytes()
        .all(|b| b.is_ascii_digit())
}

/// Insert `c` at byte `offset`.
///
/// # Errors
/// [`Error::InvalidParameter`] if `offset` is past the end or inside a
/// character.
pub fn insert_char(s: &mut String, c: char, offset: usize) -> Result<()> {
    if !s.is_char_boundary(offset) {
        return Err(Error::InvalidParameter);
    }
    s.insert(offset, c);
    Ok(())
}

/// Remove the character at byte `offset`.
///
/// # Errors
/// [`Error::InvalidParameter`] if there is no character starting there.
pub fn delete_char(s: &mut String, offset: usize) -> Result<()> {
    if offset >= s.len() || !s.is_char_boundary(offset) {
        return Err(Error::InvalidParameter);
    }
    s.remove(offset);
    Ok(())
}

/// Offset of the first ASCII case-insensitive occurrence of `needle` in
/// `haystack`. The haystack need not be text.
#[must_use]
pub fn mem_strcasestr(haystack: &[u8], needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_spaces() {
        assert_eq!(str_merge_spaces("  a \t\x0b b\r\n"), "a b");
        assert_eq!(str_merge_spaces(" \n "), "");
        assert_eq!(str_merge_spaces("x"), "x");
    }

    #[test]
    fn numbers() {
        assert!(is_number("-12"));
        assert!(is_number(""));
        assert!(is_number("-"));
        assert!(!is_number("1-2"));
        assert!(!is_number("0x10"));
    }

    #[test]
    fn edit_in_place() {
        let mut s = String::from("bot");
        insert_char(&mut s, 'o', 1).unwrap();
        insert_char(&mut s, '!', 4).unwrap();
        assert_eq!(s, "boot!");
        assert_eq!(insert_char(&mut s, 'x', 6), Err(Error::InvalidParameter));

        delete_char(&mut s, 4).unwrap();
        assert_eq!(s, "boot");
        assert_eq!(delete_char(&mut s, 4), Err(Error::InvalidParameter));

        let mut u = String::from("é");
        assert_eq!(delete_char(&mut u, 1), Err(Error::InvalidParameter));
    }

    #[test]
    fn case_insensitive_search() {
        assert_eq!(mem_strcasestr(b"\x00\xffVMware Inc", "vmWARE"), Some(2));
        assert_eq!(mem_strcasestr(b"abc", "abcd"), None);
        assert_eq!(mem_strcasestr(b"abc", ""), Some(0));
    }
}
