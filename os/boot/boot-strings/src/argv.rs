use crate::is_space;
use alloc::string::String;
use alloc::vec::Vec;
use boot_error::{Error, Result};

/// Split a command line into arguments.
///
/// `'` and `"` quote: inside a quoted run, whitespace (and `&` when
/// `amp_separates`) is literal and the other quote character is an
/// ordinary character. Quote characters themselves are dropped.
///
/// # Errors
/// [`Error::Syntax`] for an unterminated quote.
pub fn str_to_argv(cmdline: &str, amp_separates: bool) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut current: Option<String> = None;
    let mut quote = None;

    for c in cmdline.chars() {
        if c == '\'' || c == '"' {
            match quote {
                None => {
                    quote = Some(c);
                    continue;
                }
                Some(q) if q == c => {
                    quote = None;
                    continue;
                }
                Some(_) => {}
            }
        }

        let separator = quote.is_none() && (is_space(c) || (amp_separates && c == '&'));
        if separator {
            args.extend(current.take());
        } else {
            current.get_or_insert_with(String::new).push(c);
        }
    }

    if quote.is_some() {
        return Err(Error::Syntax);
    }
    args.extend(current);
    Ok(args)
}

/// Join arguments with single spaces.
#[must_use]
pub fn argv_to_str<S: AsRef<str>>(argv: &[S]) -> String {
    let mut out = String::new();
    for (i, arg) in argv.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(arg.as_ref());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(
            str_to_argv(r#"a "b c" 'd "e"' f"g"h"#, false).unwrap(),
            ["a", "b c", r#"d "e""#, "fgh"]
        );
        assert_eq!(str_to_argv("  ", false).unwrap(), Vec::<String>::new());
        assert_eq!(str_to_argv(r#"a "" b"#, false).unwrap(), ["a", "b"]);
        assert_eq!(str_to_argv("a 'b", false), Err(Error::Syntax));
    }

    #[test]
    fn ampersand() {
        assert_eq!(str_to_argv("a=1&b=2", true).unwrap(), ["a=1", "b=2"]);
        assert_eq!(str_to_argv("a=1&b=2", false).unwrap(), ["a=1&b=2"]);
        assert_eq!(str_to_argv("'a&b'&c", true).unwrap(), ["a&b", "c"]);
    }
}
