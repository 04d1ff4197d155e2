//! Record formatting into the fixed scratch buffer.

use crate::SyslogLevel;
use core::fmt::{self, Write};

/// Longest record including its NUL terminator.
pub const LOG_MAX_LEN: usize = 1024;

/// A `fmt::Write` over a fixed slice that silently truncates, always at a
/// UTF-8 character boundary.
pub(crate) struct TruncatingWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> TruncatingWriter<'a> {
    pub(crate) const fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }
}

impl Write for TruncatingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let remaining = self.buf.len() - self.len;
        let mut take = s.len().min(remaining);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

/// Format `<N>body\n` into `scratch` and return the record length (without
/// the NUL, which is written too).
///
/// Long bodies are truncated; the trailing newline is always present.
pub(crate) fn format_record(
    scratch: &mut [u8; LOG_MAX_LEN],
    level: SyslogLevel,
    args: fmt::Arguments<'_>,
) -> usize {
    scratch[0] = b'<';
    scratch[1] = level.digit();
    scratch[2] = b'>';

    // Room for the newline and the NUL.
    let mut w = TruncatingWriter::new(&mut scratch[3..LOG_MAX_LEN - 2]);
    let _ = w.write_fmt(args);
    let mut len = 3 + w.len();

    if scratch[len - 1] != b'\n' {
        scratch[len] = b'\n';
        len += 1;
    }
    scratch[len] = 0;
    len
}
