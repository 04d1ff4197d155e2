use boot_error::{Error, Result};
use core::fmt;

/// Syslog severity. Lower is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SyslogLevel {
    Emerg = 0,
    Alert = 1,
    Crit = 2,
    Err = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

impl SyslogLevel {
    pub const ALL: [Self; 8] = [
        Self::Emerg,
        Self::Alert,
        Self::Crit,
        Self::Err,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
    ];

    /// Interpret a raw level; anything outside `0..=7` becomes [`Self::Debug`].
    #[must_use]
    pub const fn from_raw(level: u8) -> Self {
        match level {
            0 => Self::Emerg,
            1 => Self::Alert,
            2 => Self::Crit,
            3 => Self::Err,
            4 => Self::Warning,
            5 => Self::Notice,
            6 => Self::Info,
            _ => Self::Debug,
        }
    }

    /// The ASCII digit used in the `<N>` prefix.
    #[must_use]
    pub const fn digit(self) -> u8 {
        b'0' + self as u8
    }
}

impl fmt::Display for SyslogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.digit() as char)
    }
}

impl From<log::Level> for SyslogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Err,
            log::Level::Warn => Self::Warning,
            log::Level::Info => Self::Info,
            log::Level::Debug | log::Level::Trace => Self::Debug,
        }
    }
}

/// Whether `msg` starts with a well-formed `<N>` prefix.
#[must_use]
pub fn is_syslog_message(msg: &[u8]) -> bool {
    matches!(msg, [b'<', b'0'..=b'7', b'>', ..])
}

/// Severity of a syslog record.
///
/// # Errors
/// [`Error::InvalidParameter`] if `msg` has no `<N>` prefix.
pub fn syslog_get_message_level(msg: &[u8]) -> Result<SyslogLevel> {
    if !is_syslog_message(msg) {
        return Err(Error::InvalidParameter);
    }
    Ok(SyslogLevel::from_raw(msg[1] - b'0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_round_trips() {
        for level in SyslogLevel::ALL {
            let mut msg = std::format!("{level}x").into_bytes();
            assert_eq!(syslog_get_message_level(&msg), Ok(level));
            msg[1] = b'8';
            assert_eq!(syslog_get_message_level(&msg), Err(Error::InvalidParameter));
        }
    }

    #[test]
    fn malformed_prefixes() {
        for msg in [&b""[..], b"<", b"<4", b"4>x", b"(4)x", b"<x>"] {
            assert!(!is_syslog_message(msg));
        }
        assert!(is_syslog_message(b"<0>"));
    }

    #[test]
    fn raw_levels_clamp_to_debug() {
        assert_eq!(SyslogLevel::from_raw(3), SyslogLevel::Err);
        assert_eq!(SyslogLevel::from_raw(8), SyslogLevel::Debug);
        assert_eq!(SyslogLevel::from_raw(255), SyslogLevel::Debug);
    }

    #[test]
    fn log_crate_levels() {
        assert_eq!(SyslogLevel::from(log::Level::Error), SyslogLevel::Err);
        assert_eq!(SyslogLevel::from(log::Level::Warn), SyslogLevel::Warning);
        assert_eq!(SyslogLevel::from(log::Level::Info), SyslogLevel::Info);
        assert_eq!(SyslogLevel::from(log::Level::Trace), SyslogLevel::Debug);
    }
}
