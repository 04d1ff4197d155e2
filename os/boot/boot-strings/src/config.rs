//! # Configuration Files
//!
//! One `KEY <sep> VALUE` pair per line:
//!
//! ```text
//! # comment
//! verbose = 1
//! title=ESXi   installer
//! ```
//!
//! Keys match ASCII case-insensitively, blanks around the separator are
//! ignored and whitespace runs inside the value collapse to one space.
//! Unknown keys are skipped.

use crate::{is_number, str_merge_spaces};
use alloc::string::{String, ToString};
use boot_error::{Error, Result};
use boot_firmware::Firmware;
use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Str(Option<String>),
    Int(i64),
}

/// One recognised key and the value parsed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOption {
    pub key: &'static str,
    pub separator: char,
    pub value: ConfigValue,
}

impl ConfigOption {
    #[must_use]
    pub const fn string(key: &'static str, separator: char) -> Self {
        Self {
            key,
            separator,
            value: ConfigValue::Str(None),
        }
    }

    #[must_use]
    pub const fn integer(key: &'static str, separator: char) -> Self {
        Self {
            key,
            separator,
            value: ConfigValue::Int(0),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            ConfigValue::Str(s) => s.as_deref(),
            ConfigValue::Int(_) => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self.value {
            ConfigValue::Int(v) => Some(v),
            ConfigValue::Str(_) => None,
        }
    }

    fn reset(&mut self) {
        self.value = match self.value {
            ConfigValue::Str(_) => ConfigValue::Str(None),
            ConfigValue::Int(_) => ConfigValue::Int(0),
        };
    }

    /// The value part of `line` if it sets this option.
    fn locate<'l>(&self, line: &'l str) -> Option<&'l str> {
        let head = line.get(..self.key.len())?;
        if !head.eq_ignore_ascii_case(self.key) {
            return None;
        }
        let rest = line[self.key.len()..].trim_start_matches(' ');
        let value = rest.strip_prefix(self.separator)?;
        Some(value.trim_start_matches(' '))
    }

    fn set(&mut self, value: &str) -> Result<()> {
        self.value = match (&self.value, value) {
            (ConfigValue::Str(_), "") => ConfigValue::Str(None),
            (ConfigValue::Int(_), "") => ConfigValue::Int(0),
            (ConfigValue::Str(_), v) => ConfigValue::Str(Some(v.to_string())),
            (ConfigValue::Int(_), v) => ConfigValue::Int(parse_int(v)?),
        };
        Ok(())
    }
}

fn parse_int(v: &str) -> Result<i64> {
    if !is_number(v) {
        return Err(Error::Syntax);
    }
    match v {
        "-" => Ok(0),
        _ => v.parse().map_err(|_| Error::Syntax),
    }
}

fn parse_line(line: &str, options: &mut [ConfigOption]) -> Result<()> {
    let line = str_merge_spaces(line);
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }

    for option in options.iter_mut() {
        if let Some(value) = option.locate(&line) {
            return option.set(value);
        }
    }
    Ok(())
}

/// Reset every option, then fill them from `text`.
///
/// # Errors
/// [`Error::Syntax`] for a non-numeric integer value. Parsing stops at the
/// offending line; earlier lines stay applied.
pub fn parse_config(text: &str, options: &mut [ConfigOption]) -> Result<()> {
    options.iter_mut().for_each(ConfigOption::reset);
    text.split('\n')
        .try_for_each(|line| parse_line(line, options))
}

/// Load `path` through firmware and [`parse_config`] it.
///
/// # Errors
/// Loader errors, or see [`parse_config`].
pub fn parse_config_file(
    fw: &mut impl Firmware,
    path: &str,
    options: &mut [ConfigOption],
) -> Result<()> {
    let data = fw
        .load_file(path)
        .inspect_err(|e| debug!("Cannot load {path}: {e}"))?;
    let text = String::from_utf8_lossy(&data);
    parse_config(&text, options)
}
