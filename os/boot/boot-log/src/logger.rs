use crate::SyslogLevel;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Routes the `log` crate macros into the syslog subsystem.
pub struct SyslogLogger;

static LOGGER: SyslogLogger = SyslogLogger;

impl SyslogLogger {
    /// Install as the `log` crate backend. Call once during early init.
    ///
    /// # Errors
    /// Fails if another logger is already installed.
    pub fn init(max_level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER)?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for SyslogLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        crate::log(SyslogLevel::from(record.level()), *record.args());
    }

    fn flush(&self) {}
}
