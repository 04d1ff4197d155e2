use crate::format::{LOG_MAX_LEN, format_record};
use crate::{LogBuffer, LogSink, Subscribers, SyslogLevel};
use boot_error::Result;
use core::fmt;

/// The logging state: record buffer, console table and scratch space.
pub struct Syslog {
    buffer: LogBuffer,
    consoles: Subscribers,
    firmware_sink: Option<&'static dyn LogSink>,
    scratch: [u8; LOG_MAX_LEN],
}

impl Syslog {
    /// A fresh state with a one-page buffer and the firmware console
    /// subscribed at DEBUG (`verbose`) or INFO.
    ///
    /// # Errors
    /// [`boot_error::Error::OutOfResources`] if the buffer cannot be allocated.
    pub fn new(verbose: bool, firmware_sink: &'static dyn LogSink) -> Result<Self> {
        Self::with_buffer(LogBuffer::new()?, verbose, firmware_sink)
    }

    /// As [`Syslog::new`], over a caller-provided buffer.
    ///
    /// # Errors
    /// Never fails with an empty console table; kept fallible like `new`.
    pub fn with_buffer(
        buffer: LogBuffer,
        verbose: bool,
        firmware_sink: &'static dyn LogSink,
    ) -> Result<Self> {
        let mut syslog = Self {
            buffer,
            consoles: Subscribers::new(),
            firmware_sink: None,
            scratch: [0; LOG_MAX_LEN],
        };
        syslog.set_firmware_sink(verbose, firmware_sink)?;
        Ok(syslog)
    }

    /// Subscribe (or resubscribe) the firmware console at the level
    /// `verbose` selects.
    ///
    /// # Errors
    /// [`boot_error::Error::OutOfResources`] if no slot is free.
    pub fn set_firmware_sink(&mut self, verbose: bool, sink: &'static dyn LogSink) -> Result<()> {
        if let Some(old) = self.firmware_sink.take() {
            self.consoles.unsubscribe(old);
        }
        let level = if verbose {
            SyslogLevel::Debug
        } else {
            SyslogLevel::Info
        };
        self.consoles.subscribe(sink, level)?;
        self.firmware_sink = Some(sink);
        Ok(())
    }

    #[must_use]
    pub fn firmware_sink(&self) -> Option<&'static dyn LogSink> {
        self.firmware_sink
    }

    /// # Errors
    /// [`boot_error::Error::OutOfResources`] when both slots are taken.
    pub fn subscribe(&mut self, sink: &'static dyn LogSink, max_level: SyslogLevel) -> Result<()> {
        self.consoles.subscribe(sink, max_level)
    }

    pub fn unsubscribe(&mut self, sink: &'static dyn LogSink) {
        self.consoles.unsubscribe(sink);
    }

    #[must_use]
    pub const fn consoles(&self) -> &Subscribers {
        &self.consoles
    }

    #[must_use]
    pub const fn buffer(&self) -> &LogBuffer {
        &self.buffer
    }

    pub fn expand_disable(&mut self, final_extra: usize) {
        self.buffer.expand_disable(final_extra);
    }

    /// Format one record, append it to the buffer and hand it to every
    /// console whose level admits it.
    pub fn log(&mut self, level: SyslogLevel, args: fmt::Arguments<'_>) {
        let len = format_record(&mut self.scratch, level, args);
        let record = &self.scratch[..len];
        self.buffer.append(record);

        // The formatter only ever cuts at character boundaries.
        if let Ok(msg) = core::str::from_utf8(record) {
            self.consoles.notify(level, msg);
        }
    }
}
