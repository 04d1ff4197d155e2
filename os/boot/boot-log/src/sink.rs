use crate::SyslogLevel;
use boot_error::{Error, Result};

/// Number of consoles that may listen at once (framebuffer and serial, or
/// firmware and serial).
pub const CONSOLES_MAX: usize = 2;

/// A console that receives every record at or below its level.
pub trait LogSink: Sync {
    /// Receive one record: `<N>body\n`.
    ///
    /// # Errors
    /// Console failures. They are ignored by the logger and do not
    /// unsubscribe the sink.
    fn write(&self, msg: &str) -> Result<()>;
}

/// A sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn write(&self, _msg: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct Subscriber {
    sink: &'static dyn LogSink,
    max_level: SyslogLevel,
}

/// Fixed-capacity subscriber table, notified in slot order.
#[derive(Default)]
pub struct Subscribers {
    slots: [Option<Subscriber>; CONSOLES_MAX],
}

fn same_sink(a: &'static dyn LogSink, b: &'static dyn LogSink) -> bool {
    core::ptr::addr_eq(a, b)
}

impl Subscribers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [None; CONSOLES_MAX],
        }
    }

    /// Register `sink` for records at or below `max_level`, replacing an
    /// existing registration of the same sink.
    ///
    /// # Errors
    /// [`Error::OutOfResources`] when every slot is taken.
    pub fn subscribe(&mut self, sink: &'static dyn LogSink, max_level: SyslogLevel) -> Result<()> {
        self.unsubscribe(sink);
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.is_none())
            .ok_or(Error::OutOfResources)?;
        *slot = Some(Subscriber { sink, max_level });
        Ok(())
    }

    pub fn unsubscribe(&mut self, sink: &'static dyn LogSink) {
        for slot in &mut self.slots {
            if slot.is_some_and(|s| same_sink(s.sink, sink)) {
                *slot = None;
            }
        }
    }

    /// The registered level of `sink`, if subscribed.
    #[must_use]
    pub fn level_of(&self, sink: &'static dyn LogSink) -> Option<SyslogLevel> {
        self.slots
            .iter()
            .flatten()
            .find(|s| same_sink(s.sink, sink))
            .map(|s| s.max_level)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify(&self, level: SyslogLevel, msg: &str) {
        for s in self.slots.iter().flatten() {
            if level <= s.max_level {
                let _ = s.sink.write(msg);
            }
        }
    }
}
