//! # Framebuffer Log Console
//!
//! Renders syslog records into a text window on a [`Framebuffer`]. The
//! `<N>` prefix at the start of a line selects the text color and is not
//! drawn:
//!
//! | Level            | Color        |
//! |------------------|--------------|
//! | emerg ..= err    | red          |
//! | warning          | orange       |
//! | notice, info     | light gray   |
//! | debug            | gray         |
//!
//! Scrolling a whole framebuffer is slow, so when the last row is full the
//! window is cleared and output restarts at the top.

use crate::framebuffer::is_print;
use crate::{Font, Framebuffer, Rgba};
use boot_error::{Error, Result};
use boot_log::{
    LogSink, SyslogLevel, log_subscribe, log_unsubscribe, log_unsubscribe_firmware,
    syslog_get_message_level,
};
use boot_sync::BootLock;
use log::debug;

struct ConsoleState<B> {
    fb: Framebuffer<B>,
    font: &'static Font,
    origin_x: i32,
    origin_y: i32,
    rows: u32,
    cols: u32,
    xcurs: u32,
    ycurs: u32,
    color: Rgba,
    scroll_pending: bool,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ConsoleState<B> {
    const fn reset(&mut self) {
        self.xcurs = 0;
        self.ycurs = 0;
    }

    fn clear(&mut self) {
        self.fb.draw_rect(
            self.origin_x,
            self.origin_y,
            self.font.text_width(self.cols),
            self.rows * self.font.height(),
            Rgba::BLACK,
        );
        self.reset();
    }

    fn putc(&mut self, c: u8) {
        if self.scroll_pending {
            self.clear();
            self.scroll_pending = false;
        }

        if c == b'\n' {
            self.xcurs = 0;
            if self.ycurs + 1 >= self.rows {
                self.scroll_pending = true;
            } else {
                self.ycurs += 1;
            }
            return;
        }

        if self.xcurs >= self.cols {
            if self.ycurs + 1 >= self.rows {
                self.clear();
            } else {
                self.xcurs = 0;
                self.ycurs += 1;
            }
        }

        if is_print(c) {
            let x = self.origin_x.saturating_add_unsigned(self.font.text_width(self.xcurs));
            let y = self
                .origin_y
                .saturating_add_unsigned(self.ycurs * self.font.height());
            self.fb.draw_char(self.font, c, x, y, self.color);
            self.xcurs += 1;
        }
    }

    fn print(&mut self, mut msg: &[u8]) {
        while let Some(&c) = msg.first() {
            if self.xcurs == 0
                && let Ok(level) = syslog_get_message_level(msg)
            {
                self.color = color_for(level);
                msg = &msg[3..];
                continue;
            }
            self.putc(c);
            msg = &msg[1..];
        }
    }
}

const fn color_for(level: SyslogLevel) -> Rgba {
    match level {
        SyslogLevel::Emerg | SyslogLevel::Alert | SyslogLevel::Crit | SyslogLevel::Err => {
            Rgba::RED
        }
        SyslogLevel::Warning => Rgba::ORANGE,
        SyslogLevel::Debug => Rgba::GRAY,
        SyslogLevel::Notice | SyslogLevel::Info => Rgba::LIGHT_GRAY,
    }
}

const fn max_level(verbose: bool) -> SyslogLevel {
    if verbose {
        SyslogLevel::Debug
    } else {
        SyslogLevel::Info
    }
}

/// Text console log sink over a framebuffer window.
pub struct FbConsole<B> {
    state: BootLock<Option<ConsoleState<B>>>,
}

impl<B> FbConsole<B> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: BootLock::new(None),
        }
    }
}

impl<B> Default for FbConsole<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]> + Send + 'static> FbConsole<B> {
    /// Open a console in the `width` x `height` pixel window at (`x`, `y`)
    /// and take over from the firmware console.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] if the window cannot hold one glyph;
    /// subscription errors from [`log_subscribe`].
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &'static self,
        fb: Framebuffer<B>,
        font: &'static Font,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        verbose: bool,
    ) -> Result<()> {
        if width < font.width() || height < font.height() {
            return Err(Error::InvalidParameter);
        }

        let rows = height / font.height();
        let cols = width / font.width();
        self.state.with_lock(|state| {
            *state = Some(ConsoleState {
                fb,
                font,
                origin_x: x,
                origin_y: y,
                rows,
                cols,
                xcurs: 0,
                ycurs: 0,
                color: Rgba::LIGHT_GRAY,
                scroll_pending: false,
            });
        });

        log_unsubscribe_firmware();
        log_subscribe(self, max_level(verbose))?;
        debug!("framebuffer console: {cols}x{rows}");
        Ok(())
    }

    /// Move the cursor to the top-left corner.
    pub fn reset(&self) {
        self.state.with_lock(|state| {
            if let Some(state) = state {
                state.reset();
            }
        });
    }

    /// Blank the window and reset the cursor.
    pub fn clear(&self) {
        self.state.with_lock(|state| {
            if let Some(state) = state {
                state.clear();
            }
        });
    }

    /// # Errors
    /// Subscription errors from [`log_subscribe`].
    pub fn set_verbosity(&'static self, verbose: bool) -> Result<()> {
        log_unsubscribe(self);
        log_subscribe(self, max_level(verbose))
    }

    /// Stop rendering and hand the framebuffer back.
    pub fn shutdown(&'static self) -> Option<Framebuffer<B>> {
        log_unsubscribe(self);
        self.state.with_lock(Option::take).map(|state| state.fb)
    }

    /// Cursor position as (column, row).
    pub fn cursor(&self) -> Option<(u32, u32)> {
        self.state
            .with_lock(|state| state.as_ref().map(|s| (s.xcurs, s.ycurs)))
    }

    /// Console geometry as (columns, rows).
    pub fn geometry(&self) -> Option<(u32, u32)> {
        self.state
            .with_lock(|state| state.as_ref().map(|s| (s.cols, s.rows)))
    }

    pub fn with_framebuffer<R>(&self, f: impl FnOnce(&mut Framebuffer<B>) -> R) -> Option<R> {
        self.state.with_lock(|state| state.as_mut().map(|s| f(&mut s.fb)))
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]> + Send> LogSink for FbConsole<B> {
    fn write(&self, msg: &str) -> Result<()> {
        let Some(mut guard) = self.state.try_lock() else {
            return Ok(());
        };
        let Some(state) = &mut *guard else {
            return Err(Error::NotReady);
        };
        state.print(msg.as_bytes());
        Ok(())
    }
}
