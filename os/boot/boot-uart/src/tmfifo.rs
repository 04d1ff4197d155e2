//! # TMFIFO Console
//!
//! A virtual console over the NVIDIA BlueField RSHIM. Each character goes
//! into the tile-to-host FIFO as two 64-bit words: a message header and the
//! payload byte.
//!
//! The host driver proves it is alive by writing a non-zero word into
//! `SCRATCHPAD1`; the console clears it whenever it sees it. Without a
//! fresh alive word for a second, or with a FIFO that never drains, the
//! link counts as down and output is dropped.
//!
//! ```text
//!                alive
//! NotConnected ────────► Connected ◄──────┐
//!      ▲                   │  │ alive,    │ alive,
//!      │    not alive      │  │ FIFO full │ FIFO drained
//!      └───────────────────┘  ▼           │
//!      ▲               ConnectedButFull ──┘
//!      └──── not alive ───────┘
//! ```
//!
//! Link checks happen on every call while not connected and at most once per
//! second otherwise.

use crate::RegisterIo;
use boot_cpu::Clock;
use core::time::Duration;

const MSG_CONSOLE: u64 = 3;

const TILE_TO_HOST_DATA: u16 = 0xa40;
const TILE_TO_HOST_STATUS: u16 = 0xa48;
const SCRATCHPAD1: u16 = 0xc20;

const FIFO_LENGTH: u64 = 256;
const CHECK_PERIOD: Duration = Duration::from_secs(1);

/// Header of a one-byte console message: type in byte 0, length low byte
/// in byte 2.
pub const TX_HEADER: u64 = MSG_CONSOLE | 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    NotConnected,
    Connected,
    ConnectedButFull,
}

#[derive(Debug)]
pub(crate) struct TmfifoLink {
    state: LinkState,
    last_connected: u64,
}

impl TmfifoLink {
    pub(crate) const fn new() -> Self {
        Self {
            state: LinkState::NotConnected,
            last_connected: 0,
        }
    }

    pub(crate) const fn state(&self) -> LinkState {
        self.state
    }

    /// Room for header and payload.
    fn full(io: &impl RegisterIo) -> bool {
        io.read64(TILE_TO_HOST_STATUS) > FIFO_LENGTH - 2
    }

    fn connected(&mut self, io: &impl RegisterIo, clock: &(impl Clock + ?Sized)) -> bool {
        let due = self.last_connected.saturating_add(clock.ticks_for(CHECK_PERIOD));
        if self.state == LinkState::NotConnected || clock.ticks() > due {
            let alive = io.read64(SCRATCHPAD1) != 0;
            if alive {
                io.write64(SCRATCHPAD1, 0);
                self.last_connected = clock.ticks();
            }

            self.state = match (self.state, alive) {
                (_, false) => LinkState::NotConnected,
                (LinkState::NotConnected, true) => LinkState::Connected,
                (_, true) if Self::full(io) => LinkState::ConnectedButFull,
                (_, true) => LinkState::Connected,
            };
        }
        self.state == LinkState::Connected
    }

    pub(crate) fn putc(&mut self, io: &impl RegisterIo, clock: &(impl Clock + ?Sized), c: u8) {
        while self.connected(io, clock) {
            if !Self::full(io) {
                io.write64(TILE_TO_HOST_DATA, TX_HEADER);
                io.write64(TILE_TO_HOST_DATA, u64::from(c));
                return;
            }
        }
    }
}
