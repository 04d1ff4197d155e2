#![allow(dead_code)]

use boot_cpu::Clock;
use boot_uart::RegisterIo;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    regs: HashMap<u16, u64>,
    pinned: HashMap<u16, u64>,
    writes: Vec<(u16, u64)>,
}

/// Register file that reads back the last value written, unless a
/// register is pinned to a fixed value.
#[derive(Clone, Default)]
pub struct Regs(Arc<Mutex<Inner>>);

impl Regs {
    pub fn pin(&self, reg: u16, value: u64) {
        self.0.lock().unwrap().pinned.insert(reg, value);
    }

    pub fn set(&self, reg: u16, value: u64) {
        self.0.lock().unwrap().regs.insert(reg, value);
    }

    pub fn writes(&self) -> Vec<(u16, u64)> {
        self.0.lock().unwrap().writes.clone()
    }

    /// Values written to `reg`, in order.
    pub fn written_to(&self, reg: u16) -> Vec<u64> {
        self.writes()
            .into_iter()
            .filter(|&(r, _)| r == reg)
            .map(|(_, v)| v)
            .collect()
    }

    fn read(&self, reg: u16) -> u64 {
        let inner = self.0.lock().unwrap();
        inner
            .pinned
            .get(&reg)
            .or_else(|| inner.regs.get(&reg))
            .copied()
            .unwrap_or(0)
    }

    fn write(&self, reg: u16, value: u64) {
        let mut inner = self.0.lock().unwrap();
        inner.regs.insert(reg, value);
        inner.writes.push((reg, value));
    }
}

impl RegisterIo for Regs {
    fn read8(&self, reg: u16) -> u8 {
        self.read(reg) as u8
    }

    fn write8(&self, reg: u16, value: u8) {
        self.write(reg, value.into());
    }

    fn read32(&self, reg: u16) -> u32 {
        self.read(reg) as u32
    }

    fn write32(&self, reg: u16, value: u32) {
        self.write(reg, value.into());
    }

    fn read64(&self, reg: u16) -> u64 {
        self.read(reg)
    }

    fn write64(&self, reg: u16, value: u64) {
        self.write(reg, value);
    }
}

/// Clock that advances one millisecond per reading.
pub struct SteppingClock(AtomicU64);

impl SteppingClock {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }
}

impl Clock for SteppingClock {
    fn ticks(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    fn frequency(&self) -> u64 {
        1000
    }
}
