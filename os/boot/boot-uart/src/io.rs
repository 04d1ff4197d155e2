//! # Register Access

use boot_firmware::{IoChannel, IoSpace};
use core::ptr::{read_volatile, write_volatile};

/// Access to a device's registers. `reg` is the register index; the
/// implementation applies the channel's offset scaling.
pub trait RegisterIo {
    fn read8(&self, reg: u16) -> u8;
    fn write8(&self, reg: u16, value: u8);
    fn read32(&self, reg: u16) -> u32;
    fn write32(&self, reg: u16, value: u32);
    fn read64(&self, reg: u16) -> u64;
    fn write64(&self, reg: u16, value: u64);
}

/// Register access through an [`IoChannel`]: port I/O or MMIO.
#[derive(Debug, Clone, Copy)]
pub struct ChannelIo {
    channel: IoChannel,
}

impl ChannelIo {
    /// # Safety
    /// `channel` must describe a device that tolerates the accesses its
    /// driver performs, mapped (for MMIO) for the lifetime of the value.
    #[must_use]
    pub const unsafe fn new(channel: IoChannel) -> Self {
        Self { channel }
    }

    #[must_use]
    pub const fn channel(&self) -> IoChannel {
        self.channel
    }

    #[allow(clippy::cast_possible_truncation)]
    fn addr(&self, reg: u16) -> Address {
        let off = self.channel.scaled(reg);
        match self.channel.space {
            IoSpace::Port(base) => Address::Port(base.wrapping_add(off as u16)),
            IoSpace::Memory(base) => Address::Mmio(base.wrapping_add(off) as usize),
        }
    }
}

enum Address {
    Port(u16),
    Mmio(usize),
}

impl RegisterIo for ChannelIo {
    fn read8(&self, reg: u16) -> u8 {
        match self.addr(reg) {
            Address::Port(port) => unsafe { port::inb(port) },
            Address::Mmio(addr) => unsafe { read_volatile(addr as *const u8) },
        }
    }

    fn write8(&self, reg: u16, value: u8) {
        match self.addr(reg) {
            Address::Port(port) => unsafe { port::outb(port, value) },
            Address::Mmio(addr) => unsafe { write_volatile(addr as *mut u8, value) },
        }
    }

    fn read32(&self, reg: u16) -> u32 {
        match self.addr(reg) {
            Address::Port(port) => unsafe { port::inl(port) },
            Address::Mmio(addr) => unsafe { read_volatile(addr as *const u32) },
        }
    }

    fn write32(&self, reg: u16, value: u32) {
        match self.addr(reg) {
            Address::Port(port) => unsafe { port::outl(port, value) },
            Address::Mmio(addr) => unsafe { write_volatile(addr as *mut u32, value) },
        }
    }

    fn read64(&self, reg: u16) -> u64 {
        match self.addr(reg) {
            Address::Port(port) => unsafe {
                u64::from(port::inl(port)) | u64::from(port::inl(port.wrapping_add(4))) << 32
            },
            Address::Mmio(addr) => unsafe { read_volatile(addr as *const u64) },
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write64(&self, reg: u16, value: u64) {
        match self.addr(reg) {
            Address::Port(port) => unsafe {
                port::outl(port, value as u32);
                port::outl(port.wrapping_add(4), (value >> 32) as u32);
            },
            Address::Mmio(addr) => unsafe { write_volatile(addr as *mut u64, value) },
        }
    }
}

#[cfg(target_arch = "x86_64")]
mod port {
    use core::arch::asm;

    pub unsafe fn inb(port: u16) -> u8 {
        let value: u8;
        unsafe {
            asm!("in al, dx", out("al") value, in("dx") port, options(nomem, nostack, preserves_flags));
        }
        value
    }

    pub unsafe fn outb(port: u16, value: u8) {
        unsafe {
            asm!("out dx, al", in("dx") port, in("al") value, options(nomem, nostack, preserves_flags));
        }
    }

    pub unsafe fn inl(port: u16) -> u32 {
        let value: u32;
        unsafe {
            asm!("in eax, dx", out("eax") value, in("dx") port, options(nomem, nostack, preserves_flags));
        }
        value
    }

    pub unsafe fn outl(port: u16, value: u32) {
        unsafe {
            asm!("out dx, eax", in("dx") port, in("eax") value, options(nomem, nostack, preserves_flags));
        }
    }
}

/// No port I/O space: reads float high, writes vanish.
#[cfg(not(target_arch = "x86_64"))]
mod port {
    pub unsafe fn inb(_port: u16) -> u8 {
        0xff
    }

    pub unsafe fn outb(_port: u16, _value: u8) {}

    pub unsafe fn inl(_port: u16) -> u32 {
        0xffff_ffff
    }

    pub unsafe fn outl(_port: u16, _value: u32) {}
}
