//! # UEFI Platform Survey
//!
//! A UEFI application that brings up the boot libraries the way a
//! hypervisor loader does and reports what the platform offers:
//!
//! 1. Route `log` records into the syslog buffer and the firmware console.
//! 2. Read `\EFI\BOOT\survey.cfg` from the boot volume.
//! 3. Locate ACPI, then optionally attach a serial console (legacy COM
//!    ports on x86, SPCR elsewhere) and a GOP framebuffer console.
//! 4. Walk ACPI, SMBIOS and the partitions of the boot disk.
//! 5. Run the exit handlers and return to firmware.
//!
//! The survey never leaves boot services.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![no_main]
#![allow(unsafe_code)]
extern crate alloc;

mod acpi_table;
mod config;
mod console;
mod file_system;
mod firmware;
mod framebuffer;
mod memory;
mod survey;

use crate::config::SurveyConfig;
use crate::console::FIRMWARE_CONSOLE;
use crate::firmware::UefiFirmware;
use crate::framebuffer::gop_framebuffer;
use boot_cpu::Clock;
use boot_error::{Error, Result};
use boot_fb::{FONT_8X16, FbConsole};
use boot_firmware::{atexit, do_atexit};
use boot_log::{SyslogLogger, log_init, log_shutdown};
use boot_uart::{ChannelIo, SerialConsole, serial_log_init, serial_log_shutdown};
use log::{LevelFilter, error, info, warn};
use uefi::prelude::*;

static SERIAL: SerialConsole<ChannelIo> = SerialConsole::new();
static FBCON: FbConsole<&'static mut [u8]> = FbConsole::new();

#[entry]
fn efi_main() -> Status {
    if uefi::helpers::init().is_err() {
        return Status::UNSUPPORTED;
    }

    let status = match run() {
        Ok(()) => Status::SUCCESS,
        Err(e) => {
            error!("Survey failed: {e}");
            e.into()
        }
    };
    do_atexit();
    status
}

fn run() -> Result<()> {
    SyslogLogger::init(LevelFilter::Trace).map_err(|_| Error::AlreadyStarted)?;
    log_init(false, &FIRMWARE_CONSOLE)?;
    atexit(log_shutdown)?;

    let clock = clock();
    let mut fw = UefiFirmware::new(clock);
    let config = SurveyConfig::load(&mut fw);
    if config.verbose {
        log_init(true, &FIRMWARE_CONSOLE)?;
    }
    info!("Platform survey: {config:?}");

    if let Err(e) = survey::init_acpi(&fw) {
        warn!("ACPI unavailable: {e}");
    }
    if config.serial != 0 {
        match serial_console(&fw, &config, clock) {
            Ok(()) => info!("Serial console on port {:#x}", config.serial),
            Err(e) => warn!("No serial console: {e}"),
        }
    }
    if config.fbcon {
        match framebuffer_console(config.verbose) {
            Ok((cols, rows)) => info!("Framebuffer console: {cols}x{rows}"),
            Err(e) => warn!("No framebuffer console: {e}"),
        }
    }

    survey::run(&mut fw, &config);
    Ok(())
}

fn serial_console(
    fw: &UefiFirmware,
    config: &SurveyConfig,
    clock: &'static (dyn Clock + Sync),
) -> Result<()> {
    serial_log_init(&SERIAL, fw, config.serial, config.baudrate, clock, |port| {
        // Safety: the port comes from firmware (legacy COM or SPCR) and
        // MMIO UARTs are identity mapped under UEFI.
        Ok(unsafe { ChannelIo::new(port.io) })
    })?;
    atexit(|| serial_log_shutdown(&SERIAL))
}

fn framebuffer_console(verbose: bool) -> Result<(u32, u32)> {
    let fb = gop_framebuffer()?;
    let (width, height) = (fb.mode().width, fb.mode().height);
    FBCON.init(fb, &FONT_8X16, 0, 0, width, height, verbose)?;
    atexit(|| {
        let _ = FBCON.shutdown();
    })?;
    FBCON.geometry().ok_or(Error::NotReady)
}

/// The TSC, calibrated against the firmware's stall service.
#[cfg(target_arch = "x86_64")]
fn clock() -> &'static (dyn Clock + Sync) {
    use alloc::boxed::Box;
    use boot_cpu::x86_64::Tsc;
    use uefi::boot;

    const CALIBRATION_US: usize = 10_000;

    let start = Tsc::read();
    boot::stall(CALIBRATION_US);
    let elapsed = Tsc::read().wrapping_sub(start);
    let hz = elapsed.saturating_mul((1_000_000 / CALIBRATION_US) as u64);
    Box::leak(Box::new(Tsc::with_frequency(hz)))
}

#[cfg(target_arch = "aarch64")]
fn clock() -> &'static (dyn Clock + Sync) {
    &boot_cpu::aarch64::GenericTimer
}
