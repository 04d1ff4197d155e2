//! # Serial Log Console

use crate::{RegisterIo, Uart, UartDescriptor, UartPlatform};
use boot_cpu::Clock;
use boot_error::{Error, Result};
use boot_firmware::{Firmware, SerialPortInfo};
use boot_log::{LogSink, SyslogLevel, is_syslog_message, log_subscribe, log_unsubscribe};
use boot_sync::BootLock;
use log::warn;

struct ConsoleState<IO> {
    uart: Option<Uart<IO>>,
    line_start: bool,
}

/// A [`LogSink`] writing syslog records to a UART.
///
/// The `<N>` level prefix is stripped and `\n` is sent as `\r\n`.
pub struct SerialConsole<IO> {
    state: BootLock<ConsoleState<IO>>,
}

impl<IO> SerialConsole<IO> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: BootLock::new(ConsoleState {
                uart: None,
                line_start: true,
            }),
        }
    }
}

impl<IO> Default for SerialConsole<IO> {
    fn default() -> Self {
        Self::new()
    }
}

impl<IO: RegisterIo> SerialConsole<IO> {
    /// Route output to `uart`, replacing any previous device.
    pub fn attach(&self, uart: Uart<IO>) {
        self.state.with_lock(|s| {
            s.uart = Some(uart);
            s.line_start = true;
        });
    }

    pub fn detach(&self) -> Option<Uart<IO>> {
        self.state.with_lock(|s| s.uart.take())
    }

    pub fn is_attached(&self) -> bool {
        self.state.with_lock(|s| s.uart.is_some())
    }

    /// Run `f` on the attached UART.
    pub fn with_uart<R>(&self, f: impl FnOnce(&mut Uart<IO>) -> R) -> Option<R> {
        self.state.with_lock(|s| s.uart.as_mut().map(f))
    }
}

impl<IO: RegisterIo + Send> LogSink for SerialConsole<IO> {
    fn write(&self, msg: &str) -> Result<()> {
        // Held further up the stack: a record emitted while printing.
        let Some(mut state) = self.state.try_lock() else {
            return Ok(());
        };
        let state = &mut *state;
        let Some(uart) = state.uart.as_mut() else {
            return Err(Error::NotReady);
        };
        if uart.flags().use_after_exit_boot_services() && boot_firmware::in_boot_services() {
            return Ok(());
        }

        let bytes = msg.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if state.line_start && is_syslog_message(&bytes[i..]) {
                i += 3;
                state.line_start = false;
                continue;
            }
            let c = bytes[i];
            if c == b'\n' {
                uart.putc(b'\r');
                state.line_start = true;
            } else {
                state.line_start = false;
            }
            uart.putc(c);
            i += 1;
        }
        Ok(())
    }
}

/// Initialize the UART for `com` and subscribe it to the log at debug
/// verbosity.
///
/// `open` turns the firmware's port description into register access.
///
/// # Errors
/// [`Error::InvalidParameter`] for a zero `baud` or a `com` outside
/// `1..=0xffff`; lookup and device errors otherwise.
pub fn serial_log_init<IO, F>(
    console: &'static SerialConsole<IO>,
    firmware: &impl Firmware,
    com: u32,
    baud: u32,
    clock: &'static (dyn Clock + Sync),
    open: F,
) -> Result<()>
where
    IO: RegisterIo + Send + 'static,
    F: FnOnce(&SerialPortInfo) -> Result<IO>,
{
    serial_log_init_on(console, firmware, com, baud, clock, UartPlatform::NATIVE, open)
}

/// [`serial_log_init`] with an explicit [`UartPlatform`].
///
/// # Errors
/// See [`serial_log_init`].
pub fn serial_log_init_on<IO, F>(
    console: &'static SerialConsole<IO>,
    firmware: &impl Firmware,
    com: u32,
    baud: u32,
    clock: &'static (dyn Clock + Sync),
    platform: UartPlatform,
    open: F,
) -> Result<()>
where
    IO: RegisterIo + Send + 'static,
    F: FnOnce(&SerialPortInfo) -> Result<IO>,
{
    if baud == 0 || com == 0 || com > 0xffff {
        return Err(Error::InvalidParameter);
    }

    let port = firmware.serial_port(com)?;
    let mut baudrate = baud;
    if platform == UartPlatform::Arm
        && port.baudrate != SerialPortInfo::BAUDRATE_UNKNOWN
        && port.baudrate != baud
    {
        warn!("Cannot override baud rate on this platform: using {}", port.baudrate);
        baudrate = port.baudrate;
    }

    let io = open(&port)?;
    let desc = UartDescriptor {
        id: com,
        serial_type: port.serial_type as u8,
        baudrate,
    };
    console.attach(Uart::init_on(desc, io, clock, platform)?);
    log_subscribe(console, SyslogLevel::Debug)
}

/// Unsubscribe `console` and release its UART.
pub fn serial_log_shutdown<IO: RegisterIo + Send + 'static>(console: &'static SerialConsole<IO>) {
    log_unsubscribe(console);
    console.detach();
}
