mod common;

use boot_error::Error;
use boot_firmware::{HostedFirmware, IoChannel, SerialPortInfo, SerialType, set_in_boot_services};
use boot_log::{LogSink, NullSink, SyslogLevel, log_init, log_shutdown, syslog};
use boot_uart::{
    SerialConsole, Uart, UartDescriptor, UartPlatform, serial_log_init_on, serial_log_shutdown,
};
use common::{Regs, SteppingClock};

static CLOCK: SteppingClock = SteppingClock::new();
static FIRMWARE_SINK: NullSink = NullSink;
static CONSOLE: SerialConsole<Regs> = SerialConsole::new();
static DIRECT: SerialConsole<Regs> = SerialConsole::new();
static RSHIM: SerialConsole<Regs> = SerialConsole::new();

const PL011_DR: u16 = 0;

fn transmitted(regs: &Regs) -> String {
    regs.written_to(PL011_DR)
        .into_iter()
        .map(|b| char::from(b as u8))
        .collect()
}

fn pl011_port() -> SerialPortInfo {
    SerialPortInfo {
        serial_type: SerialType::Pl011,
        io: IoChannel::mmio(0x900_0000, 1),
        baudrate: 115_200,
    }
}

fn strips_prefixes_and_expands_newlines() {
    let regs = Regs::default();
    let desc = UartDescriptor {
        id: 1,
        serial_type: SerialType::Pl011 as u8,
        baudrate: 115_200,
    };
    DIRECT.attach(Uart::init_on(desc, regs.clone(), &CLOCK, UartPlatform::Arm).unwrap());

    // Only a prefix at the start of a line is a level.
    DIRECT.write("<6>a\n<7>b <3>c\n").unwrap();
    DIRECT.write("<4>tail\n").unwrap();

    assert_eq!(transmitted(&regs), "a\r\nb <3>c\r\ntail\r\n");
    assert!(DIRECT.detach().is_some());
    assert_eq!(DIRECT.write("x"), Err(Error::NotReady));
}

fn serial_log_lifecycle() {
    let fw = HostedFirmware::builder().serial(pl011_port()).build();
    let regs = Regs::default();
    let open = |_: &SerialPortInfo| -> boot_error::Result<Regs> { Ok(regs.clone()) };

    for (com, baud) in [(0, 115_200), (0x1_0000, 115_200), (1, 0)] {
        assert_eq!(
            serial_log_init_on(&CONSOLE, &fw, com, baud, &CLOCK, UartPlatform::Arm, open),
            Err(Error::InvalidParameter)
        );
    }
    assert_eq!(
        serial_log_init_on(&CONSOLE, &fw, 1, 115_200, &CLOCK, UartPlatform::Arm, open),
        Err(Error::NotStarted)
    );

    log_init(false, &FIRMWARE_SINK).unwrap();
    serial_log_init_on(&CONSOLE, &fw, 1, 9600, &CLOCK, UartPlatform::Arm, open).unwrap();
    // Firmware's rate wins where the divisor cannot be programmed.
    assert_eq!(CONSOLE.with_uart(|u| u.baudrate()), Some(115_200));

    syslog!(SyslogLevel::Info, "early");
    syslog!(SyslogLevel::Debug, "two\nlines");
    assert_eq!(transmitted(&regs), "early\r\ntwo\r\nlines\r\n");

    serial_log_shutdown(&CONSOLE);
    assert!(!CONSOLE.is_attached());
    log_shutdown();
}

fn tmfifo_waits_for_exit_boot_services() {
    const TMFIFO_DATA: u16 = 0xa40;
    const SCRATCHPAD1: u16 = 0xc20;

    let regs = Regs::default();
    regs.set(SCRATCHPAD1, 1);
    let desc = UartDescriptor {
        id: 1,
        serial_type: SerialType::Tmfifo as u8,
        baudrate: 0,
    };
    RSHIM.attach(Uart::init_on(desc, regs.clone(), &CLOCK, UartPlatform::Arm).unwrap());

    RSHIM.write("<6>early\n").unwrap();
    assert!(regs.written_to(TMFIFO_DATA).is_empty());

    set_in_boot_services(false);
    RSHIM.write("<6>x").unwrap();
    set_in_boot_services(true);
    assert_eq!(regs.written_to(TMFIFO_DATA), [0x0001_0003, u64::from(b'x')]);
    RSHIM.detach();
}

// The last part flips the process-wide boot services flag.
#[test]
fn serial_console() {
    strips_prefixes_and_expands_newlines();
    serial_log_lifecycle();
    tmfifo_waits_for_exit_boot_services();
}
