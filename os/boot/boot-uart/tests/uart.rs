mod common;

use boot_error::Error;
use boot_firmware::SerialType;
use boot_uart::{LinkState, Uart, UartDescriptor, UartPlatform, ns16550};
use common::{Regs, SteppingClock};

/// Each test owns its clock; TMFIFO tests spin it forward.
fn clock() -> &'static SteppingClock {
    Box::leak(Box::new(SteppingClock::new()))
}

const LCR: u16 = 3;
const LSR: u16 = 5;
const FCR: u16 = 2;

fn desc(serial_type: u8, baudrate: u32) -> UartDescriptor {
    UartDescriptor {
        id: 1,
        serial_type,
        baudrate,
    }
}

#[test]
fn pl011_initializes_and_unknown_type_is_rejected() {
    let regs = Regs::default();
    let mut uart =
        Uart::init_on(desc(1, 115_200), regs.clone(), clock(), UartPlatform::Arm).unwrap();
    assert_eq!(uart.serial_type(), SerialType::Pl011);
    assert!(!uart.flags().use_after_exit_boot_services());
    uart.putc(b'x');
    assert_eq!(regs.written_to(0), [u64::from(b'x')]);

    let err = Uart::init_on(desc(0xff, 115_200), Regs::default(), clock(), UartPlatform::Arm);
    assert_eq!(err.err(), Some(Error::Unsupported));
}

#[test]
fn pc_drives_only_ns16550() {
    for serial_type in [1, 2, 3] {
        let regs = Regs::default();
        let err = Uart::init_on(desc(serial_type, 115_200), regs.clone(), clock(), UartPlatform::Pc);
        assert_eq!(err.err(), Some(Error::Unsupported));
        assert!(regs.writes().is_empty());
    }
}

#[test]
fn arm_falls_back_to_ns16550() {
    let regs = Regs::default();
    regs.pin(LSR, 0x60);
    let mut uart =
        Uart::init_on(desc(0, 115_200), regs.clone(), clock(), UartPlatform::Arm).unwrap();
    assert_eq!(uart.serial_type(), SerialType::Ns16550);
    assert!(!regs.writes().iter().any(|&(reg, value)| reg == LCR && value & 0x80 != 0));
    uart.putc(b'y');
    assert_eq!(regs.written_to(0), [u64::from(b'y')]);
}

#[test]
fn pl011_drops_byte_while_fifo_full() {
    let regs = Regs::default();
    regs.pin(0x18, 1 << 5);
    let mut uart =
        Uart::init_on(desc(1, 0), regs.clone(), clock(), UartPlatform::Arm).unwrap();
    uart.putc(b'x');
    assert!(regs.written_to(0).is_empty());
}

#[test]
fn ns16550_init_sequence_programs_divisor() {
    let regs = Regs::default();
    regs.pin(LSR, 0x60);
    Uart::init_on(desc(0, 9600), regs.clone(), clock(), UartPlatform::Pc).unwrap();

    assert_eq!(
        regs.writes(),
        [
            (LCR, 0x03),
            (1, 0x00),
            (4, 0x0b),
            (LCR, 0x83),
            (0, 12),
            (1, 0),
            (LCR, 0x03),
            (FCR, 0x01),
            (FCR, 0x07),
        ]
    );
}

#[test]
fn ns16550_keeps_firmware_baud() {
    let regs = Regs::default();
    Uart::init_on(desc(0, 0), regs.clone(), clock(), UartPlatform::Arm).unwrap();
    assert!(!regs.written_to(LCR).contains(&0x83));
}

#[test]
fn ns16550_rejects_zero_baud_when_programming() {
    let err = Uart::init_on(desc(0, 0), Regs::default(), clock(), UartPlatform::Pc);
    assert_eq!(err.err(), Some(Error::InvalidParameter));
}

#[test]
fn ns16550_absent_device() {
    let regs = Regs::default();
    regs.pin(LCR, 0xff);
    let err = Uart::init_on(desc(0, 115_200), regs, clock(), UartPlatform::Arm);
    assert_eq!(err.err(), Some(Error::DeviceError));
}

#[test]
fn ns16550_without_fifo() {
    let regs = Regs::default();
    regs.pin(FCR, 0);
    Uart::init_on(desc(0, 115_200), regs.clone(), clock(), UartPlatform::Arm).unwrap();
    assert_eq!(regs.written_to(FCR), [0x01, 0x00]);
}

#[test]
fn ns16550_waits_for_transmitter() {
    let regs = Regs::default();
    let mut uart =
        Uart::init_on(desc(0, 115_200), regs.clone(), clock(), UartPlatform::Arm).unwrap();
    uart.putc(b'a');
    regs.pin(LSR, 0x20);
    uart.putc(b'b');
    assert_eq!(regs.written_to(0), [u64::from(b'b')]);
}

#[test]
fn divisor_never_reaches_zero() {
    assert_eq!(ns16550::divisor(115_200), 1);
    assert_eq!(ns16550::divisor(230_400), 1);
    assert_eq!(ns16550::divisor(57_600), 2);
}

#[test]
fn s5l_transmits_when_fifo_empty() {
    let regs = Regs::default();
    regs.pin(0x10, 0x2);
    let mut uart =
        Uart::init_on(desc(3, 0), regs.clone(), clock(), UartPlatform::Arm).unwrap();
    uart.putc(b'k');
    assert_eq!(regs.written_to(0x20), [u64::from(b'k')]);
}

const DATA: u16 = 0xa40;
const STATUS: u16 = 0xa48;
const SCRATCHPAD1: u16 = 0xc20;

#[test]
fn tmfifo_sends_header_and_payload_once_host_is_alive() {
    let regs = Regs::default();
    let mut uart =
        Uart::init_on(desc(2, 0), regs.clone(), clock(), UartPlatform::Arm).unwrap();
    assert!(uart.flags().use_after_exit_boot_services());

    uart.putc(b'a');
    assert_eq!(uart.link_state(), Some(LinkState::NotConnected));
    assert!(regs.written_to(DATA).is_empty());

    regs.set(SCRATCHPAD1, 1);
    uart.putc(b'b');
    assert_eq!(uart.link_state(), Some(LinkState::Connected));
    assert_eq!(regs.written_to(DATA), [0x0001_0003, u64::from(b'b')]);
    assert_eq!(regs.written_to(SCRATCHPAD1), [0]);

    // Within the check period the link is trusted without probing.
    uart.putc(b'c');
    assert_eq!(regs.written_to(DATA).len(), 4);
    assert_eq!(regs.written_to(SCRATCHPAD1), [0]);
}

#[test]
fn tmfifo_gives_up_on_a_full_fifo() {
    let regs = Regs::default();
    let mut uart =
        Uart::init_on(desc(2, 0), regs.clone(), clock(), UartPlatform::Arm).unwrap();
    regs.set(SCRATCHPAD1, 1);
    uart.putc(b'a');
    assert_eq!(uart.link_state(), Some(LinkState::Connected));

    // Host keeps signalling but never drains.
    regs.pin(STATUS, 255);
    regs.pin(SCRATCHPAD1, 1);
    uart.putc(b'b');
    assert_eq!(uart.link_state(), Some(LinkState::ConnectedButFull));
    assert_eq!(regs.written_to(DATA).len(), 2);
}

#[test]
fn tmfifo_drops_link_when_host_goes_quiet() {
    let regs = Regs::default();
    let mut uart =
        Uart::init_on(desc(2, 0), regs.clone(), clock(), UartPlatform::Arm).unwrap();
    regs.set(SCRATCHPAD1, 1);
    uart.putc(b'a');

    regs.pin(STATUS, 255);
    uart.putc(b'b');
    assert_eq!(uart.link_state(), Some(LinkState::NotConnected));
    assert_eq!(regs.written_to(DATA).len(), 2);
}
