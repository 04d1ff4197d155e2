//! Process-wide state: kept in its own test binary and a single test so
//! nothing else observes the transitions.

use boot_error::Error;
use boot_firmware::{Firmware, HostedFirmware, atexit, do_atexit, in_boot_services};
use std::sync::{Arc, Mutex};

#[test]
fn exit_handlers_and_boot_services() {
    let order = Arc::new(Mutex::new(Vec::new()));
    for i in 0..3 {
        let order = order.clone();
        atexit(move || order.lock().unwrap().push(i)).unwrap();
    }

    // A handler may queue another one; it runs in the same pass.
    let late = order.clone();
    atexit(move || {
        let inner = late.clone();
        atexit(move || inner.lock().unwrap().push(99)).unwrap();
    })
    .unwrap();

    do_atexit();
    assert_eq!(*order.lock().unwrap(), vec![99, 2, 1, 0]);

    let mut fw = HostedFirmware::builder().build();
    assert!(fw.in_boot_services());
    fw.exit_boot_services().unwrap();
    assert!(!in_boot_services());
    assert_eq!(fw.exit_boot_services(), Err(Error::AlreadyStarted));
    boot_firmware::set_in_boot_services(true);
}
