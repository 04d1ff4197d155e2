use core::sync::atomic::{AtomicBool, Ordering};

static IN_BOOT_SERVICES: AtomicBool = AtomicBool::new(true);

/// Whether firmware boot services are still available.
pub fn in_boot_services() -> bool {
    IN_BOOT_SERVICES.load(Ordering::Acquire)
}

/// Record the boot-services state. Called by firmware implementations when
/// they leave (or, in hosted environments, re-enter) boot services.
pub fn set_in_boot_services(active: bool) {
    IN_BOOT_SERVICES.store(active, Ordering::Release);
}
