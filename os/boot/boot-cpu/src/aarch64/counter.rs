use crate::Clock;

/// The virtual count of the ARM generic timer (`CNTVCT_EL0`).
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericTimer;

impl Clock for GenericTimer {
    fn ticks(&self) -> u64 {
        let cnt: u64;
        unsafe {
            core::arch::asm!("isb", "mrs {}, cntvct_el0", out(reg) cnt, options(nostack, preserves_flags));
        }
        cnt
    }

    fn frequency(&self) -> u64 {
        let frq: u64;
        unsafe {
            core::arch::asm!("mrs {}, cntfrq_el0", out(reg) frq, options(nomem, nostack, preserves_flags));
        }
        frq
    }
}
