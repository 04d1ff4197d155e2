use crate::{CtrEl0, LoadRegister};

impl LoadRegister for CtrEl0 {
    fn load() -> Self {
        let ctr: u64;
        unsafe {
            core::arch::asm!("mrs {}, ctr_el0", out(reg) ctr, options(nomem, nostack, preserves_flags));
        }
        Self::from_bits(ctr)
    }
}
