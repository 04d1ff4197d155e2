use boot_cpu::SysReg;
use boot_cpu::sysreg::encode;
use std::collections::HashSet;

#[test]
fn encodings_match_mrs_operands() {
    assert_eq!(SysReg::MidrEl1.id(), 0x8_0000);
    assert_eq!(SysReg::CurrentEl.id(), 0x8_4240);
    assert_eq!(SysReg::IdAa64Pfr0El1.id(), 0x8_0400);
    assert_eq!(SysReg::MpidrEl1.id(), 0x8_00a0);
    // Only bit 0 of op0 is kept.
    assert_eq!(encode(2, 0, 0, 0, 0), 0);
}

#[test]
fn ids_are_unique_and_resolve() {
    let ids: HashSet<u32> = SysReg::ALL.iter().map(|r| r.id()).collect();
    assert_eq!(ids.len(), SysReg::ALL.len());
    for reg in SysReg::ALL {
        assert_eq!(SysReg::from_id(reg.id()), Some(*reg));
    }
    assert_eq!(SysReg::from_id(0x1234), None);
    assert_eq!(SysReg::IdAa64Mmfr2El1.name(), "ID_AA64MMFR2_EL1");
}
