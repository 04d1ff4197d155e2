#![allow(dead_code)]

use boot_acpi::SdtHeader;
use boot_bpatch::{AcpiLookup, BinaryPatch, PatchReport, bapply_patch_image};
use boot_cpu::{CodeCache, SysReg, SysRegReader};
use boot_error::{Error, Result};
use std::cell::{Cell, RefCell};

/// Link address of the first byte after the ELF header.
pub const LINK_BASE: u64 = 0xffff_8000_0010_0000;
pub const DATA: u64 = LINK_BASE;
pub const TEXT: u64 = LINK_BASE + 0x1000;
pub const ENTRIES: u64 = LINK_BASE + 0x2000;
pub const ARRAY: u64 = LINK_BASE + 0x3000;
pub const MATCH: u64 = LINK_BASE + 0x4000;

pub const NOP: u32 = 0xd503_201f;
pub const DATA_FILL: u32 = 0x1111_1111;

const EHDR_SIZE: usize = 64;
const SHDR_SIZE: usize = 64;
const SHT_PROGBITS: u32 = 1;
const SHT_STRTAB: u32 = 3;

/// An ELF64 file laid out the way a loader leaves it in memory: section
/// `addr` sits at file offset `EHDR_SIZE + (addr - LINK_BASE)`.
pub struct ElfImage {
    pub bytes: Vec<u8>,
}

impl ElfImage {
    pub fn build(sections: &[(&str, u64, Vec<u8>)]) -> Self {
        let payload = sections
            .iter()
            .map(|(_, addr, data)| (addr - LINK_BASE) as usize + data.len())
            .max()
            .unwrap_or(0);
        let mut bytes = vec![0u8; EHDR_SIZE + payload];
        for (_, addr, data) in sections {
            let at = EHDR_SIZE + (addr - LINK_BASE) as usize;
            bytes[at..at + data.len()].copy_from_slice(data);
        }

        let mut names = vec![0u8];
        let mut name_offsets = Vec::new();
        for (name, _, _) in sections {
            name_offsets.push(names.len() as u32);
            names.extend_from_slice(name.as_bytes());
            names.push(0);
        }
        let strtab_name = names.len() as u32;
        names.extend_from_slice(b".shstrtab\0");
        let strtab_offset = bytes.len();
        bytes.extend_from_slice(&names);

        bytes.resize(bytes.len().next_multiple_of(8), 0);
        let shoff = bytes.len();
        let shnum = sections.len() + 2;

        bytes.extend_from_slice(&[0u8; SHDR_SIZE]);
        for ((_, addr, data), name) in sections.iter().zip(&name_offsets) {
            let offset = (EHDR_SIZE as u64) + (addr - LINK_BASE);
            bytes.extend_from_slice(&shdr(*name, SHT_PROGBITS, *addr, offset, data.len() as u64));
        }
        bytes.extend_from_slice(&shdr(
            strtab_name,
            SHT_STRTAB,
            0,
            strtab_offset as u64,
            names.len() as u64,
        ));

        let ehdr = &mut bytes[..EHDR_SIZE];
        ehdr[..4].copy_from_slice(b"\x7fELF");
        ehdr[4] = 2;
        ehdr[5] = 1;
        ehdr[6] = 1;
        ehdr[16..18].copy_from_slice(&2u16.to_le_bytes());
        ehdr[18..20].copy_from_slice(&183u16.to_le_bytes());
        ehdr[20..24].copy_from_slice(&1u32.to_le_bytes());
        ehdr[40..48].copy_from_slice(&(shoff as u64).to_le_bytes());
        ehdr[52..54].copy_from_slice(&(EHDR_SIZE as u16).to_le_bytes());
        ehdr[58..60].copy_from_slice(&(SHDR_SIZE as u16).to_le_bytes());
        ehdr[60..62].copy_from_slice(&(shnum as u16).to_le_bytes());
        ehdr[62..64].copy_from_slice(&((shnum - 1) as u16).to_le_bytes());

        Self { bytes }
    }

    /// In-memory address of link address `addr`.
    pub fn mem(&self, addr: u64) -> u64 {
        self.bytes.as_ptr() as u64 + EHDR_SIZE as u64 + (addr - LINK_BASE)
    }

    fn at(&self, addr: u64) -> usize {
        EHDR_SIZE + (addr - LINK_BASE) as usize
    }

    pub fn u32_at(&self, addr: u64) -> u32 {
        let at = self.at(addr);
        u32::from_le_bytes(self.bytes[at..at + 4].try_into().unwrap())
    }

    pub fn set_u32(&mut self, addr: u64, value: u32) {
        let at = self.at(addr);
        self.bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn patch(&self, index: usize) -> BinaryPatch {
        let at = self.at(ARRAY) + index * BinaryPatch::SIZE;
        BinaryPatch::from_bytes(self.bytes[at..at + BinaryPatch::SIZE].try_into().unwrap())
    }

    pub fn apply(&mut self, cpu: &MockCpu, acpi: &impl AcpiLookup) -> Result<PatchReport> {
        unsafe { bapply_patch_image(self.bytes.as_mut_ptr(), self.bytes.len(), cpu, acpi) }
    }
}

fn shdr(name: u32, kind: u32, addr: u64, offset: u64, size: u64) -> [u8; SHDR_SIZE] {
    let mut sh = [0u8; SHDR_SIZE];
    sh[0..4].copy_from_slice(&name.to_le_bytes());
    sh[4..8].copy_from_slice(&kind.to_le_bytes());
    sh[16..24].copy_from_slice(&addr.to_le_bytes());
    sh[24..32].copy_from_slice(&offset.to_le_bytes());
    sh[32..40].copy_from_slice(&size.to_le_bytes());
    sh[48..56].copy_from_slice(&8u64.to_le_bytes());
    sh
}

/// Records cache maintenance and answers `MIDR_EL1`.
#[derive(Default)]
pub struct MockCpu {
    pub midr: u64,
    pub updates: RefCell<Vec<(u64, usize)>>,
    pub commits: Cell<usize>,
}

impl MockCpu {
    pub fn cortex_a72() -> Self {
        Self {
            midr: 0x410f_d083,
            ..Self::default()
        }
    }
}

impl CodeCache for MockCpu {
    unsafe fn code_update(&self, va: u64, len: usize) {
        self.updates.borrow_mut().push((va, len));
    }

    fn code_update_commit(&self) {
        self.commits.set(self.commits.get() + 1);
    }
}

impl SysRegReader for MockCpu {
    fn read_sysreg(&self, reg: SysReg) -> Result<u64> {
        match reg {
            SysReg::MidrEl1 => Ok(self.midr),
            _ => Err(Error::NotFound),
        }
    }
}

pub fn no_acpi(_: &[u8; 4]) -> Option<SdtHeader> {
    None
}

pub fn data_section() -> Vec<u8> {
    DATA_FILL.to_le_bytes().repeat(4)
}

pub fn text_section() -> Vec<u8> {
    NOP.to_le_bytes().repeat(64)
}

pub fn records<const N: usize>(items: impl IntoIterator<Item = [u8; N]>) -> Vec<u8> {
    items.into_iter().flatten().collect()
}
