//! # ELF Section Discovery

use boot_error::{Error, Result};
use core::mem::size_of;
use core::ptr::read_unaligned;
use log::debug;

pub const PATCH_LOCATIONS: &str = "__patchable_function_entries";
pub const PATCH_ARRAY: &str = ".bpatch_array";
pub const MATCH_GROUPS: &str = ".match_patch_group";

// Minimal ELF64 definitions
#[repr(C)]
#[derive(Clone, Copy)]
#[allow(clippy::struct_field_names)]
struct Elf64Ehdr {
    e_ident: [u8; 16],
    e_type: u16,
    e_machine: u16,
    e_version: u32,
    e_entry: u64,
    e_phoff: u64,
    e_shoff: u64,
    e_flags: u32,
    e_ehsize: u16,
    e_phentsize: u16,
    e_phnum: u16,
    e_shentsize: u16,
    e_shnum: u16,
    e_shstrndx: u16,
}

#[repr(C)]
#[derive(Clone, Copy)]
#[allow(clippy::struct_field_names)]
struct Elf64Shdr {
    sh_name: u32,
    sh_type: u32,
    sh_flags: u64,
    sh_addr: u64,
    sh_offset: u64,
    sh_size: u64,
    sh_link: u32,
    sh_info: u32,
    sh_addralign: u64,
    sh_entsize: u64,
}

const SHT_NULL: u32 = 0;
const EI_MAGIC_BYTES: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// A section of the in-memory image: where its bytes are in the file and
/// where the linker placed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRange {
    /// Byte offset of the contents inside the image.
    pub offset: usize,
    pub len: usize,
    /// Link-time virtual address (`sh_addr`).
    pub addr: u64,
}

impl SectionRange {
    /// Number of whole `size`-byte records in the section.
    #[must_use]
    pub const fn records(&self, size: usize) -> usize {
        self.len / size
    }
}

/// The three sections the patch engine consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSections {
    pub locations: Option<SectionRange>,
    pub patches: Option<SectionRange>,
    pub match_groups: Option<SectionRange>,
}

impl PatchSections {
    /// Walk the section header table of the ELF64 little-endian file in
    /// `bytes` and pick out the patching sections.
    ///
    /// # Errors
    /// [`Error::BadHeader`] for a bad identification block,
    /// [`Error::UnexpectedEof`] if a header table or string table lies
    /// outside `bytes`, [`Error::InconsistentData`] if a patching section
    /// does.
    pub fn collect(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < size_of::<Elf64Ehdr>() {
            return Err(Error::UnexpectedEof);
        }

        // SAFETY: We just checked bounds; using read_unaligned to avoid alignment assumptions.
        let ehdr = unsafe { read_unaligned(bytes.as_ptr().cast::<Elf64Ehdr>()) };

        if ehdr.e_ident[0..4] != EI_MAGIC_BYTES {
            return Err(Error::BadHeader);
        }
        // Class = 2 (ELF64), Data = 1 (little-endian), Version = 1
        if ehdr.e_ident[4] != 2 || ehdr.e_ident[5] != 1 || ehdr.e_ident[6] != 1 {
            return Err(Error::BadHeader);
        }
        if usize::from(ehdr.e_shentsize) != size_of::<Elf64Shdr>() {
            return Err(Error::BadHeader);
        }

        let shoff = usize::try_from(ehdr.e_shoff).map_err(|_| Error::UnexpectedEof)?;
        let shnum = usize::from(ehdr.e_shnum);
        let end = size_of::<Elf64Shdr>()
            .checked_mul(shnum)
            .and_then(|size| size.checked_add(shoff))
            .ok_or(Error::UnexpectedEof)?;
        if end > bytes.len() {
            return Err(Error::UnexpectedEof);
        }

        let shdr = |index: usize| {
            let off = shoff + index * size_of::<Elf64Shdr>();
            // SAFETY: off + sizeof(Shdr) is within bytes by earlier bound check.
            unsafe { read_unaligned(bytes.as_ptr().add(off).cast::<Elf64Shdr>()) }
        };

        let strtab_index = usize::from(ehdr.e_shstrndx);
        if strtab_index >= shnum {
            return Err(Error::UnexpectedEof);
        }
        let strtab = range(bytes, &shdr(strtab_index)).ok_or(Error::UnexpectedEof)?;
        let names = &bytes[strtab.offset..strtab.offset + strtab.len];

        let mut sections = Self::default();
        for index in 0..shnum {
            let sh = shdr(index);
            if sh.sh_type == SHT_NULL {
                continue;
            }

            let slot = match section_name(names, sh.sh_name) {
                Some(PATCH_LOCATIONS) => &mut sections.locations,
                Some(PATCH_ARRAY) => &mut sections.patches,
                Some(MATCH_GROUPS) => &mut sections.match_groups,
                _ => continue,
            };
            let found = range(bytes, &sh).ok_or(Error::InconsistentData)?;
            debug!(
                "Section {index}: file offset {:#x}, {} bytes, linked at {:#x}",
                found.offset, found.len, found.addr
            );
            *slot = Some(found);
        }

        Ok(sections)
    }
}

fn range(bytes: &[u8], sh: &Elf64Shdr) -> Option<SectionRange> {
    let offset = usize::try_from(sh.sh_offset).ok()?;
    let len = usize::try_from(sh.sh_size).ok()?;
    (offset.checked_add(len)? <= bytes.len()).then_some(SectionRange {
        offset,
        len,
        addr: sh.sh_addr,
    })
}

fn section_name(names: &[u8], offset: u32) -> Option<&str> {
    let tail = names.get(usize::try_from(offset).ok()?..)?;
    let len = tail.iter().position(|&b| b == 0)?;
    core::str::from_utf8(&tail[..len]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_nul_terminated() {
        let names = b"\0.text\0.bpatch_array\0";
        assert_eq!(section_name(names, 1), Some(".text"));
        assert_eq!(section_name(names, 7), Some(PATCH_ARRAY));
        assert_eq!(section_name(names, 0), Some(""));
        assert_eq!(section_name(names, 64), None);
        assert_eq!(section_name(b"\0.unterminated", 1), None);
    }

    #[test]
    fn rejects_bad_identification() {
        let mut bytes = [0u8; 64];
        assert_eq!(PatchSections::collect(&bytes), Err(Error::BadHeader));
        bytes[..4].copy_from_slice(&EI_MAGIC_BYTES);
        bytes[4] = 1;
        assert_eq!(PatchSections::collect(&bytes), Err(Error::BadHeader));
        assert_eq!(PatchSections::collect(&bytes[..32]), Err(Error::UnexpectedEof));
    }

    #[test]
    fn records_ignore_partial_tail() {
        let range = SectionRange {
            offset: 0,
            len: 100,
            addr: 0,
        };
        assert_eq!(range.records(48), 2);
        assert_eq!(range.records(32), 3);
    }
}
