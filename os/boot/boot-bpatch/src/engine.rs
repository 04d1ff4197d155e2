//! # Patch Application

use crate::descriptor::{BinaryPatch, PatchType};
use crate::elf::{PatchSections, SectionRange};
use crate::predicate::{AcpiLookup, MatchPredicate};
use alloc::vec::Vec;
use boot_cpu::{CodeCache, SysRegReader};
use boot_error::{Error, Result};
use core::ptr::{read_unaligned, write_unaligned};
use log::{debug, error};

/// Bytes of patchable preamble in front of (or at) a function entry.
pub const FUNC_PREAMBLE_SIZE: u64 = 16;

const BRANCH_OPCODE: u32 = 0x1400_0000;
const BRANCH_IMM26_MASK: u64 = (1 << 26) - 1;
const INSTRUCTION_SIZE: u32 = 4;

/// AArch64 `B` from `from` to `to`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn branch(from: u64, to: u64) -> u32 {
    BRANCH_OPCODE | ((to.wrapping_sub(from) >> 2) & BRANCH_IMM26_MASK) as u32
}

/// Outcome of one [`PatchEngine::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Groups whose predicate matched, in section order.
    pub matched_groups: Vec<u32>,
    /// Descriptors written during this run.
    pub applied: usize,
    /// Matching descriptors found already applied.
    pub already_applied: usize,
    /// Matching descriptors that could not be applied.
    pub failed: usize,
}

/// Applies the patch sections of one in-memory ELF file.
///
/// Every access to the image goes through raw pointers: patch targets
/// usually live inside the very image whose descriptors are being updated.
pub struct PatchEngine<'a, C, A> {
    base: *mut u8,
    sections: PatchSections,
    offset: u64,
    cpu: &'a C,
    acpi: &'a A,
}

impl<'a, C, A> PatchEngine<'a, C, A>
where
    C: CodeCache + SysRegReader,
    A: AcpiLookup,
{
    /// Locate the patching sections of the ELF file at `base`.
    ///
    /// The relocation offset is the distance between where
    /// `.match_patch_group` sits in memory and its link-time address; it
    /// is added to every link-time address the engine dereferences.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] for a null image, otherwise whatever
    /// [`PatchSections::collect`] reports.
    ///
    /// # Safety
    /// `base` must point at `len` readable and writable bytes holding the
    /// ELF file, and every relocated patch target must be writable while
    /// the engine is alive.
    pub unsafe fn new(base: *mut u8, len: usize, cpu: &'a C, acpi: &'a A) -> Result<Self> {
        if base.is_null() {
            error!("Bad Elf pointer");
            return Err(Error::InvalidParameter);
        }
        let sections = {
            let bytes = unsafe { core::slice::from_raw_parts(base.cast_const(), len) };
            PatchSections::collect(bytes)?
        };
        let offset = sections.match_groups.map_or(0, |s| {
            (base as u64)
                .wrapping_add(s.offset as u64)
                .wrapping_sub(s.addr)
        });
        Ok(Self {
            base,
            sections,
            offset,
            cpu,
            acpi,
        })
    }

    #[must_use]
    pub const fn sections(&self) -> &PatchSections {
        &self.sections
    }

    #[must_use]
    pub const fn relocation_offset(&self) -> u64 {
        self.offset
    }

    /// Evaluate every predicate and apply the descriptors of each matching
    /// group, then make the rewritten code visible to instruction fetch.
    ///
    /// Failing descriptors are logged and counted; they do not stop the
    /// run.
    #[must_use]
    pub fn run(&self) -> PatchReport {
        let mut report = PatchReport::default();

        let Some(groups) = self.sections.match_groups.filter(|s| s.len > 0) else {
            debug!("No Matching Patch Group section found.");
            return report;
        };
        let patches = self
            .sections
            .patches
            .map_or(0, |s| s.records(BinaryPatch::SIZE));
        debug!("{patches} Binary patches embedded into image.");
        if patches == 0 {
            return report;
        }

        let mut code_written = false;
        for index in 0..groups.records(MatchPredicate::SIZE) {
            let predicate = self.predicate(groups, index);
            debug!("Found Entry {:?} GroupId {:#x}", predicate.kind, predicate.group);
            match predicate.evaluate(self.cpu, self.acpi) {
                Ok(true) => {
                    debug!("Applying patchGroupId {}.", predicate.group);
                    report.matched_groups.push(predicate.group);
                    code_written |= self.apply_group(predicate.group, &mut report);
                }
                Ok(false) => debug!("patchGroupId {} not applied", predicate.group),
                Err(e) => error!("Error getting a new patchGroupId: {e}"),
            }
        }

        if code_written {
            self.cpu.code_update_commit();
        }
        report
    }

    /// Apply one descriptor if it belongs to `group`.
    ///
    /// Returns whether instructions were rewritten.
    ///
    /// # Errors
    /// * [`Error::Aborted`]: the descriptor belongs to another group.
    /// * [`Error::InvalidParameter`]: null target or bad `write_size`.
    /// * [`Error::NotFound`]: no patchable entry for a function patch.
    /// * [`Error::Unsupported`]: unknown patch type.
    pub fn apply(&self, patch: &mut BinaryPatch, group: u32) -> Result<bool> {
        if patch.group != group {
            return Err(Error::Aborted);
        }
        if patch.is_applied {
            return Ok(false);
        }

        let location = match patch.patch_type() {
            Some(PatchType::Data) => self.apply_data(patch)?,
            Some(PatchType::Zone) => self.apply_zone(patch)?,
            Some(PatchType::Function) => self.apply_function(patch)?,
            None => {
                error!("Patch Type is not supported {}", patch.kind);
                return Err(Error::Unsupported);
            }
        };
        patch.patch_location = location;
        patch.is_applied = true;
        Ok(patch.patch_type() != Some(PatchType::Data))
    }

    /// First patchable entry within [`FUNC_PREAMBLE_SIZE`] bytes past
    /// `function`, as a link-time address.
    ///
    /// # Errors
    /// [`Error::NotFound`] if there is none.
    pub fn find_placeholder(&self, function: u64) -> Result<u64> {
        let found = self.sections.locations.and_then(|s| {
            (0..s.records(8))
                .map(|i| unsafe { read_unaligned(self.record_ptr(s, i, 8).cast::<u64>()) })
                .enumerate()
                .find(|&(_, entry)| entry.wrapping_sub(function) < FUNC_PREAMBLE_SIZE)
        });
        match found {
            Some((index, entry)) => {
                debug!("Detect an entry for {function:#x} at {entry:#x}, index {index}");
                Ok(entry)
            }
            None => {
                debug!("Required placeholder not found for function at {function:#x}");
                Err(Error::NotFound)
            }
        }
    }

    fn apply_group(&self, group: u32, report: &mut PatchReport) -> bool {
        let Some(patches) = self.sections.patches else {
            return false;
        };
        let mut code_written = false;
        for index in 0..patches.records(BinaryPatch::SIZE) {
            let ptr = self.record_ptr(patches, index, BinaryPatch::SIZE);
            let mut patch =
                BinaryPatch::from_bytes(&unsafe { read_unaligned(ptr.cast::<[u8; BinaryPatch::SIZE]>()) });
            let was_applied = patch.is_applied;
            match self.apply(&mut patch, group) {
                Ok(_) if was_applied => report.already_applied += 1,
                Ok(code) => {
                    debug!("Patch {index} successfully applied.");
                    unsafe { write_unaligned(ptr.cast::<[u8; BinaryPatch::SIZE]>(), patch.to_bytes()) };
                    report.applied += 1;
                    code_written |= code;
                }
                Err(Error::Aborted) => {}
                Err(e) => {
                    error!("Patch {index} of group {group} failed: {e}");
                    report.failed += 1;
                }
            }
        }
        code_written
    }

    fn apply_data(&self, patch: &BinaryPatch) -> Result<u64> {
        let dst = patch.target.wrapping_add(self.offset);
        let size = patch.write_size as usize;
        if patch.target == 0 || dst == 0 || size == 0 || size > size_of::<u64>() {
            return Err(Error::InvalidParameter);
        }
        debug!(
            "Modifying variable at {dst:#x} - newValue {:#x} size {size}",
            patch.new_value
        );
        let value = patch.new_value.to_le_bytes();
        unsafe { core::ptr::copy_nonoverlapping(value.as_ptr(), dst as *mut u8, size) };
        Ok(dst)
    }

    fn apply_zone(&self, patch: &BinaryPatch) -> Result<u64> {
        if patch.target == 0 || patch.write_size != INSTRUCTION_SIZE {
            return Err(Error::InvalidParameter);
        }
        debug!("Let's patch a Zone at {:#x}", patch.target);
        Ok(self.write_opcode(patch.target, patch.opcode()))
    }

    fn apply_function(&self, patch: &BinaryPatch) -> Result<u64> {
        if patch.write_size != INSTRUCTION_SIZE {
            error!(
                "Expected instruction size is {INSTRUCTION_SIZE} but we have {}",
                patch.write_size
            );
            return Err(Error::InvalidParameter);
        }
        debug!(
            "Let's patch a Function at {:#x} with {:#x}",
            patch.target, patch.replacement
        );
        let placeholder = self.find_placeholder(patch.target)?;
        Ok(self.write_opcode(placeholder, branch(placeholder, patch.replacement)))
    }

    /// Store `opcode` at link-time address `at`; returns the relocated
    /// address.
    fn write_opcode(&self, at: u64, opcode: u32) -> u64 {
        let va = at.wrapping_add(self.offset);
        let ptr = va as *mut u32;
        let old = unsafe { read_unaligned(ptr) };
        debug!("- The opcode {old:#x} is replaced with {opcode:#x}");
        unsafe {
            write_unaligned(ptr, opcode);
            self.cpu.code_update(va, INSTRUCTION_SIZE as usize);
        }
        va
    }

    fn predicate(&self, section: SectionRange, index: usize) -> MatchPredicate {
        let ptr = self.record_ptr(section, index, MatchPredicate::SIZE);
        MatchPredicate::from_bytes(&unsafe { read_unaligned(ptr.cast::<[u8; MatchPredicate::SIZE]>()) })
    }

    fn record_ptr(&self, section: SectionRange, index: usize, size: usize) -> *mut u8 {
        // In bounds: `PatchSections::collect` checked the section against
        // the image and `index` is below `section.records(size)`.
        unsafe { self.base.add(section.offset + index * size) }
    }
}
