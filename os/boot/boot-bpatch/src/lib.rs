//! # Binary Patching
//!
//! A hypervisor image can carry platform-specific fixes that the boot
//! loader applies in place before jumping to it. Three ELF sections
//! describe them:
//!
//! | Section                        | Records                              |
//! |--------------------------------|--------------------------------------|
//! | `.match_patch_group`           | [`MatchPredicate`], 32 bytes each    |
//! | `.bpatch_array`                | [`BinaryPatch`], 48 bytes each       |
//! | `__patchable_function_entries` | `u64` link addresses of preambles    |
//!
//! Every predicate that matches the running platform (a masked system
//! register compare, or ACPI OEM ids) selects its patch group; every
//! descriptor of a selected group is applied once and marked applied in
//! the image, so running the engine again is harmless.
//!
//! Patch targets are link-time addresses. They are relocated by the
//! distance between where `.match_patch_group` sits in memory and where
//! the linker put it.
//!
//! The caller keeps the targets writable for the duration of the call.
//! Rewritten instructions are cleaned through [`CodeCache::code_update`]
//! and committed once at the end of the run.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

pub mod descriptor;
pub mod elf;
mod engine;
pub mod predicate;

pub use descriptor::{BinaryPatch, PatchType};
pub use elf::{PatchSections, SectionRange};
pub use engine::{FUNC_PREAMBLE_SIZE, PatchEngine, PatchReport, branch};
pub use predicate::{AcpiLookup, GlobalAcpi, MatchKind, MatchPredicate};

use boot_cpu::{CodeCache, SysRegReader};
use boot_error::Result;
use log::debug;

/// Apply every patch group of the ELF file at `image` that matches this
/// platform.
///
/// An image without a match-group section or without descriptors is left
/// untouched.
///
/// # Errors
/// [`boot_error::Error::InvalidParameter`] for a null image; ELF format
/// errors from [`PatchSections::collect`]. Individual descriptors that
/// fail are logged and counted in the report.
///
/// # Safety
/// See [`PatchEngine::new`].
pub unsafe fn bapply_patch_image<C, A>(
    image: *mut u8,
    len: usize,
    cpu: &C,
    acpi: &A,
) -> Result<PatchReport>
where
    C: CodeCache + SysRegReader,
    A: AcpiLookup,
{
    debug!("Applying Binary Patches.");
    let engine = unsafe { PatchEngine::new(image, len, cpu, acpi) }?;
    Ok(engine.run())
}
