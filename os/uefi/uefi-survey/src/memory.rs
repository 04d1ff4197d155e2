//! # Pool Allocator
//!
//! Rust's global allocator on top of the boot services pool. Once boot
//! services are gone allocations fail and frees are dropped.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::{NonNull, null_mut};
use uefi::boot::{self, MemoryType};

/// The pool block a user pointer was carved from, stored in the word
/// right below the user pointer.
#[derive(Clone, Copy)]
#[repr(transparent)]
struct PoolHeader(NonNull<u8>);

const HEADER: usize = size_of::<PoolHeader>();

impl PoolHeader {
    /// Pool bytes needed so that an aligned block of `layout` plus its
    /// header fits anywhere in the allocation.
    fn pool_size(layout: Layout) -> Option<(usize, usize)> {
        let align = layout.align().max(align_of::<PoolHeader>());
        let total = layout.size().max(1).checked_add(align)?.checked_add(HEADER)?;
        Some((total, align))
    }

    /// # Safety
    /// `user` must have room for a header right below it.
    #[allow(clippy::cast_ptr_alignment)]
    unsafe fn store(self, user: *mut u8) {
        unsafe { user.sub(HEADER).cast::<Self>().write(self) };
    }

    /// # Safety
    /// `user` must come from `PoolAllocator::alloc`.
    #[allow(clippy::cast_ptr_alignment)]
    unsafe fn load(user: *mut u8) -> Self {
        unsafe { user.sub(HEADER).cast::<Self>().read() }
    }
}

pub struct PoolAllocator;

#[global_allocator]
static POOL: PoolAllocator = PoolAllocator;

unsafe impl GlobalAlloc for PoolAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if !boot_firmware::in_boot_services() {
            return null_mut();
        }
        let Some((total, align)) = PoolHeader::pool_size(layout) else {
            return null_mut();
        };
        let Ok(block) = boot::allocate_pool(MemoryType::LOADER_DATA, total) else {
            return null_mut();
        };

        let offset = (block.as_ptr() as usize + HEADER).next_multiple_of(align)
            - block.as_ptr() as usize;
        // Safety: offset + size stays within `total` bytes of the block.
        unsafe {
            let user = block.as_ptr().add(offset);
            PoolHeader(block).store(user);
            user
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        if ptr.is_null() || !boot_firmware::in_boot_services() {
            return;
        }
        // Safety: every non-null pointer we hand out carries a header.
        let PoolHeader(block) = unsafe { PoolHeader::load(ptr) };
        let _ = unsafe { boot::free_pool(block) };
    }
}
