//! Platform allocator access and the reference allocator.
//!
//! All memory in this crate ultimately comes from `std::alloc::System`. The
//! [`SystemAllocator`] exposes it directly, with the same [`Block`] API as
//! the kind allocator, as the baseline the harness measures against.

#![allow(unsafe_code)]

use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr::NonNull;

use crate::allocator::Block;
use crate::error::AllocError;
use crate::size_class::MIN_ALIGN;

/// Allocate `layout` from the platform allocator. `layout.size()` must be non-zero.
pub(crate) fn system_alloc(layout: Layout) -> Result<NonNull<u8>, AllocError> {
    debug_assert!(layout.size() > 0);
    // SAFETY: callers only pass layouts with a non-zero size.
    let raw = unsafe { System.alloc(layout) };
    NonNull::new(raw).ok_or(AllocError::OutOfMemory {
        size: layout.size(),
    })
}

/// Release memory obtained from [`system_alloc`].
///
/// # Safety
///
/// `ptr` must come from `system_alloc(layout)` and must not be released twice.
pub(crate) unsafe fn system_dealloc(ptr: NonNull<u8>, layout: Layout) {
    // SAFETY: guaranteed by the caller.
    unsafe { System.dealloc(ptr.as_ptr(), layout) };
}

/// The platform allocator with no kind handling.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl SystemAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Allocate `size` bytes (zero is rounded up to one).
    pub fn allocate(&self, size: usize) -> Result<Block, AllocError> {
        let size = size.max(1);
        let layout = Layout::from_size_align(size, MIN_ALIGN).map_err(|_| {
            AllocError::InvalidLayout {
                size,
                align: MIN_ALIGN,
            }
        })?;
        let ptr = system_alloc(layout)?;
        Ok(Block::from_system(ptr, layout))
    }

    /// Return a block to the platform allocator.
    pub fn deallocate(&self, block: Block) {
        let (ptr, layout) = block.into_raw_parts();
        // SAFETY: every `Block` owns memory from `system_alloc` with its
        // layout, and consuming it by value prevents a second release.
        unsafe { system_dealloc(ptr, layout) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_free() {
        let alloc = SystemAllocator::new();
        let block = alloc.allocate(256).unwrap();
        assert_eq!(block.size(), 256);
        assert_eq!(block.as_ptr() as usize % MIN_ALIGN, 0);
        assert!(block.kind().is_none());
        alloc.deallocate(block);
    }

    #[test]
    fn zero_size_rounds_up() {
        let alloc = SystemAllocator::new();
        let block = alloc.allocate(0).unwrap();
        assert_eq!(block.size(), 1);
        alloc.deallocate(block);
    }

    #[test]
    fn oversized_request_is_invalid() {
        let alloc = SystemAllocator::new();
        assert!(matches!(
            alloc.allocate(usize::MAX),
            Err(AllocError::InvalidLayout { .. })
        ));
    }
}
