//! Large allocation layouts (>32KB).
//!
//! Large requests bypass the size classes and go straight to the platform
//! allocator. They are rounded up to whole pages and page aligned; the huge
//! arena uses 2 MiB pages so the block can be backed by a huge page.

use std::alloc::Layout;

use crate::error::AllocError;

/// Regular page size.
pub const PAGE_SIZE: usize = 4096;

/// Huge page size used by the huge arena.
pub const HUGE_PAGE_SIZE: usize = 2 * 1024 * 1024;

/// Rounds `size` up to a multiple of `page` (a power of two).
///
/// Returns `None` on overflow.
#[must_use]
pub fn page_align(size: usize, page: usize) -> Option<usize> {
    debug_assert!(page.is_power_of_two());
    Some(size.checked_add(page - 1)? & !(page - 1))
}

/// Layout for a large block of `size` bytes on pages of `page` bytes.
pub fn large_layout(size: usize, page: usize) -> Result<Layout, AllocError> {
    let invalid = AllocError::InvalidLayout { size, align: page };
    let mapped = page_align(size.max(1), page).ok_or_else(|| invalid.clone())?;
    Layout::from_size_align(mapped, page).map_err(|_| invalid)
}
