//! Size classes for small allocations.
//!
//! Requests up to [`MAX_SMALL_SIZE`] are rounded up to one of
//! [`NUM_SIZE_CLASSES`] classes so that freed blocks of a class can be
//! recycled for any later request of the same class.

use std::alloc::Layout;

/// Minimum block size (bytes).
pub const MIN_SIZE: usize = 16;

/// Alignment of every small block.
pub const MIN_ALIGN: usize = 16;

/// Largest request served from a size class. Above this, use the large path.
pub const MAX_SMALL_SIZE: usize = 32 * 1024;

/// Number of size classes.
pub const NUM_SIZE_CLASSES: usize = 32;

/// Class sizes: 16-byte steps up to 128, 32-byte steps up to 384, then wider.
const SIZE_TABLE: [usize; NUM_SIZE_CLASSES] = [
    16, 32, 48, 64, 80, 96, 112, 128, // 16-byte steps
    160, 192, 224, 256, 288, 320, 352, 384, // 32-byte steps
    448, 512, 640, 768, 896, 1024, 1280, 1536, // wider steps
    2048, 2560, 3072, 4096, 8192, 16384, 24576, 32768, // page-ish classes
];

/// Returns the class index serving `size`, or `None` for large requests.
#[must_use]
pub fn class_index(size: usize) -> Option<usize> {
    let size = size.max(MIN_SIZE);
    if size > MAX_SMALL_SIZE {
        return None;
    }
    Some(SIZE_TABLE.partition_point(|&class_size| class_size < size))
}

/// Block size of class `index`, or 0 when out of range.
#[must_use]
pub fn class_size(index: usize) -> usize {
    SIZE_TABLE.get(index).copied().unwrap_or(0)
}

/// Layout of every block in class `index`.
#[must_use]
pub fn class_layout(index: usize) -> Option<Layout> {
    let size = SIZE_TABLE.get(index).copied()?;
    Layout::from_size_align(size, MIN_ALIGN).ok()
}
