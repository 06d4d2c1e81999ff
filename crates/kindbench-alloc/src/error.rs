//! Allocator error type.

use thiserror::Error;

use crate::kind::Kind;

/// Failure reported by [`crate::KindAllocator`] or [`crate::SystemAllocator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The requested size/alignment pair does not form a valid layout.
    #[error("invalid layout: size={size} align={align}")]
    InvalidLayout { size: usize, align: usize },
    /// The platform allocator returned null.
    #[error("out of memory allocating {size} bytes")]
    OutOfMemory { size: usize },
    /// The kind is registered but has no backing memory on this machine.
    #[error("kind '{}' is not available", .0.as_str())]
    KindUnavailable(Kind),
}
