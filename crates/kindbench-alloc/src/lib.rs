//! # kindbench-alloc
//!
//! Kind-aware heap allocator: the system under test of the kindbench harness.
//!
//! Every allocation names an allocation [`Kind`]. The process-wide
//! [`KindRegistry`] resolves a kind to an arena, applying the fallback policy
//! for preferred kinds. Each arena serves small requests from size classes
//! with a bounded magazine cache of recycled blocks and sends large requests
//! straight to the platform allocator with page (or huge page) alignment.
//!
//! - **Kinds** (`kind`): kind identifiers, registry and fallback resolution
//! - **Size classes** (`size_class`): 16 B to 32 KiB class table
//! - **Magazines** (`magazine`): per-class caches of recycled blocks
//! - **Large path** (`large`): page-aligned layouts for big requests
//! - **Arenas** (`arena`): locked per-arena state and counters
//! - **Allocators** (`allocator`, `system`): the kind allocator and the
//!   platform reference allocator, sharing the [`Block`] handle

#![deny(unsafe_code)]

pub mod allocator;
pub mod arena;
pub mod error;
pub mod kind;
pub mod large;
pub mod magazine;
pub mod size_class;
pub mod system;

pub use allocator::{Block, KindAllocator};
pub use arena::{ArenaId, ArenaStats};
pub use error::AllocError;
pub use kind::{Kind, KindRegistry, Resolution, registry};
pub use system::SystemAllocator;
