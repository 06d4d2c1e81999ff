//! The kind-aware allocator.
//!
//! Coordinates the kind registry and the per-kind arenas: each request is
//! resolved to an arena (applying the preferred-kind fallback), served there,
//! and handed back as an owned [`Block`]. Freeing consumes the block, so a
//! block cannot be released twice.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::arena::{ArenaId, ArenaStats, Grant, KindArena};
use crate::error::AllocError;
use crate::kind::{Kind, KindRegistry, registry};
use crate::system::system_dealloc;

/// Owned handle to allocated memory.
///
/// Produced only by [`KindAllocator::allocate`] or
/// [`crate::SystemAllocator::allocate`]; return it with the matching
/// `deallocate`. Dropping a block without deallocating it leaks the memory.
#[derive(Debug)]
#[must_use = "a block leaks unless it is passed back to `deallocate`"]
pub struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
    class: Option<usize>,
    arena: Option<ArenaId>,
    kind: Option<Kind>,
}

impl Block {
    pub(crate) fn from_system(ptr: NonNull<u8>, layout: Layout) -> Self {
        Self {
            ptr,
            layout,
            class: None,
            arena: None,
            kind: None,
        }
    }

    fn from_grant(grant: Grant, arena: ArenaId, kind: Kind) -> Self {
        Self {
            ptr: grant.ptr,
            layout: grant.layout,
            class: grant.class,
            arena: Some(arena),
            kind: Some(kind),
        }
    }

    pub(crate) fn into_raw_parts(self) -> (NonNull<u8>, Layout) {
        (self.ptr, self.layout)
    }

    /// Start of the usable region.
    #[must_use]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Usable size in bytes (at least the requested size).
    #[must_use]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Kind requested for this block; `None` for platform blocks.
    #[must_use]
    pub fn kind(&self) -> Option<Kind> {
        self.kind
    }

    /// Arena that served this block; `None` for platform blocks.
    #[must_use]
    pub fn arena(&self) -> Option<ArenaId> {
        self.arena
    }
}

/// Kind-aware allocator with one arena per [`ArenaId`].
pub struct KindAllocator {
    registry: KindRegistry,
    arenas: [KindArena; 3],
    requests: [AtomicU64; Kind::COUNT],
    fallbacks: AtomicU64,
}

impl KindAllocator {
    /// Create an allocator with its own arenas over `registry`.
    #[must_use]
    pub fn new(registry: KindRegistry) -> Self {
        Self {
            registry,
            arenas: ArenaId::ALL.map(KindArena::new),
            requests: std::array::from_fn(|_| AtomicU64::new(0)),
            fallbacks: AtomicU64::new(0),
        }
    }

    /// Process-wide allocator over the process-wide registry.
    #[must_use]
    pub fn global() -> &'static KindAllocator {
        static ALLOCATOR: OnceLock<KindAllocator> = OnceLock::new();
        ALLOCATOR.get_or_init(|| KindAllocator::new(*registry()))
    }

    #[must_use]
    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    /// Check that `kind` can be served, without allocating.
    pub fn check_kind(&self, kind: Kind) -> Result<(), AllocError> {
        self.registry.resolve(kind).map(|_| ())
    }

    /// Allocate `size` bytes of `kind` memory.
    pub fn allocate(&self, size: usize, kind: Kind) -> Result<Block, AllocError> {
        let resolution = self.registry.resolve(kind)?;
        self.requests[kind.index()].fetch_add(1, Ordering::Relaxed);
        if resolution.fell_back {
            self.fallbacks.fetch_add(1, Ordering::Relaxed);
        }
        let arena = &self.arenas[resolution.arena.index()];
        let grant = arena.allocate(size)?;
        Ok(Block::from_grant(grant, arena.id(), kind))
    }

    /// Return a block to the arena that served it.
    pub fn deallocate(&self, block: Block) {
        match block.arena {
            Some(arena) => self.arenas[arena.index()].release(Grant {
                ptr: block.ptr,
                layout: block.layout,
                class: block.class,
            }),
            None => {
                let (ptr, layout) = block.into_raw_parts();
                // SAFETY: platform blocks own memory from `system_alloc`
                // with their layout; the block is consumed here.
                unsafe { system_dealloc(ptr, layout) };
            }
        }
    }

    /// Counter snapshot for one arena.
    #[must_use]
    pub fn arena_stats(&self, arena: ArenaId) -> ArenaStats {
        self.arenas[arena.index()].stats()
    }

    /// Number of allocations requested with `kind`.
    #[must_use]
    pub fn requests_for(&self, kind: Kind) -> u64 {
        self.requests[kind.index()].load(Ordering::Relaxed)
    }

    /// Number of preferred-kind requests redirected to the default arena.
    #[must_use]
    pub fn fallbacks(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }
}

impl Default for KindAllocator {
    fn default() -> Self {
        Self::new(KindRegistry::default())
    }
}

impl std::fmt::Debug for KindAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KindAllocator")
            .field("registry", &self.registry)
            .field("fallbacks", &self.fallbacks())
            .field(
                "arenas",
                &ArenaId::ALL.map(|id| (id.as_str(), self.arena_stats(id).live_blocks)),
            )
            .finish_non_exhaustive()
    }
}
