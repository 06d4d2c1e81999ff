//! Per-kind arenas.
//!
//! An arena owns the magazine cache for its size classes and the counters
//! reported through [`ArenaStats`]. State is guarded by a `parking_lot::Mutex`
//! so one allocator can be shared across threads.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

use parking_lot::Mutex;

use crate::error::AllocError;
use crate::large::{HUGE_PAGE_SIZE, PAGE_SIZE, large_layout};
use crate::magazine::MagazineCache;
use crate::size_class::{class_index, class_layout};
use crate::system::{system_alloc, system_dealloc};

/// Arena identity. Several kinds may resolve to the same arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArenaId {
    Default,
    HighBandwidth,
    Huge,
}

impl ArenaId {
    pub const ALL: [ArenaId; 3] = [ArenaId::Default, ArenaId::HighBandwidth, ArenaId::Huge];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Default => 0,
            Self::HighBandwidth => 1,
            Self::Huge => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::HighBandwidth => "high_bandwidth",
            Self::Huge => "huge",
        }
    }

    /// Page granularity of the large path.
    #[must_use]
    pub const fn page_size(self) -> usize {
        match self {
            Self::Huge => HUGE_PAGE_SIZE,
            Self::Default | Self::HighBandwidth => PAGE_SIZE,
        }
    }
}

/// Snapshot of an arena's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Blocks handed out (small and large).
    pub allocations: u64,
    /// Blocks returned.
    pub frees: u64,
    /// Small allocations served from the magazine cache.
    pub cache_hits: u64,
    /// Allocations that took the large path.
    pub large_allocations: u64,
    /// Blocks currently handed out.
    pub live_blocks: u64,
    /// Blocks parked in the magazine cache.
    pub cached_blocks: u64,
}

#[derive(Debug, Default)]
struct ArenaState {
    cache: MagazineCache,
    stats: ArenaStats,
}

/// Memory handed out by an arena.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Grant {
    pub ptr: NonNull<u8>,
    pub layout: Layout,
    pub class: Option<usize>,
}

pub(crate) struct KindArena {
    id: ArenaId,
    state: Mutex<ArenaState>,
}

impl KindArena {
    pub(crate) fn new(id: ArenaId) -> Self {
        Self {
            id,
            state: Mutex::new(ArenaState::default()),
        }
    }

    pub(crate) fn id(&self) -> ArenaId {
        self.id
    }

    pub(crate) fn allocate(&self, size: usize) -> Result<Grant, AllocError> {
        let Some(class) = class_index(size) else {
            let layout = large_layout(size, self.id.page_size())?;
            let ptr = system_alloc(layout)?;
            let mut state = self.state.lock();
            state.stats.allocations += 1;
            state.stats.large_allocations += 1;
            state.stats.live_blocks += 1;
            return Ok(Grant {
                ptr,
                layout,
                class: None,
            });
        };

        let layout = class_layout(class).ok_or(AllocError::InvalidLayout {
            size,
            align: crate::size_class::MIN_ALIGN,
        })?;

        let mut state = self.state.lock();
        let ptr = match state.cache.pop(class) {
            Some(addr) => {
                state.stats.cache_hits += 1;
                NonNull::new(addr as *mut u8).ok_or(AllocError::OutOfMemory { size })?
            }
            None => system_alloc(layout)?,
        };
        state.stats.allocations += 1;
        state.stats.live_blocks += 1;
        Ok(Grant {
            ptr,
            layout,
            class: Some(class),
        })
    }

    /// Return a grant previously produced by any arena.
    pub(crate) fn release(&self, grant: Grant) {
        let mut state = self.state.lock();
        state.stats.frees += 1;
        state.stats.live_blocks = state.stats.live_blocks.saturating_sub(1);

        if let Some(class) = grant.class
            && state.cache.push(class, grant.ptr.as_ptr() as usize)
        {
            return;
        }
        drop(state);
        // SAFETY: every grant comes from `system_alloc` with `grant.layout`
        // (class layouts are identical across arenas) and is released once
        // because `Block` is consumed by value.
        unsafe { system_dealloc(grant.ptr, grant.layout) };
    }

    pub(crate) fn stats(&self) -> ArenaStats {
        let state = self.state.lock();
        ArenaStats {
            cached_blocks: state.cache.total_cached() as u64,
            ..state.stats
        }
    }
}

impl Drop for KindArena {
    fn drop(&mut self) {
        let drained = self.state.get_mut().cache.drain_all();
        for (class, addr) in drained {
            let (Some(layout), Some(ptr)) = (class_layout(class), NonNull::new(addr as *mut u8))
            else {
                continue;
            };
            // SAFETY: cached addresses were allocated by `system_alloc` with
            // the layout of their class and are owned solely by the cache.
            unsafe { system_dealloc(ptr, layout) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size_class::MAX_SMALL_SIZE;

    #[test]
    fn small_blocks_are_recycled() {
        let arena = KindArena::new(ArenaId::Default);
        let first = arena.allocate(100).unwrap();
        let addr = first.ptr.as_ptr() as usize;
        arena.release(first);

        let second = arena.allocate(110).unwrap();
        assert_eq!(second.ptr.as_ptr() as usize, addr);
        assert_eq!(arena.stats().cache_hits, 1);
        arena.release(second);
    }

    #[test]
    fn large_blocks_are_page_aligned() {
        let arena = KindArena::new(ArenaId::Default);
        let grant = arena.allocate(MAX_SMALL_SIZE + 1).unwrap();
        assert!(grant.class.is_none());
        assert_eq!(grant.ptr.as_ptr() as usize % PAGE_SIZE, 0);
        arena.release(grant);
        let stats = arena.stats();
        assert_eq!(stats.large_allocations, 1);
        assert_eq!(stats.live_blocks, 0);
        assert_eq!(stats.cached_blocks, 0);
    }

    #[test]
    fn huge_arena_aligns_to_huge_pages() {
        let arena = KindArena::new(ArenaId::Huge);
        let grant = arena.allocate(HUGE_PAGE_SIZE).unwrap();
        assert_eq!(grant.ptr.as_ptr() as usize % HUGE_PAGE_SIZE, 0);
        assert_eq!(grant.layout.size(), HUGE_PAGE_SIZE);
        arena.release(grant);
    }

    #[test]
    fn counters_track_live_blocks() {
        let arena = KindArena::new(ArenaId::HighBandwidth);
        let grants: Vec<Grant> = (0..4).map(|_| arena.allocate(64).unwrap()).collect();
        assert_eq!(arena.stats().live_blocks, 4);
        for grant in grants {
            arena.release(grant);
        }
        let stats = arena.stats();
        assert_eq!(stats.allocations, 4);
        assert_eq!(stats.frees, 4);
        assert_eq!(stats.live_blocks, 0);
        assert_eq!(stats.cached_blocks, 4);
    }
}
