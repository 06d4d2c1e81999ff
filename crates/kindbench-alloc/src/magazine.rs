//! Per-class magazine cache of recycled blocks.
//!
//! Each arena keeps one bounded stack of freed block addresses per size class.
//! A free pushes onto the stack until it is full; further frees go back to the
//! platform allocator. An allocation pops the most recently freed block.

use crate::size_class::NUM_SIZE_CLASSES;

/// Maximum number of cached blocks per size class per arena.
pub const MAGAZINE_CAPACITY: usize = 64;

/// One bounded LIFO stack of block addresses.
#[derive(Debug, Clone)]
struct Magazine {
    blocks: Vec<usize>,
}

impl Magazine {
    fn new() -> Self {
        Self {
            blocks: Vec::with_capacity(MAGAZINE_CAPACITY),
        }
    }

    fn pop(&mut self) -> Option<usize> {
        self.blocks.pop()
    }

    fn push(&mut self, addr: usize) -> bool {
        if self.blocks.len() < MAGAZINE_CAPACITY {
            self.blocks.push(addr);
            true
        } else {
            false
        }
    }
}

/// One magazine per size class.
#[derive(Debug, Clone)]
pub struct MagazineCache {
    magazines: Vec<Magazine>,
    total_cached: usize,
}

impl MagazineCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a cached block of class `class`, if any.
    pub fn pop(&mut self, class: usize) -> Option<usize> {
        let addr = self.magazines.get_mut(class)?.pop()?;
        self.total_cached -= 1;
        Some(addr)
    }

    /// Cache a freed block of class `class`.
    ///
    /// Returns `false` when the magazine is full or the class is out of range;
    /// the caller then owns the release of the block.
    pub fn push(&mut self, class: usize, addr: usize) -> bool {
        let Some(magazine) = self.magazines.get_mut(class) else {
            return false;
        };
        let cached = magazine.push(addr);
        if cached {
            self.total_cached += 1;
        }
        cached
    }

    #[must_use]
    pub fn total_cached(&self) -> usize {
        self.total_cached
    }

    #[must_use]
    pub fn cached_in(&self, class: usize) -> usize {
        self.magazines.get(class).map_or(0, |m| m.blocks.len())
    }

    /// Empty every magazine, returning `(class, addr)` pairs.
    pub fn drain_all(&mut self) -> Vec<(usize, usize)> {
        let mut drained = Vec::with_capacity(self.total_cached);
        for (class, magazine) in self.magazines.iter_mut().enumerate() {
            drained.extend(magazine.blocks.drain(..).map(|addr| (class, addr)));
        }
        self.total_cached = 0;
        drained
    }
}

impl Default for MagazineCache {
    fn default() -> Self {
        Self {
            magazines: (0..NUM_SIZE_CLASSES).map(|_| Magazine::new()).collect(),
            total_cached: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cache_is_empty() {
        let mut cache = MagazineCache::new();
        assert_eq!(cache.total_cached(), 0);
        assert!(cache.pop(0).is_none());
        assert!(cache.pop(NUM_SIZE_CLASSES - 1).is_none());
    }

    #[test]
    fn lifo_reuse() {
        let mut cache = MagazineCache::new();
        assert!(cache.push(2, 0x1000));
        assert!(cache.push(2, 0x2000));
        assert_eq!(cache.total_cached(), 2);
        assert_eq!(cache.pop(2), Some(0x2000));
        assert_eq!(cache.pop(2), Some(0x1000));
        assert!(cache.pop(2).is_none());
        assert_eq!(cache.total_cached(), 0);
    }

    #[test]
    fn classes_are_isolated() {
        let mut cache = MagazineCache::new();
        cache.push(0, 0x10);
        cache.push(5, 0x50);
        assert_eq!(cache.cached_in(0), 1);
        assert_eq!(cache.cached_in(5), 1);
        assert_eq!(cache.pop(0), Some(0x10));
        assert!(cache.pop(0).is_none());
        assert_eq!(cache.pop(5), Some(0x50));
    }

    #[test]
    fn full_magazine_rejects() {
        let mut cache = MagazineCache::new();
        for i in 0..MAGAZINE_CAPACITY {
            assert!(cache.push(1, 0x1000 + i * 16));
        }
        assert!(!cache.push(1, 0xFFFF_0000));
        assert_eq!(cache.total_cached(), MAGAZINE_CAPACITY);
    }

    #[test]
    fn out_of_range_class_rejects() {
        let mut cache = MagazineCache::new();
        assert!(!cache.push(NUM_SIZE_CLASSES, 0x1000));
        assert!(cache.pop(NUM_SIZE_CLASSES).is_none());
    }

    #[test]
    fn drain_returns_everything() {
        let mut cache = MagazineCache::new();
        cache.push(3, 0x1000);
        cache.push(3, 0x2000);
        cache.push(7, 0x3000);
        let mut drained = cache.drain_all();
        drained.sort_unstable();
        assert_eq!(drained, vec![(3, 0x1000), (3, 0x2000), (7, 0x3000)]);
        assert_eq!(cache.total_cached(), 0);
        assert!(cache.pop(3).is_none());
    }
}
