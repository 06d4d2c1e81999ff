//! Allocation strategies driven by a workload.
//!
//! [`Operation`] is the seam between the timing loop and an allocator. It is
//! a generic parameter of [`crate::WorkloadCase`], so the loop is
//! monomorphized per strategy and no dynamic dispatch sits inside the timed
//! region.

use kindbench_alloc::{Block, Kind, KindAllocator, SystemAllocator};

use crate::error::{ConfigError, HarnessError};

/// Allocate/free strategy with kind selection.
pub trait Operation {
    /// Handle returned by `allocate` and consumed by `deallocate`.
    type Block;

    /// Short name used in logs and diagnostics.
    const LABEL: &'static str;

    /// Check, before timing, that `kind` can be served.
    fn check_kind(&self, kind: Kind) -> Result<(), ConfigError>;

    /// Select the kind used by subsequent allocations.
    fn select_kind(&mut self, kind: Kind);

    fn allocate(&mut self, size: usize) -> Result<Self::Block, HarnessError>;

    fn deallocate(&mut self, block: Self::Block);
}

/// Baseline: the platform allocator. The selected kind is ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceOperation {
    allocator: SystemAllocator,
    kind: Kind,
}

impl ReferenceOperation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Operation for ReferenceOperation {
    type Block = Block;

    const LABEL: &'static str = "reference";

    fn check_kind(&self, _kind: Kind) -> Result<(), ConfigError> {
        Ok(())
    }

    fn select_kind(&mut self, kind: Kind) {
        self.kind = kind;
    }

    fn allocate(&mut self, size: usize) -> Result<Block, HarnessError> {
        self.allocator
            .allocate(size)
            .map_err(|source| HarnessError::Allocation {
                operation: Self::LABEL,
                kind: self.kind,
                size,
                source,
            })
    }

    fn deallocate(&mut self, block: Block) {
        self.allocator.deallocate(block);
    }
}

/// System under test: the kind-aware allocator, passing the selected kind.
#[derive(Debug, Clone, Copy)]
pub struct KindOperation<'a> {
    allocator: &'a KindAllocator,
    kind: Kind,
}

impl<'a> KindOperation<'a> {
    #[must_use]
    pub fn new(allocator: &'a KindAllocator) -> Self {
        Self {
            allocator,
            kind: Kind::Default,
        }
    }

    /// Currently selected kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }
}

impl KindOperation<'static> {
    /// Operation over the process-wide allocator.
    #[must_use]
    pub fn global() -> Self {
        Self::new(KindAllocator::global())
    }
}

impl Operation for KindOperation<'_> {
    type Block = Block;

    const LABEL: &'static str = "kind";

    fn check_kind(&self, kind: Kind) -> Result<(), ConfigError> {
        self.allocator
            .check_kind(kind)
            .map_err(|source| ConfigError::KindUnavailable { kind, source })
    }

    fn select_kind(&mut self, kind: Kind) {
        self.kind = kind;
    }

    fn allocate(&mut self, size: usize) -> Result<Block, HarnessError> {
        self.allocator
            .allocate(size, self.kind)
            .map_err(|source| HarnessError::Allocation {
                operation: Self::LABEL,
                kind: self.kind,
                size,
                source,
            })
    }

    fn deallocate(&mut self, block: Block) {
        self.allocator.deallocate(block);
    }
}
