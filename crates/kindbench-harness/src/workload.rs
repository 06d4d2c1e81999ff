//! Workload shapes and the timed execution loop.
//!
//! A [`WorkloadCase`] pairs one [`Operation`] with a shape: how many
//! allocate+free pairs per iteration, how many iterations, how big each
//! allocation is, and which kinds to cycle through. Only the allocate/free
//! region of each iteration is timed.

use std::hint::black_box;
use std::time::{Duration, Instant};

use kindbench_alloc::Kind;

use crate::error::{ConfigError, HarnessError};
use crate::metrics::Metrics;
use crate::operation::Operation;

/// Operation or iteration count of the "single" shapes.
pub const SINGLE: usize = 1;
/// Operation count of the "many ops" shapes.
pub const MANY_OPERATIONS: usize = 1_000;
/// Iteration count of the "many iters" shapes.
pub const MANY_ITERATIONS: usize = 1_000;
/// Allocation size of every shape except the huge one.
pub const DEFAULT_ALLOCATION_SIZE: usize = 4096;
/// Allocation size of the huge shape (one huge page).
pub const HUGE_ALLOCATION_SIZE: usize = 2 * 1024 * 1024;

/// Fixed workload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Fixed per-call overhead.
    SingleOpSingleIter,
    /// Steady-state throughput.
    ManyOpsSingleIter,
    /// Large-allocation path cost.
    ManyOpsSingleIterHugeAlloc,
    /// Overhead stability across repeated single calls.
    SingleOpManyIters,
    /// Sustained throughput.
    ManyOpsManyIters,
}

impl Preset {
    #[must_use]
    pub fn params(self) -> WorkloadParams {
        let (operation_count, iteration_count, allocation_size) = match self {
            Self::SingleOpSingleIter => (SINGLE, SINGLE, DEFAULT_ALLOCATION_SIZE),
            Self::ManyOpsSingleIter => (MANY_OPERATIONS, SINGLE, DEFAULT_ALLOCATION_SIZE),
            Self::ManyOpsSingleIterHugeAlloc => (MANY_OPERATIONS, SINGLE, HUGE_ALLOCATION_SIZE),
            Self::SingleOpManyIters => (SINGLE, MANY_ITERATIONS, DEFAULT_ALLOCATION_SIZE),
            Self::ManyOpsManyIters => (MANY_OPERATIONS, MANY_ITERATIONS, DEFAULT_ALLOCATION_SIZE),
        };
        WorkloadParams {
            operation_count,
            iteration_count,
            allocation_size,
            kinds: vec![Kind::Default],
        }
    }
}

/// Scalar shape plus the kinds to cycle through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadParams {
    pub operation_count: usize,
    pub iteration_count: usize,
    pub allocation_size: usize,
    pub kinds: Vec<Kind>,
}

impl WorkloadParams {
    /// Check the scalar shape and `kinds` (the list actually used by a run).
    pub fn validate(&self, kinds: &[Kind]) -> Result<(), ConfigError> {
        if self.operation_count == 0 {
            return Err(ConfigError::ZeroOperations);
        }
        if self.iteration_count == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.allocation_size == 0 {
            return Err(ConfigError::ZeroAllocationSize);
        }
        if kinds.is_empty() {
            return Err(ConfigError::EmptyKinds);
        }
        Ok(())
    }

    /// Total allocate+free pairs of one run.
    #[must_use]
    pub fn total_operations(&self) -> u64 {
        (self.operation_count as u64).saturating_mul(self.iteration_count as u64)
    }
}

impl Default for WorkloadParams {
    fn default() -> Self {
        Preset::SingleOpSingleIter.params()
    }
}

/// One configurable workload bound to an operation.
#[derive(Debug)]
pub struct WorkloadCase<Op: Operation> {
    operation: Op,
    params: WorkloadParams,
}

impl<Op: Operation> WorkloadCase<Op> {
    /// New case with the single-op/single-iteration shape on the default kind.
    #[must_use]
    pub fn new(operation: Op) -> Self {
        Self {
            operation,
            params: WorkloadParams::default(),
        }
    }

    #[must_use]
    pub fn params(&self) -> &WorkloadParams {
        &self.params
    }

    #[must_use]
    pub fn operation(&self) -> &Op {
        &self.operation
    }

    #[must_use]
    pub fn into_operation(self) -> Op {
        self.operation
    }

    /// Replace the whole shape.
    pub fn configure(&mut self, params: WorkloadParams) {
        self.params = params;
    }

    /// Replace the configured kinds, keeping the scalar shape.
    pub fn set_kinds(&mut self, kinds: Vec<Kind>) {
        self.params.kinds = kinds;
    }

    /// Apply a preset's scalar shape, keeping the configured kinds.
    pub fn apply_preset(&mut self, preset: Preset) {
        let kinds = std::mem::take(&mut self.params.kinds);
        self.params = WorkloadParams {
            kinds,
            ..preset.params()
        };
        if self.params.kinds.is_empty() {
            self.params.kinds.push(Kind::Default);
        }
    }

    pub fn setup_single_op_single_iter(&mut self) {
        self.apply_preset(Preset::SingleOpSingleIter);
    }

    pub fn setup_many_ops_single_iter(&mut self) {
        self.apply_preset(Preset::ManyOpsSingleIter);
    }

    pub fn setup_many_ops_single_iter_huge_alloc(&mut self) {
        self.apply_preset(Preset::ManyOpsSingleIterHugeAlloc);
    }

    pub fn setup_single_op_many_iters(&mut self) {
        self.apply_preset(Preset::SingleOpManyIters);
    }

    pub fn setup_many_ops_many_iters(&mut self) {
        self.apply_preset(Preset::ManyOpsManyIters);
    }

    /// Validate the shape and every kind `run_test(kinds)` would use,
    /// without allocating.
    pub fn check(&self, kinds: Option<&[Kind]>) -> Result<(), ConfigError> {
        let kinds = kinds.unwrap_or(&self.params.kinds);
        self.params.validate(kinds)?;
        for &kind in kinds {
            self.operation.check_kind(kind)?;
        }
        Ok(())
    }

    /// Execute the workload once.
    ///
    /// `kinds` overrides the configured kind list for this run. With more
    /// than one kind, allocations cycle through them round-robin and the
    /// cursor carries over between iterations.
    pub fn run_test(&mut self, kinds: Option<&[Kind]>) -> Result<Metrics, HarnessError> {
        self.check(kinds)?;
        let Self { operation, params } = self;
        let kinds = kinds.unwrap_or(&params.kinds);

        let size = params.allocation_size;
        let cycle = kinds.len() > 1;
        if !cycle {
            operation.select_kind(kinds[0]);
        }

        let mut cursor = 0usize;
        let mut elapsed = Duration::ZERO;
        for _ in 0..params.iteration_count {
            let start = Instant::now();
            for _ in 0..params.operation_count {
                if cycle {
                    operation.select_kind(kinds[cursor]);
                    cursor = (cursor + 1) % kinds.len();
                }
                let block = operation.allocate(size)?;
                operation.deallocate(black_box(block));
            }
            elapsed += start.elapsed();
        }

        Ok(Metrics::from_run(params.total_operations(), elapsed)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{KindOperation, ReferenceOperation};
    use kindbench_alloc::{ArenaId, KindAllocator, KindRegistry};

    /// Counts calls and records the kind of every allocation.
    #[derive(Debug, Default)]
    struct Recorder {
        selected: Kind,
        allocated: Vec<Kind>,
        live: usize,
        freed: usize,
    }

    impl Operation for Recorder {
        type Block = Kind;

        const LABEL: &'static str = "recorder";

        fn check_kind(&self, kind: Kind) -> Result<(), ConfigError> {
            if kind == Kind::Hbw {
                return Err(ConfigError::UnknownKind(kind.as_str().into()));
            }
            Ok(())
        }

        fn select_kind(&mut self, kind: Kind) {
            self.selected = kind;
        }

        fn allocate(&mut self, _size: usize) -> Result<Kind, HarnessError> {
            self.allocated.push(self.selected);
            self.live += 1;
            Ok(self.selected)
        }

        fn deallocate(&mut self, _block: Kind) {
            self.live -= 1;
            self.freed += 1;
        }
    }

    #[test]
    fn presets_match_shapes() {
        let p = Preset::ManyOpsSingleIterHugeAlloc.params();
        assert_eq!(p.operation_count, MANY_OPERATIONS);
        assert_eq!(p.iteration_count, SINGLE);
        assert_eq!(p.allocation_size, HUGE_ALLOCATION_SIZE);
        assert_eq!(p.kinds, vec![Kind::Default]);

        let p = Preset::SingleOpManyIters.params();
        assert_eq!((p.operation_count, p.iteration_count), (SINGLE, MANY_ITERATIONS));
    }

    #[test]
    fn every_allocation_is_freed() {
        let mut case = WorkloadCase::new(Recorder::default());
        case.configure(WorkloadParams {
            operation_count: 7,
            iteration_count: 3,
            allocation_size: 64,
            kinds: vec![Kind::Default],
        });
        let metrics = case.run_test(None).unwrap();
        assert!(metrics.operations_per_second > 0.0);
        let op = case.into_operation();
        assert_eq!(op.allocated.len(), 21);
        assert_eq!(op.freed, 21);
        assert_eq!(op.live, 0);
    }

    #[test]
    fn kinds_cycle_round_robin_across_iterations() {
        let mut case = WorkloadCase::new(Recorder::default());
        case.configure(WorkloadParams {
            operation_count: 3,
            iteration_count: 2,
            allocation_size: 64,
            kinds: vec![Kind::Default],
        });
        case.run_test(Some(&[Kind::Default, Kind::HbwPreferred]))
            .unwrap();
        let op = case.into_operation();
        assert_eq!(
            op.allocated,
            vec![
                Kind::Default,
                Kind::HbwPreferred,
                Kind::Default,
                Kind::HbwPreferred,
                Kind::Default,
                Kind::HbwPreferred,
            ]
        );
    }

    #[test]
    fn configured_kinds_are_used_when_none_passed() {
        let mut case = WorkloadCase::new(Recorder::default());
        case.set_kinds(vec![Kind::HugeTlb]);
        case.run_test(None).unwrap();
        assert_eq!(case.operation().allocated, vec![Kind::HugeTlb]);
    }

    #[test]
    fn zero_counts_fail_before_timing() {
        let mut case = WorkloadCase::new(Recorder::default());
        case.configure(WorkloadParams {
            operation_count: 0,
            ..WorkloadParams::default()
        });
        let err = case.run_test(None).unwrap_err();
        assert!(matches!(err, HarnessError::Config(ConfigError::ZeroOperations)));

        case.configure(WorkloadParams {
            iteration_count: 0,
            ..WorkloadParams::default()
        });
        let err = case.run_test(None).unwrap_err();
        assert!(matches!(err, HarnessError::Config(ConfigError::ZeroIterations)));

        case.configure(WorkloadParams {
            allocation_size: 0,
            ..WorkloadParams::default()
        });
        assert!(case.run_test(None).unwrap_err().is_config());
        assert!(case.operation().allocated.is_empty());
    }

    #[test]
    fn empty_or_rejected_kinds_fail_before_timing() {
        let mut case = WorkloadCase::new(Recorder::default());
        assert!(matches!(
            case.run_test(Some(&[])),
            Err(HarnessError::Config(ConfigError::EmptyKinds))
        ));
        assert!(case.run_test(Some(&[Kind::Default, Kind::Hbw])).is_err());
        assert!(case.operation().allocated.is_empty());
    }

    #[test]
    fn check_rejects_without_allocating() {
        let allocator = KindAllocator::new(KindRegistry::new(false));
        let case = WorkloadCase::new(KindOperation::new(&allocator));
        assert!(case.check(None).is_ok());
        assert!(matches!(
            case.check(Some(&[Kind::Default, Kind::Hbw])),
            Err(ConfigError::KindUnavailable { kind: Kind::Hbw, .. })
        ));
        assert_eq!(allocator.requests_for(Kind::Default), 0);
    }

    #[test]
    fn preset_keeps_configured_kinds() {
        let mut case = WorkloadCase::new(Recorder::default());
        case.set_kinds(vec![Kind::Default, Kind::HbwPreferred]);
        case.setup_many_ops_many_iters();
        assert_eq!(case.params().operation_count, MANY_OPERATIONS);
        assert_eq!(case.params().kinds.len(), 2);
    }

    #[test]
    fn real_allocators_produce_positive_metrics() {
        let mut reference = WorkloadCase::new(ReferenceOperation::new());
        reference.setup_many_ops_single_iter();
        let m = reference.run_test(None).unwrap();
        assert!(m.operations_per_second > 0.0);
        assert!(m.avg_operation_duration_ns > 0.0);
        let product = m.operations_per_second * m.avg_operation_duration_ns;
        assert!((product - 1e9).abs() / 1e9 < 1e-9);

        let allocator = KindAllocator::new(KindRegistry::new(false));
        let mut test = WorkloadCase::new(KindOperation::new(&allocator));
        test.setup_many_ops_single_iter();
        let m = test
            .run_test(Some(&[Kind::Default, Kind::HbwPreferred]))
            .unwrap();
        assert!(m.operations_per_second > 0.0);
        assert_eq!(allocator.requests_for(Kind::Default), 500);
        assert_eq!(allocator.requests_for(Kind::HbwPreferred), 500);
        assert_eq!(allocator.fallbacks(), 500);
        assert_eq!(allocator.arena_stats(ArenaId::Default).live_blocks, 0);
    }
}
