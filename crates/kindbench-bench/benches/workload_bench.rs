//! Workload engine benchmarks over the registered presets.

use criterion::{Criterion, criterion_group, criterion_main};
use kindbench_alloc::{Kind, KindAllocator, KindRegistry};
use kindbench_harness::{KindOperation, Preset, ReferenceOperation, WorkloadCase};

fn bench_presets(c: &mut Criterion) {
    let allocator = KindAllocator::new(KindRegistry::new(false));
    let mut group = c.benchmark_group("workload_preset");
    group.sample_size(20);

    for (name, preset) in [
        ("single_op_single_iter", Preset::SingleOpSingleIter),
        ("many_ops_single_iter", Preset::ManyOpsSingleIter),
        ("many_ops_single_iter_huge_alloc", Preset::ManyOpsSingleIterHugeAlloc),
    ] {
        let mut reference = WorkloadCase::new(ReferenceOperation::new());
        reference.apply_preset(preset);
        group.bench_function(format!("reference/{name}"), |b| {
            b.iter(|| reference.run_test(None).unwrap());
        });

        let mut test = WorkloadCase::new(KindOperation::new(&allocator));
        test.apply_preset(preset);
        group.bench_function(format!("kind/{name}"), |b| {
            b.iter(|| test.run_test(None).unwrap());
        });
    }

    let mut cycling = WorkloadCase::new(KindOperation::new(&allocator));
    cycling.apply_preset(Preset::ManyOpsSingleIter);
    let kinds = [Kind::Default, Kind::HbwPreferred];
    group.bench_function("kind/many_ops_single_iter_many_kinds", |b| {
        b.iter(|| cycling.run_test(Some(&kinds)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_presets);
criterion_main!(benches);
