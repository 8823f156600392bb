//! Benchmarks for placement, pruning and leveling

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mapbinder::{
    BalanceScheduler, Container, ContainerAllocator, ContainerPool, Entry, TransferPlanner,
    UsedAssetSet,
};

fn texture_entries(count: usize) -> Vec<Entry> {
    (0..count)
        .flat_map(|i| {
            let len = 1_000 + (i * 7_919) % 400_000;
            [
                Entry::new(format!("tex_{}.tpf.dcx", i), vec![0u8; len], 0),
                Entry::new(format!("tex_{}_l.tpf.dcx", i), vec![0u8; len / 8], 0),
            ]
        })
        .collect()
}

/// Everything packed into the first peer, as after a fresh unbalanced export
fn lopsided_pool(count: usize) -> ContainerPool {
    let mut containers = vec![Container::new(); 4];
    containers[0] = Container::from_entries(texture_entries(count));
    ContainerPool::from_containers(containers)
}

fn benchmark_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner_place");

    for count in [100, 1000].iter() {
        let entries = texture_entries(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &entries, |b, entries| {
            b.iter(|| {
                let mut pool = ContainerPool::new(4);
                let planner = TransferPlanner::new();
                for entry in entries.iter().cloned() {
                    black_box(planner.place(entry, &mut pool));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_prune(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocator_prune");

    for count in [100, 1000].iter() {
        let container = Container::from_entries(texture_entries(*count));
        let mut used = UsedAssetSet::new();
        for i in (0..*count).step_by(3) {
            used.insert_texture(&format!("tex_{}", i));
        }

        group.bench_with_input(BenchmarkId::from_parameter(count), &container, |b, container| {
            b.iter(|| {
                let mut working = container.clone();
                black_box(ContainerAllocator::new().prune(&mut working, &used))
            });
        });
    }

    group.finish();
}

fn benchmark_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("balance_level_pool");
    group.sample_size(20);

    for count in [100, 500].iter() {
        let pool = lopsided_pool(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &pool, |b, pool| {
            b.iter(|| {
                let mut working = pool.clone();
                black_box(BalanceScheduler::default().level_pool(&mut working))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_place, benchmark_prune, benchmark_level);
criterion_main!(benches);
