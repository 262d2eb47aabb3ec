//! Benchmarks for ObjectTable

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glsim_core::alloc::{ObjectTable, Slot};

#[derive(Clone, Debug, Default)]
struct BufferRecord {
    name: u32,
    data: Vec<u8>,
    deleted: bool,
}

fn record(name: u32) -> BufferRecord {
    BufferRecord {
        name,
        data: vec![0; 64],
        deleted: false,
    }
}

fn bench_object_table_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_table_insert");

    for size in [10u32, 100, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut table = ObjectTable::new();
                for name in 0..size {
                    table.insert(black_box(record(name)));
                }
                table
            });
        });
    }

    group.finish();
}

fn bench_object_table_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_table_lookup");

    for size in [100u32, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        let mut table = ObjectTable::new();
        let slots: Vec<Slot> = (0..size).map(|name| table.insert(record(name))).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut live = 0u32;
                for &slot in &slots {
                    if let Some(buffer) = table.get(black_box(slot)) {
                        live += u32::from(!buffer.deleted) + buffer.name % 2;
                    }
                }
                black_box(live)
            });
        });
    }

    group.finish();
}

fn bench_object_table_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_table_churn");

    for size in [100u32, 1000, 10000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut table = ObjectTable::new();
                    let slots: Vec<Slot> =
                        (0..size).map(|name| table.insert(record(name))).collect();
                    (table, slots)
                },
                |(mut table, slots)| {
                    for slot in slots {
                        if let Some(mut old) = table.remove(black_box(slot)) {
                            old.data.clear();
                            table.insert(old);
                        }
                    }
                    black_box(table)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_object_table_insert,
    bench_object_table_lookup,
    bench_object_table_churn
);
criterion_main!(benches);
