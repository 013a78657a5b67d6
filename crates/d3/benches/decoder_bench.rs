//! Benchmarks for the 3D height-field decoder.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rkpack_core::solver::{Config, Solver, Variant};
use rkpack_d3::{Container, HeightmapDecoder, Instance, Item, Packer3D};

fn mixed_instance(n: usize) -> Instance {
    let items = (0..n)
        .map(|i| {
            let k = i as f64;
            Item::new(
                i,
                5.0 + (k * 7.3) % 20.0,
                5.0 + (k * 3.1) % 15.0,
                5.0 + (k * 5.7) % 25.0,
            )
        })
        .collect();
    Instance::new(format!("bench_{n}"), Container::new(100.0, 100.0, 100.0), items)
}

fn decoder_benchmark(c: &mut Criterion) {
    let decoder = HeightmapDecoder::new();
    let mut group = c.benchmark_group("heightmap_decode");

    for n in [20, 100, 200] {
        let instance = mixed_instance(n);
        let order: Vec<usize> = (0..n).collect();
        let plan: Vec<u8> = (0..n).map(|i| (i % 6 + 1) as u8).collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &instance, |b, inst| {
            b.iter(|| black_box(decoder.evaluate(black_box(inst), &order, &plan)))
        });
    }
    group.finish();
}

fn packer_benchmark(c: &mut Criterion) {
    let instance = mixed_instance(40);
    let config = Config::default()
        .with_variant(Variant::A3)
        .with_population_size(20)
        .with_max_generations(5);
    let packer = Packer3D::new(config);

    c.bench_function("solve_40_items_5_generations", |b| {
        b.iter(|| black_box(packer.solve(black_box(&instance))))
    });
}

criterion_group!(benches, decoder_benchmark, packer_benchmark);
criterion_main!(benches);
