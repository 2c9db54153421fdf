use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dgemm::{BlockConfig, Gemm, Isa, MatMut, MatRef, gemm_naive};
use std::hint::black_box;

fn matrix(len: usize) -> Vec<f64> {
    (0..len).map(|i| ((i % 17) as f64 - 8.0) * 0.125).collect()
}

fn bench_square(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemm_square");
    let engine = Gemm::default();
    let mut scratch = engine.scratch().unwrap();

    for size in [16, 32, 64, 128, 256, 512] {
        let flops = 2 * size * size * size;
        group.throughput(Throughput::Elements(flops as u64));

        let a = matrix(size * size);
        let b = matrix(size * size);
        let mut c = vec![0.0; size * size];

        group.bench_with_input(BenchmarkId::new(engine.isa().name(), size), &size, |bench, &n| {
            let a_view = MatRef::dense(&a, n, n).unwrap();
            let b_view = MatRef::dense(&b, n, n).unwrap();
            bench.iter(|| {
                let mut c_view = MatMut::dense(&mut c, n, n).unwrap();
                engine
                    .gemm(black_box(a_view), black_box(b_view), &mut c_view, Some(&mut scratch))
                    .unwrap();
            });
        });

        if size <= 256 {
            group.bench_with_input(BenchmarkId::new("naive", size), &size, |bench, &n| {
                bench.iter(|| gemm_naive(n, n, n, black_box(&a), n, black_box(&b), n, &mut c, n));
            });
        }
    }
    group.finish();
}

fn bench_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("gemm_paths");
    let size = 32;
    let a = matrix(size * size);
    let b = matrix(size * size);
    let mut out = vec![0.0; size * size];

    let engines = [
        ("small", Gemm::default(), true),
        ("blocked", Gemm::default(), false),
        ("portable", Gemm::default().with_isa(Isa::Portable).unwrap(), false),
        ("compact_blocks", Gemm::new(BlockConfig::compact()).unwrap(), false),
    ];

    for (name, engine, small) in engines {
        group.bench_function(name, |bench| {
            let a_view = MatRef::dense(&a, size, size).unwrap();
            let b_view = MatRef::dense(&b, size, size).unwrap();
            bench.iter(|| {
                let mut c_view = MatMut::dense(&mut out, size, size).unwrap();
                if small {
                    engine.gemm_small(a_view, b_view, &mut c_view, None).unwrap();
                } else {
                    engine.gemm_blocked(a_view, b_view, &mut c_view, None).unwrap();
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_square, bench_paths);
criterion_main!(benches);
