//! Benchmarks for spectral indices

use agrorisk_algorithms::imagery::{msi, ndvi, savi, SaviParams};
use agrorisk_core::SpectralCube;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array3;

fn create_cube(size: usize) -> SpectralCube {
    let data = Array3::from_shape_fn((size, size, 6), |(row, col, band)| {
        100.0 * (band + 1) as f32 + ((row * 7 + col * 13) % 200) as f32
    });
    SpectralCube::from_array(data).unwrap()
}

fn bench_ndvi(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/ndvi");
    for size in [256, 512, 1024, 2048] {
        let cube = create_cube(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ndvi(black_box(&cube), 2, 3).unwrap())
        });
    }
    group.finish();
}

fn bench_savi_msi(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/savi_msi");
    for size in [256, 1024] {
        let cube = create_cube(size);
        group.bench_with_input(BenchmarkId::new("savi", size), &size, |b, _| {
            b.iter(|| savi(black_box(&cube), 2, 3, SaviParams::default()).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("msi", size), &size, |b, _| {
            b.iter(|| msi(black_box(&cube), 3, 5).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ndvi, bench_savi_msi);
criterion_main!(benches);
