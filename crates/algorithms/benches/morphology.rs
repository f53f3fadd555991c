//! Benchmarks for binary morphology and mask refinement

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lakeseg_algorithms::morphology::{closing, dilate, erode, opening, StructuringElement};
use lakeseg_algorithms::refine::{refine_mask, RefineParams};
use lakeseg_core::Mask;

fn create_test_mask(size: usize) -> Mask {
    // Large blob plus scattered specks
    Mask::from_fn(size, size, |row, col| {
        let dr = row as isize - (size * 2 / 3) as isize;
        let dc = col as isize - (size / 3) as isize;
        let radius = (size / 4) as isize;
        dr * dr + dc * dc < radius * radius || (row * 7 + col * 13) % 97 == 0
    })
}

fn bench_erode(c: &mut Criterion) {
    let mut group = c.benchmark_group("morphology/erode");
    let se = StructuringElement::default();
    for size in [256, 512, 1024] {
        let mask = create_test_mask(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| erode(black_box(&mask), &se, 1).unwrap())
        });
    }
    group.finish();
}

fn bench_dilate(c: &mut Criterion) {
    let mut group = c.benchmark_group("morphology/dilate");
    let se = StructuringElement::default();
    for size in [256, 512, 1024] {
        let mask = create_test_mask(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| dilate(black_box(&mask), &se, 1).unwrap())
        });
    }
    group.finish();
}

fn bench_opening_closing(c: &mut Criterion) {
    let mut group = c.benchmark_group("morphology/open_close");
    let se = StructuringElement::default();
    let mask = create_test_mask(512);
    group.bench_function("opening_x2", |b| {
        b.iter(|| opening(black_box(&mask), &se, 2).unwrap())
    });
    group.bench_function("closing_x3", |b| {
        b.iter(|| closing(black_box(&mask), &se, 3).unwrap())
    });
    group.finish();
}

fn bench_se_shapes(c: &mut Criterion) {
    let mut group = c.benchmark_group("morphology/erode_shapes");
    let mask = create_test_mask(512);
    let shapes: Vec<(&str, StructuringElement)> = vec![
        ("cross_3", StructuringElement::Cross(1)),
        ("square_3", StructuringElement::Square(1)),
        ("ellipse_5", StructuringElement::Ellipse { width: 5, height: 5 }),
        ("ellipse_9", StructuringElement::Ellipse { width: 9, height: 9 }),
        ("disk_4", StructuringElement::Disk(4)),
    ];
    for (name, se) in &shapes {
        group.bench_with_input(BenchmarkId::new("shape", name), name, |b, _| {
            b.iter(|| erode(black_box(&mask), se, 1).unwrap())
        });
    }
    group.finish();
}

fn bench_refine(c: &mut Criterion) {
    let mut group = c.benchmark_group("morphology/refine");
    for size in [256, 512] {
        let mask = create_test_mask(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| refine_mask(black_box(&mask), RefineParams::default()).unwrap())
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_erode,
    bench_dilate,
    bench_opening_closing,
    bench_se_shapes,
    bench_refine,
);
criterion_main!(benches);
