#[macro_use]
extern crate criterion;

use criterion::Criterion;
use trellis::math::point;
use trellis::tessellation::*;
use trellis_tests::*;

fn fill_circle(bench: &mut Criterion) {
    let path = circle(point(0.0, 0.0), 100.0);
    let options = TessellationOptions::tolerance(0.05);
    let mut tessellator = Tessellator::new();
    bench.bench_function("fill circle", |b| {
        b.iter(|| std::hint::black_box(tessellator.tessellate_path(&path, &options).ok()))
    });
}

fn fill_annulus(bench: &mut Criterion) {
    let path = annulus(point(0.0, 0.0), 50.0, 100.0);
    let options = TessellationOptions::tolerance(0.05);
    let mut tessellator = Tessellator::new();
    bench.bench_function("fill annulus", |b| {
        b.iter(|| std::hint::black_box(tessellator.tessellate_path(&path, &options).ok()))
    });
}

fn fill_star(bench: &mut Criterion) {
    let path = star(point(0.0, 0.0), 100.0, 31, 12);
    let mut tessellator = Tessellator::new();
    for &rule in &[FillRule::EvenOdd, FillRule::NonZero] {
        let options = TessellationOptions::DEFAULT.with_fill_rule(rule);
        bench.bench_function(&format!("fill star {:?}", rule), |b| {
            b.iter(|| std::hint::black_box(tessellator.tessellate_path(&path, &options).ok()))
        });
    }
}

fn fill_comb(bench: &mut Criterion) {
    let path = comb(200);
    let mut tessellator = Tessellator::new();
    bench.bench_function("fill comb", |b| {
        b.iter(|| {
            std::hint::black_box(
                tessellator
                    .tessellate_path(&path, &TessellationOptions::DEFAULT)
                    .ok(),
            )
        })
    });
}

fn fill_many_holes(bench: &mut Criterion) {
    let path = perforated_plate(20, 20);
    let options = TessellationOptions::tolerance(0.05);
    let mut tessellator = Tessellator::new();
    bench.bench_function("fill 400 holes", |b| {
        b.iter(|| std::hint::black_box(tessellator.tessellate_path(&path, &options).ok()))
    });
}

fn batch_scene(bench: &mut Criterion) {
    let paths = scene(20, 20);
    let options = TessellationOptions::non_zero();
    for &threads in &[1, 4] {
        let batch = BatchOptions::default().with_num_threads(threads);
        bench.bench_function(&format!("batch 400 paths {} threads", threads), |b| {
            b.iter(|| std::hint::black_box(tessellate_batch(&paths, &options, &batch).ok()))
        });
    }
}

criterion_group!(
    tessellation,
    fill_circle,
    fill_annulus,
    fill_star,
    fill_comb,
    fill_many_holes,
    batch_scene
);
criterion_main!(tessellation);
