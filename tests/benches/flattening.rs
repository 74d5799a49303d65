#[macro_use]
extern crate criterion;

use criterion::Criterion;
use trellis::path::build_contours;
use trellis_tests::*;

fn flatten_cubic(bench: &mut Criterion) {
    let curves = generate_bezier_curves(200);
    for &tolerance in &[0.01, 0.1, 0.25] {
        bench.bench_function(&format!("flatten cubic tolerance {}", tolerance), |b| {
            b.iter(|| {
                let mut count = 0u32;
                for curve in &curves {
                    curve.for_each_flattened(tolerance, &mut |_| count += 1);
                }
                std::hint::black_box(count);
            })
        });
    }
}

fn flatten_quadratic(bench: &mut Criterion) {
    let curves = generate_quadratic_curves(200);
    for &tolerance in &[0.01, 0.1, 0.25] {
        bench.bench_function(&format!("flatten quadratic tolerance {}", tolerance), |b| {
            b.iter(|| {
                let mut count = 0u32;
                for curve in &curves {
                    curve.for_each_flattened(tolerance, &mut |_| count += 1);
                }
                std::hint::black_box(count);
            })
        });
    }
}

fn contours_of_scene(bench: &mut Criterion) {
    let paths = scene(10, 10);
    bench.bench_function("build contours 100 paths", |b| {
        b.iter(|| {
            for path in &paths {
                std::hint::black_box(build_contours(path, 0.1).ok());
            }
        })
    });
}

criterion_group!(flattening, flatten_cubic, flatten_quadratic, contours_of_scene);
criterion_main!(flattening);
