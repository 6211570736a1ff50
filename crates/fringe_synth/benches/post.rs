mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fringe_synth::prelude::*;

const SIZES: [(u32, u32); 3] = [(256, 128), (1024, 512), (2048, 1024)];

fn blur_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("post/gaussian_blur");

    for &(w, h) in &SIZES {
        let frame = Frame::blank(w, h);
        group.throughput(common::pixels_throughput(w, h));
        for &radius in &[2u32, 5] {
            let blur = BlurConfig::new(radius);
            group.bench_with_input(
                BenchmarkId::new(format!("r{radius}"), format!("{w}x{h}")),
                &radius,
                |b, _| {
                    b.iter(|| black_box(gaussian_blur(&frame, &blur)));
                },
            );
        }
    }

    group.finish();
}

fn rotate_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("post/rotate_clockwise");

    for &(w, h) in &SIZES {
        let frame = Frame::blank(w, h);
        group.throughput(common::pixels_throughput(w, h));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{w}x{h}")), &w, |b, _| {
            b.iter(|| black_box(rotate_clockwise(&frame)));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = blur_benches, rotate_benches
}
criterion_main!(benches);
