//! Benchmarks for heatmap rendering.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use renderer::gradient::{render_grid, ColorRamp};
use renderer::png::encode_png;
use renderer::{render_heatmap, HeatmapOptions};
use test_utils::regions;

/// Random scores with roughly 5% missing cells.
fn generate_scores(cells: usize) -> Vec<Option<f32>> {
    let mut rng = rand::thread_rng();
    (0..cells)
        .map(|_| {
            if rng.gen_bool(0.05) {
                None
            } else {
                Some(rng.gen_range(0.0..1.0))
            }
        })
        .collect()
}

fn bench_color_at(c: &mut Criterion) {
    let ramp = ColorRamp::magma();
    let values: Vec<f32> = (0..1000).map(|i| i as f32 / 1000.0).collect();

    c.bench_function("magma_color_at_1000", |b| {
        b.iter(|| {
            for &v in &values {
                black_box(ramp.color_at(v));
            }
        })
    });
}

fn bench_render_grid(c: &mut Criterion) {
    let ramp = ColorRamp::magma();
    let scores = generate_scores(100 * 100);

    c.bench_function("render_grid_100x100", |b| {
        b.iter(|| black_box(render_grid(black_box(&scores), 100, 100, &ramp)))
    });
}

fn bench_render_heatmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_heatmap");
    let options = HeatmapOptions::default();

    for side in [20usize, 50, 100] {
        let scores = generate_scores(side * side);
        let block = options.block_size(side, side);
        group.throughput(Throughput::Elements((side * side * block * block) as u64));
        group.bench_with_input(BenchmarkId::new("grid", side), &side, |b, &side| {
            b.iter(|| render_heatmap(black_box(&scores), side, side, &regions::SMALL, &options))
        });
    }

    group.finish();
}

fn bench_encode_png(c: &mut Criterion) {
    let ramp = ColorRamp::magma();
    let scores = generate_scores(512 * 512);
    let pixels = render_grid(&scores, 512, 512, &ramp);

    c.bench_function("encode_png_512x512", |b| {
        b.iter(|| black_box(encode_png(black_box(&pixels), 512, 512)))
    });
}

criterion_group!(
    benches,
    bench_color_at,
    bench_render_grid,
    bench_render_heatmap,
    bench_encode_png
);
criterion_main!(benches);
