//! Benchmarks for frame rasterisation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use waveform_field::gpu::GpuSurface;
use waveform_field::{Context2d, FieldConfig, LineRenderer, PixelSurface, Surface, ViewportState};

fn draw_frame<S: Surface>(surface: &S, renderer: &LineRenderer, viewport: &ViewportState, time: f64) {
    if let Some(mut ctx) = surface.context_2d() {
        ctx.clear_rect(0.0, 0.0, viewport.width() as f64, viewport.height() as f64);
        renderer.draw(&mut ctx, viewport, time);
    }
}

fn bench_cpu_resolutions(c: &mut Criterion) {
    let mut group = c.benchmark_group("CPU Rasterisation");
    let renderer = LineRenderer::new(&FieldConfig::default());

    let resolutions = [
        (640, 360, "360p"),
        (1280, 720, "720p"),
        (1920, 1080, "1080p"),
    ];

    for (width, height, name) in resolutions {
        let surface = PixelSurface::new(width, height);
        let viewport = ViewportState::from_client(width as i32, height as i32);

        group.bench_with_input(BenchmarkId::new("frame", name), &surface, |b, surface| {
            b.iter(|| draw_frame(surface, &renderer, &viewport, black_box(2.0)));
        });
    }

    group.finish();
}

fn bench_gpu_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("GPU Rasterisation");

    let surface = match pollster::block_on(GpuSurface::new(1920, 1080)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Skipping GPU benchmarks: {}", e);
            return;
        }
    };
    let renderer = LineRenderer::new(&FieldConfig::default());
    let viewport = ViewportState::from_client(1920, 1080);

    group.bench_function("frame_and_readback_1080p", |b| {
        b.iter(|| {
            draw_frame(&surface, &renderer, &viewport, black_box(2.0));
            black_box(surface.read_pixels().ok());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_cpu_resolutions, bench_gpu_frame);
criterion_main!(benches);
