//! Integration tests for the GPU surface. Skipped when no adapter is available.
#![cfg(not(target_arch = "wasm32"))]

use waveform_field::gpu::GpuSurface;
use waveform_field::{
    export_frames, ExportConfig, FieldConfig, GpuContext, GpuError, ManualHost, PipelineError,
    RasterBackend, RenderLoop, Surface,
};

async fn create_gpu_surface(width: u32, height: u32) -> Option<GpuSurface> {
    GpuContext::new()
        .await
        .ok()
        .and_then(|gpu| GpuSurface::with_context(gpu, width, height).ok())
}

#[tokio::test]
async fn test_gpu_surface_follows_render_loop_resize() {
    let Some(surface) = create_gpu_surface(320, 400).await else {
        println!("Skipping: no GPU available");
        return;
    };

    let host = ManualHost::new();
    let mut render_loop = RenderLoop::new(host.clone(), FieldConfig::default()).unwrap();
    render_loop.start(surface.clone()).unwrap();
    host.tick();
    assert!(surface.queued_vertices() > 0);

    surface.set_client_size(200, 300);
    host.notify_resize();
    assert_eq!(surface.dimensions(), (200, 300));
    assert_eq!(surface.queued_vertices(), 0);
    render_loop.stop();
}

#[tokio::test]
async fn test_gpu_frame_has_transparent_background_and_lines() {
    let Some(surface) = create_gpu_surface(320, 400).await else {
        println!("Skipping: no GPU available");
        return;
    };

    let host = ManualHost::new();
    let mut render_loop = RenderLoop::new(host.clone(), FieldConfig::default()).unwrap();
    render_loop.start(surface.clone()).unwrap();
    host.tick();

    let image = surface.read_image().unwrap();
    assert_eq!(image.dimensions(), (320, 400));
    assert_eq!(image.get_pixel(0, 0)[3], 0);
    assert!(image.pixels().any(|p| p[3] > 0));
}

#[tokio::test]
async fn test_gpu_frames_replace_each_other() {
    let Some(surface) = create_gpu_surface(320, 400).await else {
        println!("Skipping: no GPU available");
        return;
    };

    let host = ManualHost::new();
    let mut render_loop = RenderLoop::new(host.clone(), FieldConfig::default()).unwrap();
    render_loop.start(surface.clone()).unwrap();
    host.tick();
    let first = surface.queued_vertices();
    host.tick();
    // Each frame clears the whole surface before stroking again.
    assert_eq!(surface.queued_vertices(), first);
}

#[tokio::test]
async fn test_gpu_export() {
    if GpuContext::new().await.is_err() {
        println!("Skipping: no GPU available");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig {
        width: 160,
        height: 200,
        frames: 2,
        backend: RasterBackend::Gpu,
        ..ExportConfig::default()
    };
    let paths = export_frames(dir.path(), &config, None).await.unwrap();
    assert_eq!(paths.len(), 2);
    assert!(paths.iter().all(|p| p.exists()));
}

#[tokio::test]
async fn test_gpu_export_rejects_frames_beyond_texture_limit() {
    let Ok(gpu) = GpuContext::new().await else {
        println!("Skipping: no GPU available");
        return;
    };
    let max = gpu.max_texture_dimension();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("frames");
    let config = ExportConfig {
        width: max + 1,
        height: 8,
        frames: 1,
        backend: RasterBackend::Gpu,
        ..ExportConfig::default()
    };
    let result = export_frames(&out, &config, None).await;
    assert!(matches!(
        result,
        Err(PipelineError::Gpu(GpuError::SurfaceTooLarge { .. }))
    ));
    assert!(std::fs::read_dir(&out).map_or(true, |mut d| d.next().is_none()));
}

#[test]
fn test_gpu_surface_reports_client_size() {
    let Some(surface) = pollster::block_on(create_gpu_surface(64, 32)) else {
        return;
    };
    assert_eq!(surface.client_size(), (64, 32));
    surface.set_client_size(-1, 10);
    assert_eq!(surface.client_size(), (-1, 10));
}
