//! Example: Render the waveform field to a PNG sequence.
//!
//! Run with:
//!     cargo run --example render_frames --features tokio -- [out_dir] [frames] [cpu|gpu] [#rrggbb]
//!
//! Set `RUST_LOG=debug` to see per-frame output.

use anyhow::{anyhow, Context};
use std::cell::Cell;
use std::path::PathBuf;
use waveform_field::{export_frames, parse_hex_color, ExportConfig, RasterBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "waveform_frames".to_string()));

    let mut config = ExportConfig {
        width: 960,
        height: 540,
        frames: 90,
        ..ExportConfig::default()
    };
    if let Some(frames) = args.next() {
        config.frames = frames
            .parse()
            .with_context(|| format!("Invalid frame count: {}", frames))?;
    }
    if let Some(backend) = args.next() {
        config.backend = RasterBackend::from_str(&backend)
            .ok_or_else(|| anyhow!("Unknown backend: {} (expected cpu or gpu)", backend))?;
    }
    if let Some(color) = args.next() {
        config.field.stroke_color =
            parse_hex_color(&color).ok_or_else(|| anyhow!("Invalid color: {}", color))?;
    }

    println!("Ambient Waveform - Frame Export");
    println!("===============================\n");
    println!("  Resolution: {}x{}", config.width, config.height);
    println!("  Frames: {}", config.frames);
    println!("  Lines: {}", config.field.line_count);
    println!("  Backend: {}\n", config.backend.name());

    let last_decile = Cell::new(0u32);
    let progress = Box::new(move |p: f32| {
        let decile = (p * 10.0) as u32;
        if decile > last_decile.get() {
            last_decile.set(decile);
            println!("  {:>3}%", decile * 10);
        }
    });

    let paths = export_frames(&out_dir, &config, Some(progress))
        .await
        .context("Export failed")?;

    println!("\nWrote {} frames to {}", paths.len(), out_dir.display());
    Ok(())
}
