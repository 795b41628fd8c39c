//! Segment Metrics - Mesh Pre-Processing
//!
//! Computes area, centre, mean normal and principal in-plane axes of a
//! segment mesh and writes them as JSON.
//!
//! Run with: `cargo run --bin segment_metrics -- <mesh.obj> [options]`
//!
//! Options:
//! - `--texture <file>`: record the segment texture's size as `tifsize`
//! - `--png`: also write a PNG copy of the texture next to it
//! - `--out <file>`: output path (default: the mesh path with `.json`)

use std::env;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use scroll_unroll_engine::metrics::{SegmentMetrics, parse_obj};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);
    let mut mesh: Option<PathBuf> = None;
    let mut texture: Option<PathBuf> = None;
    let mut out: Option<PathBuf> = None;
    let mut write_png = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--texture" => texture = args.next().map(PathBuf::from),
            "--out" => out = args.next().map(PathBuf::from),
            "--png" => write_png = true,
            _ if mesh.is_none() && !arg.starts_with("--") => mesh = Some(PathBuf::from(arg)),
            _ => {
                eprintln!("unexpected argument {arg}");
                std::process::exit(1);
            }
        }
    }

    let Some(mesh) = mesh else {
        eprintln!("Usage: segment_metrics <mesh.obj> [--texture file] [--png] [--out file]");
        std::process::exit(1);
    };

    let obj = parse_obj(BufReader::new(File::open(&mesh)?))?;
    let mut metrics = SegmentMetrics::compute(&obj)?;

    if let Some(texture) = &texture {
        let image = image::open(texture)?;
        metrics = metrics.with_tifsize(image.width(), image.height());
        if write_png {
            let png = texture.with_extension("png");
            image.save(&png)?;
            log::info!("[segment_metrics] Wrote {}", png.display());
        }
    }

    let out = out.unwrap_or_else(|| mesh.with_extension("json"));
    std::fs::write(&out, serde_json::to_string_pretty(&metrics)?)?;
    log::info!("[segment_metrics] Wrote {}", out.display());
    Ok(())
}
