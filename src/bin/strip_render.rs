//! Strip Render - Offscreen Scroll Renderer
//!
//! Loads a segment manifest, lays its chunks out on the grid axis and renders
//! one frame of the rolled/unrolled surface to a PNG.
//!
//! Run with: `cargo run --bin strip_render -- <manifest.json> <out.png> [options]`
//!
//! Options:
//! - `--config <file>`: StripConfig JSON
//! - `--wrap <w>`: wrap index (clamped to the axis)
//! - `--flatten <f>`: flatten override in [0, 1]
//! - `--time <seconds>`: advance the wrap by `speed * time`
//! - `--camera-x <x>`: derive the wrap from a camera position on the axis
//! - `--label`: render label tiles instead of colour tiles
//! - `--shader <file>`: WGSL replacement for the built-in strip shader

use std::env;
use std::error::Error;
use std::sync::Arc;

use scroll_unroll_engine::assets::{Manifest, load_segment};
use scroll_unroll_engine::config::StripConfig;
use scroll_unroll_engine::navigation::StripNavigator;
use scroll_unroll_engine::render::{ShaderSource, StripRenderer, load_shader_file};

struct Args {
    manifest: String,
    output: String,
    config: Option<String>,
    wrap: Option<f32>,
    flatten: Option<f32>,
    time: Option<f32>,
    camera_x: Option<f32>,
    label: bool,
    shader: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = env::args().skip(1);
    let mut positional = Vec::new();
    let mut parsed = Args {
        manifest: String::new(),
        output: String::new(),
        config: None,
        wrap: None,
        flatten: None,
        time: None,
        camera_x: None,
        label: false,
        shader: None,
    };

    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or_else(|| format!("{name} needs a value"));
        match arg.as_str() {
            "--config" => parsed.config = Some(value("--config")?),
            "--wrap" => parsed.wrap = Some(parse_f32("--wrap", &value("--wrap")?)?),
            "--flatten" => parsed.flatten = Some(parse_f32("--flatten", &value("--flatten")?)?),
            "--time" => parsed.time = Some(parse_f32("--time", &value("--time")?)?),
            "--camera-x" => parsed.camera_x = Some(parse_f32("--camera-x", &value("--camera-x")?)?),
            "--label" => parsed.label = true,
            "--shader" => parsed.shader = Some(value("--shader")?),
            _ if arg.starts_with("--") => return Err(format!("unknown option {arg}")),
            _ => positional.push(arg),
        }
    }

    match <[String; 2]>::try_from(positional) {
        Ok([manifest, output]) => {
            parsed.manifest = manifest;
            parsed.output = output;
            Ok(parsed)
        }
        Err(_) => Err("expected <manifest.json> <out.png>".into()),
    }
}

fn parse_f32(name: &str, value: &str) -> Result<f32, String> {
    value
        .parse()
        .map_err(|e| format!("{name}: '{value}' is not a number ({e})"))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            eprintln!(
                "Usage: strip_render <manifest.json> <out.png> [--config file] [--wrap w] \
                 [--flatten f] [--time s] [--camera-x x] [--label] [--shader file]"
            );
            std::process::exit(1);
        }
    };

    let mut config = match &args.config {
        Some(path) => StripConfig::load(path)?,
        None => StripConfig::default(),
    };
    if args.label {
        config.features.label = true;
    }

    let manifest = Manifest::load(&args.manifest)?;
    let axis = Arc::new(manifest.grid_axis()?);

    let mut navigator = StripNavigator::from_config(Arc::clone(&axis), &config);
    if let Some(wrap) = args.wrap {
        navigator.set_wrap(wrap);
    }
    if let Some(flatten) = args.flatten {
        navigator.set_flatten(flatten);
    }
    if let Some(x) = args.camera_x {
        navigator.track_camera(x);
    }
    if let Some(time) = args.time {
        navigator.advance(time);
    }

    let kind = config.features.tile_kind();
    let segments = manifest
        .segments()
        .iter()
        .map(|segment| load_segment(segment, kind))
        .collect::<Result<Vec<_>, _>>()?;

    let shader = match &args.shader {
        Some(path) => load_shader_file(path)?,
        None => ShaderSource::default(),
    };
    let renderer = StripRenderer::with_shader(config, &shader)?;
    let image = renderer.render(&axis, &segments, &navigator.frame_params())?;
    image.save(&args.output)?;

    log::info!("[strip_render] Wrote {}", args.output);
    Ok(())
}
