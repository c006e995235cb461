//! `tracer` - render a sphere scene to a PPM image.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::time::Instant;
use tracer_renderer::{render, save_ppm, SceneDescription};

mod cli;
mod logger;

use cli::Args;
use logger::init_logger;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let config = args.render_config();
    config.validate().context("invalid render settings")?;

    let description = match &args.scene {
        Some(path) => SceneDescription::load(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => SceneDescription::builtin(),
    };
    let scene = description
        .build(config.aspect_ratio())
        .context("invalid scene")?;
    info!("Scene ready: {} spheres", description.spheres.len());

    let start = Instant::now();
    let output = render(&scene.camera, &scene.world, &config).context("render failed")?;

    save_ppm(&output.framebuffer, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!("Saved {} in {:.2?}", args.output.display(), start.elapsed());
    println!("{}", cli::ray_report(output.stats.rays_cast));

    Ok(())
}
