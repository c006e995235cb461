use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use tracer_renderer::{default_threads, RenderConfig, DEFAULT_BATCH_SIZE, DEFAULT_MAX_DEPTH};

/// Log levels selectable from the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments.
///
/// The positional arguments keep the order `samples width height threads`.
#[derive(Debug, Parser)]
#[command(name = "tracer")]
#[command(about = "Path trace a scene of spheres to a PPM image")]
pub struct Args {
    /// Number of samples per pixel
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub samples: u32,

    /// Image width in pixels (only applied together with a height)
    #[arg(default_value_t = 400, requires = "height", value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// Image height in pixels
    #[arg(default_value_t = 200, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Worker threads (defaults to the number of CPUs)
    pub threads: Option<usize>,

    /// Pixels claimed from the work queue at a time
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Maximum number of bounces per path
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: u32,

    /// Seed for a reproducible image
    #[arg(long)]
    pub seed: Option<u64>,

    /// JSON scene description (defaults to the built-in scene)
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Output file path
    #[arg(short, long, default_value = "image.ppm")]
    pub output: PathBuf,

    /// Set the logging level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Args {
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            width: self.width,
            height: self.height,
            samples_per_pixel: self.samples,
            max_depth: self.max_depth,
            threads: self.threads.unwrap_or_else(default_threads),
            batch_size: self.batch_size,
            seed: self.seed,
        }
    }
}

/// Final line printed after a render.
pub fn ray_report(rays_cast: u64) -> String {
    format!("We cast {rays_cast} rays.")
}
