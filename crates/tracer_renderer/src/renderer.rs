//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a hard depth cutoff
//! - Sky gradient illumination for rays that escape the scene
//! - Anti-aliasing via jittered multi-sampling
//! - Gamma correction and 8-bit quantization

use std::collections::TryReserveError;
use std::time::{Duration, Instant};

use crate::framebuffer::{Framebuffer, PackedRgb};
use crate::random::{entropy_rng, gen_real, pixel_rng};
use crate::scheduler::{PixelCoord, Scheduler, WorkQueue, DEFAULT_BATCH_SIZE};
use crate::{Camera, Color, Hittable, Ray};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::RngCore;
use thiserror::Error;
use tracer_math::{Interval, Real};

/// Default maximum ray bounce depth.
pub const DEFAULT_MAX_DEPTH: u32 = 50;

/// Minimum hit distance, keeps bounced rays from re-hitting their own surface.
pub const RAY_EPSILON: Real = 0.001;

/// Invalid render settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("image width must be at least 1")]
    ZeroWidth,

    #[error("image height must be at least 1")]
    ZeroHeight,

    #[error("samples per pixel must be at least 1")]
    ZeroSamples,

    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}

/// Errors that can abort a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid render configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("image of {width}x{height} pixels does not fit in memory")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("failed to allocate {pixels} pixels")]
    Allocation {
        pixels: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("failed to start worker threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Number of worker threads
    pub threads: usize,
    /// Pixels claimed per visit to the work queue
    pub batch_size: usize,
    /// Fixed seed for reproducible images, fresh entropy when `None`
    pub seed: Option<u64>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 200,
            samples_per_pixel: 1,
            max_depth: DEFAULT_MAX_DEPTH,
            threads: default_threads(),
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
        }
    }
}

impl RenderConfig {
    /// Check that every size is at least one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }

    /// Image width over height.
    pub fn aspect_ratio(&self) -> Real {
        self.width as Real / self.height as Real
    }
}

/// Hardware concurrency, falling back to a single thread.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Diagnostics gathered over a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Rays cast over all samples and bounces
    pub rays_cast: u64,
    /// Pixels rendered
    pub pixels: u64,
    /// Number of workers that took part
    pub workers: usize,
    /// Wall-clock time of the render
    pub elapsed: Duration,
}

/// Finished image plus diagnostics.
#[derive(Debug)]
pub struct RenderOutput {
    pub framebuffer: Framebuffer,
    pub stats: RenderStats,
}

/// Compute the color seen by a ray.
///
/// This is the core path tracing function. It traces the ray through
/// the scene, bouncing off surfaces and multiplying in each surface's
/// attenuation. Every call counts one ray in `rays_cast`.
pub fn ray_color(
    ray: &Ray,
    world: &Hittable,
    depth: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    rays_cast: &mut u64,
) -> Color {
    *rays_cast += 1;

    let Some(rec) = world.hit(ray, Interval::new(RAY_EPSILON, Real::INFINITY)) else {
        return sky_gradient(ray);
    };

    if depth >= config.max_depth {
        return Color::ZERO;
    }

    match rec.material.scatter(ray, &rec, rng) {
        Some(scatter) => {
            scatter.attenuation * ray_color(&scatter.scattered, world, depth + 1, config, rng, rays_cast)
        }
        // Ray was absorbed
        None => Color::ZERO,
    }
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize_or_zero();
    let t = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - t) + blue * t
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: Real) -> Real {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Quantize a gamma-corrected channel to 8 bits.
///
/// `floor(255.99 * value)`, clamped so out-of-range channels saturate
/// instead of wrapping.
#[inline]
pub fn quantize(value: Real) -> u8 {
    if value.is_nan() {
        return 0;
    }
    Interval::new(0.0, 255.0).clamp((255.99 * value).floor()) as u8
}

/// Convert an averaged linear color to a packed 8-bit pixel.
pub fn color_to_rgb(color: Color) -> PackedRgb {
    PackedRgb::new(
        quantize(linear_to_gamma(color.x)),
        quantize(linear_to_gamma(color.y)),
        quantize(linear_to_gamma(color.z)),
    )
}

/// Render a single pixel with multi-sampling.
///
/// Returns the average linear color over `samples_per_pixel` jittered rays.
pub fn render_pixel(
    camera: &Camera,
    world: &Hittable,
    coord: PixelCoord,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
    rays_cast: &mut u64,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        let u = (coord.u as Real + gen_real(rng)) / config.width as Real;
        let v = (coord.v as Real + gen_real(rng)) / config.height as Real;
        let ray = camera.get_ray(u, v);
        pixel_color += ray_color(&ray, world, 0, config, rng, rays_cast);
    }

    // Average the samples
    pixel_color / config.samples_per_pixel as Real
}

/// Per-worker render state, merged after the join.
struct WorkerState {
    rng: Option<StdRng>,
    rays_cast: u64,
    pixels: u64,
}

/// Generator for the pixel at buffer-independent index `pixel`.
///
/// Seeded renders restart from the pixel's own stream. Unseeded renders
/// keep drawing from one entropy-seeded generator per worker, created on
/// first use.
fn pixel_stream(slot: &mut Option<StdRng>, seed: Option<u64>, pixel: u64) -> &mut StdRng {
    match seed {
        Some(seed) => slot.insert(pixel_rng(seed, pixel)),
        None => slot.get_or_insert_with(entropy_rng),
    }
}

/// Render the entire scene to a framebuffer on a pool of worker threads.
pub fn render(camera: &Camera, world: &Hittable, config: &RenderConfig) -> RenderResult<RenderOutput> {
    config.validate()?;
    let start = Instant::now();

    let framebuffer = Framebuffer::new(config.width, config.height)?;
    let queue = WorkQueue::for_image(config.width, config.height)?;
    let scheduler = Scheduler::new(config.threads, config.batch_size)?;

    info!(
        "Rendering {}x{} @ {} spp on {} threads (batch {}, max depth {})",
        config.width,
        config.height,
        config.samples_per_pixel,
        scheduler.threads(),
        scheduler.batch_size(),
        config.max_depth
    );

    let workers = scheduler.run(
        &queue,
        |_| WorkerState {
            rng: None,
            rays_cast: 0,
            pixels: 0,
        },
        |state, coord| {
            let pixel = coord.v as u64 * config.width as u64 + coord.u as u64;
            let rng = pixel_stream(&mut state.rng, config.seed, pixel);
            let color = render_pixel(camera, world, coord, config, rng, &mut state.rays_cast);
            framebuffer.write(coord, color_to_rgb(color));
            state.pixels += 1;
        },
    )?;

    for (index, worker) in workers.iter().enumerate() {
        debug!("worker {}: {} pixels, {} rays", index, worker.pixels, worker.rays_cast);
    }

    let stats = RenderStats {
        rays_cast: workers.iter().map(|w| w.rays_cast).sum(),
        pixels: workers.iter().map(|w| w.pixels).sum(),
        workers: workers.len(),
        elapsed: start.elapsed(),
    };

    info!(
        "Rendered {} pixels in {:.2?}, {} rays cast",
        stats.pixels, stats.elapsed, stats.rays_cast
    );

    Ok(RenderOutput { framebuffer, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dielectric, HittableList, Lambertian, Metal, Sphere};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tracer_math::Vec3;

    fn single_sphere(material: impl Into<crate::Material>) -> Hittable {
        Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, material).unwrap().into()
    }

    fn config_with_depth(max_depth: u32) -> RenderConfig {
        RenderConfig {
            max_depth,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_sky_gradient() {
        // Ray pointing up is pure sky blue, pointing down is white
        let up = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0)));
        assert!((up - Color::new(0.5, 0.7, 1.0)).length() < 1e-6);

        let down = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(0.0, -1.0, 0.0)));
        assert!((down - Color::ONE).length() < 1e-6);

        let level = sky_gradient(&Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)));
        assert!((level - Color::new(0.75, 0.85, 1.0)).length() < 1e-6);
    }

    #[test]
    fn test_miss_returns_sky_without_recursion() {
        let world = single_sphere(Lambertian::new(Color::splat(0.5)).unwrap());
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut rays = 0;

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.3, 0.8, 0.2));
        let color = ray_color(&ray, &world, 0, &config, &mut rng, &mut rays);

        assert_eq!(color, sky_gradient(&ray));
        assert_eq!(rays, 1);
    }

    #[test]
    fn test_depth_limit_returns_black() {
        // Lambertian always scatters, yet the cutoff must win
        let world = single_sphere(Lambertian::new(Color::ONE).unwrap());
        let config = config_with_depth(50);
        let mut rng = StdRng::seed_from_u64(1);
        let mut rays = 0;

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let color = ray_color(&ray, &world, 50, &config, &mut rng, &mut rays);

        assert_eq!(color, Color::ZERO);
        assert_eq!(rays, 1);
    }

    #[test]
    fn test_zero_depth_config_only_sees_sky() {
        let world = single_sphere(Lambertian::new(Color::ONE).unwrap());
        let config = config_with_depth(0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut rays = 0;

        let hit = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(ray_color(&hit, &world, 0, &config, &mut rng, &mut rays), Color::ZERO);

        let miss = Ray::new(Vec3::ZERO, Vec3::Y);
        assert_eq!(ray_color(&miss, &world, 0, &config, &mut rng, &mut rays), sky_gradient(&miss));
    }

    #[test]
    fn test_attenuation_compounds() {
        // A mirror sphere reflects the ray straight back into the sky
        let albedo = Color::new(0.8, 0.6, 0.2);
        let world = single_sphere(Metal::new(albedo, 0.0).unwrap());
        let config = RenderConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut rays = 0;

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let color = ray_color(&ray, &world, 0, &config, &mut rng, &mut rays);

        let bounced = Ray::new(Vec3::new(0.0, 0.0, -0.5), Vec3::new(0.0, 0.0, 1.0));
        assert!((color - albedo * sky_gradient(&bounced)).length() < 1e-5);
        assert_eq!(rays, 2);
    }

    #[test]
    fn test_glass_never_produces_nan() {
        // Nested glass spheres exercise both entering and exiting refraction
        let glass = Dielectric::new(1.5).unwrap();
        let mut world = HittableList::new();
        world.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, glass).unwrap());
        world.add(Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.45, glass).unwrap());
        let world = Hittable::from(world);

        let camera = Camera::default();
        let config = RenderConfig {
            width: 20,
            height: 10,
            samples_per_pixel: 4,
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mut rays = 0;

        for v in 0..config.height {
            for u in 0..config.width {
                let color = render_pixel(&camera, &world, PixelCoord::new(u, v), &config, &mut rng, &mut rays);
                assert!(color.is_finite());
            }
        }
        assert!(rays >= (config.width * config.height * config.samples_per_pixel) as u64);
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_quantize_clamps() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(0.5), 127);
        assert_eq!(quantize(1.0), 255);
        assert_eq!(quantize(1.5), 255);
        assert_eq!(quantize(-0.2), 0);
        assert_eq!(quantize(Real::INFINITY), 255);
        assert_eq!(quantize(Real::NAN), 0);
    }

    #[test]
    fn test_color_to_rgb() {
        let rgb = color_to_rgb(Color::new(1.0, 0.25, 0.0));
        assert_eq!(rgb.channels(), [255, 127, 0]);
    }

    #[test]
    fn test_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());
        let bad = |f: fn(&mut RenderConfig)| {
            let mut config = RenderConfig::default();
            f(&mut config);
            config.validate()
        };
        assert_eq!(bad(|c| c.width = 0), Err(ConfigError::ZeroWidth));
        assert_eq!(bad(|c| c.height = 0), Err(ConfigError::ZeroHeight));
        assert_eq!(bad(|c| c.samples_per_pixel = 0), Err(ConfigError::ZeroSamples));
        assert_eq!(bad(|c| c.threads = 0), Err(ConfigError::ZeroThreads));
        assert_eq!(bad(|c| c.batch_size = 0), Err(ConfigError::ZeroBatchSize));
    }

    #[test]
    fn test_render_rejects_invalid_config() {
        let world = Hittable::from(HittableList::new());
        let config = RenderConfig {
            samples_per_pixel: 0,
            ..RenderConfig::default()
        };
        assert!(matches!(
            render(&Camera::default(), &world, &config),
            Err(RenderError::Config(ConfigError::ZeroSamples))
        ));
    }

    #[test]
    fn test_render_counts_rays() {
        // Empty scene: exactly one ray per sample
        let world = Hittable::from(HittableList::new());
        let config = RenderConfig {
            width: 8,
            height: 4,
            samples_per_pixel: 3,
            threads: 2,
            seed: Some(9),
            ..RenderConfig::default()
        };

        let output = render(&Camera::default(), &world, &config).unwrap();
        assert_eq!(output.stats.pixels, 32);
        assert_eq!(output.stats.rays_cast, 96);
        assert_eq!(output.stats.workers, 2);
        assert_eq!(output.framebuffer.len(), 32);
    }

    #[test]
    fn test_pixel_stream_seeding() {
        // Seeded: every pixel restarts its own stream
        let mut slot = None;
        let first = pixel_stream(&mut slot, Some(3), 7).next_u64();
        assert_eq!(first, pixel_rng(3, 7).next_u64());
        assert_eq!(pixel_stream(&mut slot, Some(3), 7).next_u64(), first);

        // Unseeded: one generator is created lazily and keeps advancing
        let mut slot = None;
        let a = pixel_stream(&mut slot, None, 0).next_u64();
        assert!(slot.is_some());
        let b = pixel_stream(&mut slot, None, 0).next_u64();
        assert_ne!(a, b);
    }
}
