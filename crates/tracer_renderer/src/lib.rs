//! Tracer - CPU path tracing of sphere scenes.
//!
//! A Monte Carlo path tracer with Lambertian, metal and glass spheres lit
//! by an implicit sky. Pixels are spread over a fixed pool of worker
//! threads that claim batches from a shared work queue.
//!
//! ```ignore
//! use tracer_renderer::{render, RenderConfig, SceneDescription};
//!
//! let config = RenderConfig { samples_per_pixel: 100, ..RenderConfig::default() };
//! let scene = SceneDescription::builtin().build(config.aspect_ratio())?;
//! let output = render(&scene.camera, &scene.world, &config)?;
//! println!("We cast {} rays.", output.stats.rays_cast);
//! ```

mod camera;
mod framebuffer;
mod hittable;
mod material;
mod output;
pub mod random;
mod renderer;
mod scene;
mod scheduler;
mod sphere;

pub use camera::{Camera, CameraError};
pub use framebuffer::{Framebuffer, PackedRgb};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{reflect, refract, schlick, Color, Dielectric, Lambertian, Material, Metal, Scatter};
pub use output::{save_ppm, write_ppm};
pub use renderer::{
    color_to_rgb, default_threads, linear_to_gamma, quantize, ray_color, render, render_pixel,
    sky_gradient, ConfigError, RenderConfig, RenderError, RenderOutput, RenderResult, RenderStats,
    DEFAULT_MAX_DEPTH, RAY_EPSILON,
};
pub use scene::{
    CameraDescription, MaterialDescription, Scene, SceneDescription, SceneError, SceneResult,
    SphereDescription,
};
pub use scheduler::{PixelCoord, Scheduler, WorkQueue, DEFAULT_BATCH_SIZE};
pub use sphere::Sphere;

/// Re-export the math types from tracer_math
pub use tracer_math::{Interval, Ray, Real, Vec3};
