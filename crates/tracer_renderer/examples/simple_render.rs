//! Simple path tracer example.
//!
//! Renders a glass, metal and diffuse sphere with a look-at camera and
//! saves the result to PPM format.

use tracer_renderer::{
    render, save_ppm, Camera, Color, Dielectric, Hittable, HittableList, Lambertian, Metal,
    RenderConfig, SceneError, Sphere, Vec3,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = RenderConfig {
        width: 400,
        height: 200,
        samples_per_pixel: 50,
        seed: Some(1),
        ..RenderConfig::default()
    };

    let world = build_scene()?;
    let camera = Camera::look_at(
        Vec3::new(-2.0, 2.0, 1.0), // look_from
        Vec3::new(0.0, 0.0, -1.0), // look_at
        Vec3::new(0.0, 1.0, 0.0),  // vup
        40.0,
        config.aspect_ratio(),
    )?;

    let output = render(&camera, &world, &config)?;
    println!(
        "Rendered in {:?}, {} rays cast",
        output.stats.elapsed, output.stats.rays_cast
    );

    let filename = "output.ppm";
    save_ppm(&output.framebuffer, filename)?;
    println!("Saved to {}", filename);

    Ok(())
}

fn build_scene() -> Result<Hittable, SceneError> {
    let mut world = HittableList::new();

    // Ground
    world.add(Sphere::new(
        Vec3::new(0.0, -100.5, -1.0),
        100.0,
        Lambertian::new(Color::new(0.8, 0.8, 0.0))?,
    )?);

    world.add(Sphere::new(
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        Lambertian::new(Color::new(0.1, 0.2, 0.5))?,
    )?);

    world.add(Sphere::new(
        Vec3::new(1.0, 0.0, -1.0),
        0.5,
        Metal::new(Color::new(0.8, 0.6, 0.2), 0.0)?,
    )?);

    // Glass bubble: a thin shell made of two nested spheres
    let glass = Dielectric::new(1.5)?;
    world.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, glass)?);
    world.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.45, glass)?);

    Ok(world.into())
}
