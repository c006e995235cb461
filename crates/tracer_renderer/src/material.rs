//! Surface materials and how they scatter light.

use crate::hittable::HitRecord;
use crate::random::{gen_real, random_in_unit_sphere};
use crate::scene::SceneError;
use crate::Ray;
use rand::RngCore;
use tracer_math::{Real, Vec3};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Outcome of a ray scattering off a surface.
#[derive(Debug, Clone, Copy)]
pub struct Scatter {
    /// Per-channel fraction of light carried along the scattered ray
    pub attenuation: Color,
    /// Ray leaving the surface
    pub scattered: Ray,
}

/// Material describing how light interacts with a surface.
///
/// The set of materials is closed, so dispatch is a plain `match`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
}

impl Material {
    /// Scatter an incoming ray.
    ///
    /// Returns `Some(scatter)` if the ray continues, or `None` if the
    /// surface absorbs it.
    pub fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        match self {
            Material::Lambertian(m) => m.scatter(ray_in, rec, rng),
            Material::Metal(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => m.scatter(ray_in, rec, rng),
        }
    }
}

impl From<Lambertian> for Material {
    fn from(m: Lambertian) -> Self {
        Material::Lambertian(m)
    }
}

impl From<Metal> for Material {
    fn from(m: Metal) -> Self {
        Material::Metal(m)
    }
}

impl From<Dielectric> for Material {
    fn from(m: Dielectric) -> Self {
        Material::Dielectric(m)
    }
}

fn check_albedo(albedo: Color) -> Result<Color, SceneError> {
    if albedo.is_finite() {
        Ok(albedo)
    } else {
        Err(SceneError::InvalidAlbedo)
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Result<Self, SceneError> {
        Ok(Self {
            albedo: check_albedo(albedo)?,
        })
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let mut scatter_direction = rec.normal + random_in_unit_sphere(rng);

        // Catch degenerate scatter direction
        if scatter_direction.length_squared() < 1e-8 {
            scatter_direction = rec.normal;
        }

        Some(Scatter {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metal {
    albedo: Color,
    fuzz: Real,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough. Clamped into [0, 1].
    pub fn new(albedo: Color, fuzz: Real) -> Result<Self, SceneError> {
        if fuzz.is_nan() {
            return Err(SceneError::InvalidFuzz(fuzz));
        }
        Ok(Self {
            albedo: check_albedo(albedo)?,
            fuzz: fuzz.clamp(0.0, 1.0),
        })
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    pub fn fuzz(&self) -> Real {
        self.fuzz
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_in_unit_sphere(rng);

        // Rays pushed below the surface by fuzz are absorbed
        (scattered_dir.dot(rec.normal) > 0.0).then(|| Scatter {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scattered_dir),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dielectric {
    refractive_index: Real,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `refractive_index`: 1.0 = air, 1.5 = glass, 2.4 = diamond
    pub fn new(refractive_index: Real) -> Result<Self, SceneError> {
        if !(refractive_index.is_finite() && refractive_index > 0.0) {
            return Err(SceneError::InvalidRefractiveIndex(refractive_index));
        }
        Ok(Self { refractive_index })
    }

    pub fn refractive_index(&self) -> Real {
        self.refractive_index
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let direction = ray_in.direction();
        let d_dot_n = direction.dot(rec.normal);
        let length = direction.length();

        // Sphere normals point outward, so a positive dot means we are leaving the medium
        let (outward_normal, ni_over_nt, cosine) = if d_dot_n > 0.0 {
            (-rec.normal, self.refractive_index, self.refractive_index * d_dot_n / length)
        } else {
            (rec.normal, 1.0 / self.refractive_index, -d_dot_n / length)
        };

        let scattered_dir = match refract(direction, outward_normal, ni_over_nt) {
            Some(refracted) if gen_real(rng) >= schlick(cosine, self.refractive_index) => refracted,
            // Total internal reflection, or the Fresnel draw picked reflection
            _ => reflect(direction, rec.normal),
        };

        Some(Scatter {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, scattered_dir),
        })
    }
}

// =============================================================================
// Helper functions
// =============================================================================

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a vector through a surface with Snell's law.
///
/// Returns `None` on total internal reflection.
#[inline]
pub fn refract(v: Vec3, n: Vec3, ni_over_nt: Real) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    (discriminant > 0.0).then(|| ni_over_nt * (uv - n * dt) - n * discriminant.sqrt())
}

/// Schlick's approximation for reflectance
#[inline]
pub fn schlick(cosine: Real, refractive_index: Real) -> Real {
    let r0 = ((1.0 - refractive_index) / (1.0 + refractive_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record_at_origin(material: &Material, normal: Vec3) -> HitRecord<'_> {
        HitRecord {
            t: 1.0,
            p: Vec3::ZERO,
            normal,
            material,
        }
    }

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        assert_eq!(reflect(v, Vec3::Y), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_refract_straight_through() {
        let refracted = refract(Vec3::new(0.0, -2.0, 0.0), Vec3::Y, 1.0 / 1.5).unwrap();
        assert!((refracted - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // Grazing ray leaving glass into air
        let v = Vec3::new(1.0, -0.1, 0.0);
        assert!(refract(v, Vec3::Y, 1.5).is_none());
    }

    #[test]
    fn test_schlick_bounds() {
        let r0 = ((1.0 - 1.5) / (1.0 + 1.5)) * ((1.0 - 1.5) / (1.0 + 1.5));
        assert!((schlick(1.0, 1.5) - r0).abs() < 1e-6);
        assert!((schlick(0.0, 1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_lambertian_always_scatters() {
        let material: Material = Lambertian::new(Color::new(0.8, 0.3, 0.3)).unwrap().into();
        let rec = record_at_origin(&material, Vec3::Y);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..100 {
            let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(scatter.attenuation, Color::new(0.8, 0.3, 0.3));
            assert_eq!(scatter.scattered.origin(), rec.p);
            // normal + point in unit sphere stays in the upper hemisphere
            assert!(scatter.scattered.direction().dot(rec.normal) >= 0.0);
        }
    }

    #[test]
    fn test_metal_mirror() {
        let material: Material = Metal::new(Color::new(0.8, 0.6, 0.2), 0.0).unwrap().into();
        let rec = record_at_origin(&material, Vec3::Y);
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(1);

        let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((scatter.scattered.direction() - expected).length() < 1e-5);
        assert_eq!(scatter.attenuation, Color::new(0.8, 0.6, 0.2));
    }

    #[test]
    fn test_metal_absorbs_rays_below_surface() {
        let material: Material = Metal::new(Color::ONE, 0.0).unwrap().into();
        // Ray arriving from behind the surface reflects into it
        let rec = record_at_origin(&material, Vec3::Y);
        let ray = Ray::new(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(1);

        assert!(material.scatter(&ray, &rec, &mut rng).is_none());
    }

    #[test]
    fn test_metal_fuzz_is_clamped() {
        assert_eq!(Metal::new(Color::ONE, 3.0).unwrap().fuzz(), 1.0);
        assert_eq!(Metal::new(Color::ONE, -1.0).unwrap().fuzz(), 0.0);
        assert!(Metal::new(Color::ONE, Real::NAN).is_err());
    }

    #[test]
    fn test_dielectric_attenuation_is_clear() {
        let material: Material = Dielectric::new(1.5).unwrap().into();
        let rec = record_at_origin(&material, Vec3::Y);
        let ray = Ray::new(Vec3::new(0.3, 1.0, 0.0), Vec3::new(-0.3, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..100 {
            let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(scatter.attenuation, Color::ONE);
            assert!(scatter.scattered.direction().is_finite());
        }
    }

    #[test]
    fn test_dielectric_reflects_at_schlick_rate() {
        let material: Material = Dielectric::new(1.5).unwrap().into();
        let rec = record_at_origin(&material, Vec3::Y);
        // Head-on entry: refraction goes straight down, reflection straight up
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(11);

        let draws = 20_000;
        let mut reflected = 0;
        for _ in 0..draws {
            let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
            if scatter.scattered.direction().y > 0.0 {
                reflected += 1;
            }
        }

        let share = reflected as Real / draws as Real;
        let expected = schlick(1.0, 1.5);
        assert!((share - expected).abs() < 0.01, "share={share} expected={expected}");
    }

    #[test]
    fn test_dielectric_entry_bends_toward_normal() {
        let material: Material = Dielectric::new(1.5).unwrap().into();
        let rec = record_at_origin(&material, Vec3::Y);
        // 45 degree incidence from above
        let ray = Ray::new(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let mut rng = StdRng::seed_from_u64(5);

        let sin_incident = Real::sqrt(0.5);
        let mut refracted = 0;
        for _ in 0..200 {
            let dir = material.scatter(&ray, &rec, &mut rng).unwrap().scattered.direction();
            if dir.y >= 0.0 {
                continue;
            }
            refracted += 1;

            let unit = dir.normalize();
            let sin_transmitted = unit.x;
            assert!((sin_transmitted - sin_incident / 1.5).abs() < 1e-4);
            assert!(sin_transmitted < sin_incident);
            assert_eq!(unit.z, 0.0);
        }

        // Reflectance at 45 degrees is about 5%, so most draws refract
        assert!(refracted > 150, "refracted={refracted}");
    }

    #[test]
    fn test_dielectric_total_internal_reflection_from_inside() {
        let material: Material = Dielectric::new(1.5).unwrap().into();
        // Outward normal, ray travelling outward at a grazing angle
        let rec = record_at_origin(&material, Vec3::Y);
        let ray = Ray::new(Vec3::new(-1.0, -0.1, 0.0), Vec3::new(1.0, 0.1, 0.0));
        let mut rng = StdRng::seed_from_u64(9);

        for _ in 0..20 {
            let scatter = material.scatter(&ray, &rec, &mut rng).unwrap();
            let expected = reflect(ray.direction(), rec.normal);
            assert!((scatter.scattered.direction() - expected).length() < 1e-5);
        }
    }

    #[test]
    fn test_invalid_materials_rejected() {
        assert!(Dielectric::new(0.0).is_err());
        assert!(Dielectric::new(-1.5).is_err());
        assert!(Dielectric::new(Real::INFINITY).is_err());
        assert!(Lambertian::new(Color::new(Real::NAN, 0.0, 0.0)).is_err());
    }
}
