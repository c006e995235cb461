//! Sphere primitive for ray tracing.

use crate::{hittable::HitRecord, scene::SceneError, Material, Ray};
use tracer_math::{Interval, Real, Vec3};

/// A sphere primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: Real,
    material: Material,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// The radius must be finite and positive.
    pub fn new(center: Vec3, radius: Real, material: impl Into<Material>) -> Result<Self, SceneError> {
        if !center.is_finite() {
            return Err(SceneError::InvalidCenter);
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SceneError::InvalidRadius(radius));
        }

        Ok(Self {
            center,
            radius,
            material: material.into(),
        })
    }

    /// Intersect a ray with the sphere, nearest root first.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().dot(ray.direction());
        let b = oc.dot(ray.direction());
        let c = oc.dot(oc) - self.radius * self.radius;

        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (-b - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (-b + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let p = ray.point_at(root);
        Some(HitRecord {
            t: root,
            p,
            normal: (p - self.center) / self.radius,
            material: &self.material,
        })
    }
}
