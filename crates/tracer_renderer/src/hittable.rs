//! Hittable scene graph and HitRecord for ray-object intersection.

use std::sync::Arc;

use crate::{Material, Ray, Sphere};
use tracer_math::{Interval, Real, Vec3};

/// Record of a ray-object intersection.
///
/// Borrowed from the scene for the duration of one intersection test.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: Real,
    /// Point of intersection
    pub p: Vec3,
    /// Outward unit normal. Not flipped for rays hitting from inside.
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
}

/// Anything a ray can intersect.
#[derive(Debug, Clone)]
pub enum Hittable {
    Sphere(Sphere),
    List(HittableList),
}

impl Hittable {
    /// Find the nearest intersection strictly inside `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            Hittable::Sphere(sphere) => sphere.hit(ray, ray_t),
            Hittable::List(list) => list.hit(ray, ray_t),
        }
    }
}

impl From<Sphere> for Hittable {
    fn from(sphere: Sphere) -> Self {
        Hittable::Sphere(sphere)
    }
}

impl From<HittableList> for Hittable {
    fn from(list: HittableList) -> Self {
        Hittable::List(list)
    }
}

/// A list of hittable objects.
///
/// Children are shared, so the same geometry can appear in several lists.
#[derive(Debug, Clone, Default)]
pub struct HittableList {
    objects: Vec<Arc<Hittable>>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Hittable>) {
        self.objects.push(Arc::new(object.into()));
    }

    /// Add an object that is also referenced elsewhere.
    pub fn add_shared(&mut self, object: Arc<Hittable>) {
        self.objects.push(object);
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Nearest hit over all children.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for object in &self.objects {
            // Only accept hits closer than the best so far
            let range = match &closest {
                Some(rec) => ray_t.with_max(rec.t),
                None => ray_t,
            };
            if let Some(rec) = object.hit(ray, range) {
                closest = Some(rec);
            }
        }

        closest
    }
}

impl<H: Into<Hittable>> FromIterator<H> for HittableList {
    fn from_iter<I: IntoIterator<Item = H>>(iter: I) -> Self {
        let mut list = HittableList::new();
        for object in iter {
            list.add(object);
        }
        list
    }
}
