//! Tracer math - scalar, vector, ray and interval types.
//!
//! Vectors come straight from glam. Enabling the `f64` feature switches
//! [`Real`] and [`Vec3`] to double precision for the whole tracer.

// Re-export glam for convenience
pub use glam;

#[cfg(not(feature = "f64"))]
mod precision {
    /// Scalar type used throughout the tracer.
    pub type Real = f32;
    pub use glam::Vec3;
}

#[cfg(feature = "f64")]
mod precision {
    /// Scalar type used throughout the tracer.
    pub type Real = f64;
    pub use glam::DVec3 as Vec3;
}

pub use precision::{Real, Vec3};

mod interval;
mod ray;
pub use interval::Interval;
pub use ray::Ray;
