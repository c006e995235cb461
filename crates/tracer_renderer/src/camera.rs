//! Camera for ray generation.

use crate::Ray;
use thiserror::Error;
use tracer_math::{Interval, Real, Vec3};

/// Errors for degenerate camera setups.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CameraError {
    #[error("camera vectors must be finite")]
    NonFinite,

    #[error("horizontal and vertical spans are zero or parallel")]
    DegenerateViewport,

    #[error("image plane passes through the camera origin")]
    PlaneThroughOrigin,

    #[error("look-from and look-at points coincide")]
    CoincidentLookAt,

    #[error("up vector is parallel to the view direction")]
    ParallelUp,

    #[error("vertical field of view must be in (0, 180) degrees, got {0}")]
    InvalidFieldOfView(Real),

    #[error("aspect ratio must be finite and positive, got {0}")]
    InvalidAspect(Real),
}

/// Pinhole camera mapping normalized image coordinates to world rays.
///
/// `u` runs left to right and `v` bottom to top, both over [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
}

impl Camera {
    /// Create a camera from its image plane.
    pub fn new(
        origin: Vec3,
        lower_left_corner: Vec3,
        horizontal: Vec3,
        vertical: Vec3,
    ) -> Result<Self, CameraError> {
        if !(origin.is_finite()
            && lower_left_corner.is_finite()
            && horizontal.is_finite()
            && vertical.is_finite())
        {
            return Err(CameraError::NonFinite);
        }

        let plane_normal = horizontal.cross(vertical);
        let span = horizontal.length_squared() * vertical.length_squared();
        if span == 0.0 || plane_normal.length_squared() <= 1e-12 * span {
            return Err(CameraError::DegenerateViewport);
        }

        // Distance from the origin to the image plane along its normal
        let offset = (lower_left_corner - origin).dot(plane_normal.normalize());
        if offset.abs() <= 1e-6 * span.sqrt().sqrt() {
            return Err(CameraError::PlaneThroughOrigin);
        }

        Ok(Self {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
        })
    }

    /// Create a camera looking from `look_from` toward `look_at`.
    ///
    /// - `vup`: Rough up direction, need not be orthogonal to the view
    /// - `vfov`: Vertical field of view in degrees
    /// - `aspect`: Image width over height
    pub fn look_at(
        look_from: Vec3,
        look_at: Vec3,
        vup: Vec3,
        vfov: Real,
        aspect: Real,
    ) -> Result<Self, CameraError> {
        if !(look_from.is_finite() && look_at.is_finite() && vup.is_finite()) {
            return Err(CameraError::NonFinite);
        }
        if !Interval::new(0.0, 180.0).surrounds(vfov) {
            return Err(CameraError::InvalidFieldOfView(vfov));
        }
        if !(aspect.is_finite() && aspect > 0.0) {
            return Err(CameraError::InvalidAspect(aspect));
        }

        let w = (look_from - look_at).try_normalize().ok_or(CameraError::CoincidentLookAt)?;
        let u = vup.cross(w).try_normalize().ok_or(CameraError::ParallelUp)?;
        let v = w.cross(u);

        let half_height = (vfov.to_radians() / 2.0).tan();
        let half_width = aspect * half_height;

        Self::new(
            look_from,
            look_from - half_width * u - half_height * v - w,
            2.0 * half_width * u,
            2.0 * half_height * v,
        )
    }

    /// Generate the ray through image-plane coordinates (u, v).
    #[inline]
    pub fn get_ray(&self, u: Real, v: Real) -> Ray {
        Ray::new(
            self.origin,
            self.lower_left_corner + u * self.horizontal + v * self.vertical - self.origin,
        )
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn lower_left_corner(&self) -> Vec3 {
        self.lower_left_corner
    }

    pub fn horizontal(&self) -> Vec3 {
        self.horizontal
    }

    pub fn vertical(&self) -> Vec3 {
        self.vertical
    }
}

impl Default for Camera {
    /// Camera at the origin looking down -Z through a 4x2 plane one unit away.
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            lower_left_corner: Vec3::new(-2.0, -1.0, -1.0),
            horizontal: Vec3::new(4.0, 0.0, 0.0),
            vertical: Vec3::new(0.0, 2.0, 0.0),
        }
    }
}
