//! Scene construction and JSON scene descriptions.
//!
//! A [`SceneDescription`] is plain data that can be loaded from JSON.
//! [`SceneDescription::build`] validates it and produces the immutable
//! [`Scene`] handed to the renderer.
//!
//! # Example
//!
//! ```json
//! {
//!   "camera": { "type": "look_at", "look_from": [0, 1, 3], "look_at": [0, 0, -1], "vfov": 40 },
//!   "spheres": [
//!     { "center": [0, -100.5, -1], "radius": 100,
//!       "material": { "type": "lambertian", "albedo": [0.8, 0.8, 0.0] } },
//!     { "center": [0, 0, -1], "radius": 0.5,
//!       "material": { "type": "dielectric", "refractive_index": 1.5 } }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracer_math::{Real, Vec3};

use crate::camera::{Camera, CameraError};
use crate::{Color, Dielectric, Hittable, HittableList, Lambertian, Material, Metal, Sphere};

/// Errors raised while building a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("sphere radius must be finite and positive, got {0}")]
    InvalidRadius(Real),

    #[error("sphere center must be finite")]
    InvalidCenter,

    #[error("albedo must be finite")]
    InvalidAlbedo,

    #[error("metal fuzz must be a number, got {0}")]
    InvalidFuzz(Real),

    #[error("refractive index must be finite and positive, got {0}")]
    InvalidRefractiveIndex(Real),

    #[error("sphere {index}: {source}")]
    Sphere {
        index: usize,
        #[source]
        source: Box<SceneError>,
    },

    #[error("camera: {0}")]
    Camera(#[from] CameraError),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// A validated scene ready to render.
#[derive(Debug, Clone)]
pub struct Scene {
    pub world: Hittable,
    pub camera: Camera,
}

/// Material parameters as written in a scene file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialDescription {
    Lambertian { albedo: Color },
    Metal { albedo: Color, fuzz: Real },
    Dielectric { refractive_index: Real },
}

impl MaterialDescription {
    pub fn build(&self) -> SceneResult<Material> {
        Ok(match *self {
            MaterialDescription::Lambertian { albedo } => Lambertian::new(albedo)?.into(),
            MaterialDescription::Metal { albedo, fuzz } => Metal::new(albedo, fuzz)?.into(),
            MaterialDescription::Dielectric { refractive_index } => {
                Dielectric::new(refractive_index)?.into()
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SphereDescription {
    pub center: Vec3,
    pub radius: Real,
    pub material: MaterialDescription,
}

/// Camera placement as written in a scene file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraDescription {
    /// The fixed camera at the origin looking down -Z.
    #[default]
    Default,
    /// Explicit image plane.
    Viewport {
        origin: Vec3,
        lower_left_corner: Vec3,
        horizontal: Vec3,
        vertical: Vec3,
    },
    /// Look-at camera. The aspect ratio defaults to the image's.
    LookAt {
        look_from: Vec3,
        look_at: Vec3,
        #[serde(default = "default_vup")]
        vup: Vec3,
        vfov: Real,
        #[serde(default)]
        aspect: Option<Real>,
    },
}

fn default_vup() -> Vec3 {
    Vec3::Y
}

impl CameraDescription {
    /// Build the camera, using `image_aspect` when none is given.
    pub fn build(&self, image_aspect: Real) -> Result<Camera, CameraError> {
        match *self {
            CameraDescription::Default => Ok(Camera::default()),
            CameraDescription::Viewport {
                origin,
                lower_left_corner,
                horizontal,
                vertical,
            } => Camera::new(origin, lower_left_corner, horizontal, vertical),
            CameraDescription::LookAt {
                look_from,
                look_at,
                vup,
                vfov,
                aspect,
            } => Camera::look_at(look_from, look_at, vup, vfov, aspect.unwrap_or(image_aspect)),
        }
    }
}

/// Serializable description of a whole scene.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub camera: CameraDescription,
    #[serde(default)]
    pub spheres: Vec<SphereDescription>,
}

impl SceneDescription {
    /// The classic four-sphere scene: a matte red ball on a yellow ground
    /// between a fuzzy gold ball and a rough silver one.
    pub fn builtin() -> Self {
        let sphere = |center: Vec3, radius: Real, material| SphereDescription {
            center,
            radius,
            material,
        };

        Self {
            camera: CameraDescription::Default,
            spheres: vec![
                sphere(
                    Vec3::new(0.0, 0.0, -1.0),
                    0.5,
                    MaterialDescription::Lambertian {
                        albedo: Color::new(0.8, 0.3, 0.3),
                    },
                ),
                sphere(
                    Vec3::new(0.0, -100.5, -1.0),
                    100.0,
                    MaterialDescription::Lambertian {
                        albedo: Color::new(0.8, 0.8, 0.0),
                    },
                ),
                sphere(
                    Vec3::new(1.0, 0.0, -1.0),
                    0.5,
                    MaterialDescription::Metal {
                        albedo: Color::new(0.8, 0.6, 0.2),
                        fuzz: 0.2,
                    },
                ),
                sphere(
                    Vec3::new(-1.0, 0.0, -1.0),
                    0.5,
                    MaterialDescription::Metal {
                        albedo: Color::new(0.8, 0.8, 0.8),
                        fuzz: 1.0,
                    },
                ),
            ],
        }
    }

    /// Parse a scene from JSON text.
    pub fn from_json(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scene from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> SceneResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize back to pretty-printed JSON.
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate every sphere and the camera.
    pub fn build(&self, image_aspect: Real) -> SceneResult<Scene> {
        let mut world = HittableList::new();

        for (index, desc) in self.spheres.iter().enumerate() {
            let sphere = desc
                .material
                .build()
                .and_then(|material| Sphere::new(desc.center, desc.radius, material))
                .map_err(|source| SceneError::Sphere {
                    index,
                    source: Box::new(source),
                })?;
            world.add(sphere);
        }

        let camera = self.camera.build(image_aspect)?;
        log::debug!("Built scene with {} spheres", world.len());

        Ok(Scene {
            world: world.into(),
            camera,
        })
    }
}
