//! Shape, material and pose descriptors for scene nodes
//!
//! These are plain data handed to the rendering engine. Nothing here is
//! validated: a zero-sized box is passed through and rendered degenerate.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// RGB color with components in 0.0-1.0
pub type Rgb = [f32; 3];

/// RGBA color with components in 0.0-1.0
pub type Rgba = [f32; 4];

/// Primitive mesh descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Axis-aligned box: width (x), height (y), depth (z)
    Box { width: f32, height: f32, depth: f32 },
    Sphere { diameter: f32 },
    /// Cylinder along the local Y axis
    Cylinder { height: f32, diameter: f32 },
    /// Flat ground in the X-Z plane
    Ground { width: f32, depth: f32 },
    /// Vertical plane facing +Z before rotation
    Plane { width: f32, height: f32 },
    /// Tube swept along a polyline
    Tube { path: Vec<Vec3>, radius: f32 },
    /// Transform-only node with no geometry
    Empty,
}

impl Shape {
    pub fn cube(size: f32) -> Self {
        Shape::Box {
            width: size,
            height: size,
            depth: size,
        }
    }

    /// Short name used in logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Box { .. } => "box",
            Shape::Sphere { .. } => "sphere",
            Shape::Cylinder { .. } => "cylinder",
            Shape::Ground { .. } => "ground",
            Shape::Plane { .. } => "plane",
            Shape::Tube { .. } => "tube",
            Shape::Empty => "empty",
        }
    }
}

/// How a surface blends with what is behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Opaque,
    /// Standard alpha blending
    Alpha,
    /// Additive blending, used for flames
    Add,
}

/// Flat material: a diffuse color, an optional emissive color, or a texture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    #[serde(default = "default_diffuse")]
    pub diffuse: Rgb,
    #[serde(default)]
    pub emissive: Option<Rgb>,
    /// Texture path or URL, resolved by the engine's asset loader
    #[serde(default)]
    pub texture: Option<String>,
    /// Skip lighting entirely
    #[serde(default)]
    pub unlit: bool,
}

fn default_diffuse() -> Rgb {
    [1.0, 1.0, 1.0]
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            diffuse: default_diffuse(),
            emissive: None,
            texture: None,
            unlit: false,
        }
    }
}

impl MaterialDesc {
    pub fn diffuse(color: Rgb) -> Self {
        Self {
            diffuse: color,
            ..Default::default()
        }
    }

    /// Self-lit material; the diffuse term is black so only the emissive color shows
    pub fn emissive(color: Rgb) -> Self {
        Self {
            diffuse: [0.0, 0.0, 0.0],
            emissive: Some(color),
            ..Default::default()
        }
    }

    pub fn textured(path: impl Into<String>) -> Self {
        Self {
            texture: Some(path.into()),
            ..Default::default()
        }
    }
}

/// Local transform of a node: translation, Euler rotation (radians, XYZ) and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Map a point from this pose's local space into its parent's space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.quat() * (point * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_serde_tag() {
        let shape: Shape = toml::from_str("kind = \"box\"\nwidth = 10.0\nheight = 3.0\ndepth = 0.1").unwrap();
        assert_eq!(
            shape,
            Shape::Box {
                width: 10.0,
                height: 3.0,
                depth: 0.1
            }
        );
        assert_eq!(shape.kind_name(), "box");
    }

    #[test]
    fn test_pose_transform_point() {
        let pose = Pose::at(Vec3::new(1.0, 0.0, 0.0))
            .with_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        let p = pose.transform_point(Vec3::new(0.0, 0.0, 1.0));
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_emissive_material_has_black_diffuse() {
        let mat = MaterialDesc::emissive([1.0, 0.5, 0.0]);
        assert_eq!(mat.diffuse, [0.0, 0.0, 0.0]);
        assert_eq!(mat.emissive, Some([1.0, 0.5, 0.0]));
    }
}
