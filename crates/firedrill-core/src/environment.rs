//! Static room geometry: floor, ceiling, walls and furniture

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{MaterialDesc, Shape};
use crate::graph::{NodeId, NodeRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Floor,
    Ceiling,
    Wall,
}

impl SurfaceKind {
    pub fn role(&self) -> NodeRole {
        match self {
            SurfaceKind::Floor => NodeRole::Floor,
            SurfaceKind::Ceiling => NodeRole::Ceiling,
            SurfaceKind::Wall => NodeRole::Wall,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            SurfaceKind::Floor => "floor",
            SurfaceKind::Ceiling => "ceiling",
            SurfaceKind::Wall => "wall",
        }
    }
}

/// One room surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub kind: SurfaceKind,
    /// Defaults to `<kind><index>`
    #[serde(default)]
    pub name: Option<String>,
    pub shape: Shape,
    #[serde(default)]
    pub position: Vec3,
    /// Euler XYZ, radians
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default)]
    pub material: MaterialDesc,
}

impl SurfaceConfig {
    pub fn new(kind: SurfaceKind, shape: Shape, position: Vec3) -> Self {
        Self {
            kind,
            name: None,
            shape,
            position,
            rotation: Vec3::ZERO,
            material: MaterialDesc::default(),
        }
    }

    pub fn rotated(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_material(mut self, material: MaterialDesc) -> Self {
        self.material = material;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub(crate) fn display_name(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}{}", self.kind.as_str(), index + 1))
    }
}

/// A piece of furniture built from one or more primitives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureConfig {
    pub name: String,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    pub parts: Vec<FurniturePart>,
}

/// Primitive inside a furniture item, relative to the item's origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurniturePart {
    pub shape: Shape,
    #[serde(default)]
    pub offset: Vec3,
    #[serde(default)]
    pub material: MaterialDesc,
}

/// Surfaces and furniture of a room
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub surfaces: Vec<SurfaceConfig>,
    #[serde(default)]
    pub furniture: Vec<FurnitureConfig>,
}

impl EnvironmentConfig {
    pub fn count(&self, kind: SurfaceKind) -> usize {
        self.surfaces.iter().filter(|s| s.kind == kind).count()
    }
}

/// Node ids of a built environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub floors: Vec<NodeId>,
    pub ceilings: Vec<NodeId>,
    pub walls: Vec<NodeId>,
    /// Root node of each furniture item
    pub furniture: Vec<NodeId>,
}

impl Environment {
    pub fn has_ceiling(&self) -> bool {
        !self.ceilings.is_empty()
    }

    pub fn surface_count(&self) -> usize {
        self.floors.len() + self.ceilings.len() + self.walls.len()
    }
}
