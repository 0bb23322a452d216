//! Scene graph: a flat arena of nodes with optional parent links

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{MaterialDesc, Pose, Shape};

/// Index of a node inside its [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// What a node is for; renderers use this to pick materials and pick behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Floor,
    Ceiling,
    Wall,
    Furniture,
    /// The pulsing fire mesh
    FireMesh,
    /// Small mesh a particle emitter is attached to
    FireAnchor,
    /// Root of the extinguisher composite (no geometry)
    Extinguisher,
    /// Body, nozzle or hose of the extinguisher
    ExtinguisherPart,
}

impl NodeRole {
    pub fn is_static(&self) -> bool {
        !matches!(self, NodeRole::FireMesh | NodeRole::FireAnchor)
    }
}

/// A single renderable node
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    pub role: NodeRole,
    pub shape: Shape,
    pub pose: Pose,
    pub material: MaterialDesc,
    pub parent: Option<NodeId>,
    /// Disabled nodes (and their children) are not drawn
    pub enabled: bool,
}

/// Arena of scene nodes, in creation order
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node and return its id
    pub fn add(
        &mut self,
        name: impl Into<String>,
        role: NodeRole,
        shape: Shape,
        pose: Pose,
        material: MaterialDesc,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            id,
            name: name.into(),
            role,
            shape,
            pose,
            material,
            parent: None,
            enabled: true,
        });
        id
    }

    /// Add a node whose pose is relative to `parent`
    pub fn add_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        role: NodeRole,
        shape: Shape,
        pose: Pose,
        material: MaterialDesc,
    ) -> NodeId {
        let id = self.add(name, role, shape, pose, material);
        self.nodes[id.0].parent = Some(parent);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter()
    }

    /// All nodes with the given role, in creation order
    pub fn with_role(&self, role: NodeRole) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(move |n| n.role == role)
    }

    pub fn children_of(&self, parent: NodeId) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(move |n| n.parent == Some(parent))
    }

    /// Show or hide a node. Unknown ids are ignored.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.enabled = enabled;
        }
    }

    /// A node is visible when it and every ancestor are enabled
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.nodes.get(cur.0) {
                Some(node) if node.enabled => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// World-space position of a node, following parent links
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        let mut point = Vec3::ZERO;
        let mut current = Some(id);
        while let Some(cur) = current {
            let Some(node) = self.nodes.get(cur.0) else {
                break;
            };
            point = node.pose.transform_point(point);
            current = node.parent;
        }
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> (SceneGraph, NodeId, NodeId) {
        let mut graph = SceneGraph::new();
        let root = graph.add(
            "extinguisher",
            NodeRole::Extinguisher,
            Shape::Empty,
            Pose::at(Vec3::new(2.0, 0.0, -3.0)),
            MaterialDesc::default(),
        );
        let body = graph.add_child(
            root,
            "extinguisher-body",
            NodeRole::ExtinguisherPart,
            Shape::Cylinder {
                height: 1.0,
                diameter: 0.3,
            },
            Pose::at(Vec3::new(0.0, 0.5, 0.0)),
            MaterialDesc::diffuse([1.0, 0.0, 0.0]),
        );
        (graph, root, body)
    }

    #[test]
    fn test_world_position_follows_parent() {
        let (graph, _, body) = sample_graph();
        let pos = graph.world_position(body);
        assert!((pos - Vec3::new(2.0, 0.5, -3.0)).length() < 1e-6);
    }

    #[test]
    fn test_visibility_inherits_from_parent() {
        let (mut graph, root, body) = sample_graph();
        assert!(graph.is_visible(body));
        graph.set_enabled(root, false);
        assert!(!graph.is_visible(body));
        assert!(graph.get(body).unwrap().enabled);
    }

    #[test]
    fn test_children_of() {
        let (graph, root, body) = sample_graph();
        let children: Vec<NodeId> = graph.children_of(root).map(|n| n.id).collect();
        assert_eq!(children, vec![body]);
        assert_eq!(graph.with_role(NodeRole::ExtinguisherPart).count(), 1);
    }
}
