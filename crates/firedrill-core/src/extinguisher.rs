//! The clickable extinguisher and its pick subscriptions

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::fire::FireState;
use crate::geometry::{Pose, Rgb};
use crate::graph::NodeId;

/// Hose running from the top of the body down to the nozzle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoseConfig {
    /// Polyline relative to the extinguisher root
    pub path: Vec<Vec3>,
    #[serde(default = "default_hose_radius")]
    pub radius: f32,
    #[serde(default = "default_hose_color")]
    pub color: Rgb,
}

fn default_hose_radius() -> f32 {
    0.02
}

fn default_hose_color() -> Rgb {
    [0.1, 0.1, 0.1]
}

/// Extinguisher geometry; positions of parts are relative to `position`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtinguisherConfig {
    /// Floor point under the body
    #[serde(default = "default_position")]
    pub position: Vec3,
    #[serde(default = "default_body_height")]
    pub body_height: f32,
    #[serde(default = "default_body_diameter")]
    pub body_diameter: f32,
    #[serde(default = "default_body_color")]
    pub body_color: Rgb,
    /// Nozzle on top of the body; `None` gives a bare cylinder
    #[serde(default)]
    pub nozzle: Option<NozzleConfig>,
    #[serde(default)]
    pub hose: Option<HoseConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NozzleConfig {
    #[serde(default = "default_nozzle_height")]
    pub height: f32,
    #[serde(default = "default_nozzle_diameter")]
    pub diameter: f32,
    #[serde(default = "default_nozzle_color")]
    pub color: Rgb,
}

fn default_position() -> Vec3 {
    Vec3::new(2.0, 0.0, -3.0)
}

fn default_body_height() -> f32 {
    1.0
}

fn default_body_diameter() -> f32 {
    0.3
}

fn default_body_color() -> Rgb {
    [1.0, 0.0, 0.0]
}

fn default_nozzle_height() -> f32 {
    0.15
}

fn default_nozzle_diameter() -> f32 {
    0.08
}

fn default_nozzle_color() -> Rgb {
    [0.15, 0.15, 0.15]
}

impl Default for NozzleConfig {
    fn default() -> Self {
        Self {
            height: default_nozzle_height(),
            diameter: default_nozzle_diameter(),
            color: default_nozzle_color(),
        }
    }
}

impl Default for ExtinguisherConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            body_height: default_body_height(),
            body_diameter: default_body_diameter(),
            body_color: default_body_color(),
            nozzle: None,
            hose: None,
        }
    }
}

impl ExtinguisherConfig {
    pub fn root_pose(&self) -> Pose {
        Pose::at(self.position)
    }

    /// Body center sits half a body above the root
    pub fn body_offset(&self) -> Vec3 {
        Vec3::new(0.0, self.body_height * 0.5, 0.0)
    }

    pub fn nozzle_offset(&self, nozzle: &NozzleConfig) -> Vec3 {
        Vec3::new(0.0, self.body_height + nozzle.height * 0.5, 0.0)
    }
}

/// Delivered to `on_pick` subscribers for every click on the extinguisher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickEvent {
    /// Part that was hit (body, nozzle, hose or the root)
    pub node: NodeId,
    /// 1 for the first click, 2 for the second, ...
    pub pick_count: u32,
    /// Fire state before this pick was handled
    pub fire_state: FireState,
}

type PickHandler = Box<dyn FnMut(&PickEvent) + Send + Sync>;

/// Handle to the extinguisher composite
pub struct Extinguisher {
    root: NodeId,
    parts: Vec<NodeId>,
    handlers: Vec<PickHandler>,
    picks: u32,
}

impl Extinguisher {
    pub(crate) fn new(root: NodeId, parts: Vec<NodeId>) -> Self {
        Self {
            root,
            parts,
            handlers: Vec::new(),
            picks: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn parts(&self) -> &[NodeId] {
        &self.parts
    }

    /// True if `node` is the root or one of its parts
    pub fn contains(&self, node: NodeId) -> bool {
        node == self.root || self.parts.contains(&node)
    }

    pub fn pick_count(&self) -> u32 {
        self.picks
    }

    /// Subscribe to clicks on the extinguisher
    pub fn on_pick(&mut self, handler: impl FnMut(&PickEvent) + Send + Sync + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Record a click and notify subscribers
    pub(crate) fn dispatch(&mut self, node: NodeId, fire_state: FireState) -> PickEvent {
        self.picks += 1;
        let event = PickEvent {
            node,
            pick_count: self.picks,
            fire_state,
        };
        for handler in self.handlers.iter_mut() {
            handler(&event);
        }
        event
    }
}

impl std::fmt::Debug for Extinguisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extinguisher")
            .field("root", &self.root)
            .field("parts", &self.parts)
            .field("handlers", &self.handlers.len())
            .field("picks", &self.picks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_dispatch_notifies_subscribers() {
        let mut ext = Extinguisher::new(NodeId(3), vec![NodeId(4), NodeId(5)]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        ext.on_pick(move |event| sink.lock().unwrap().push(*event));

        ext.dispatch(NodeId(4), FireState::Active);
        ext.dispatch(NodeId(5), FireState::Extinguished);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].pick_count, 1);
        assert_eq!(seen[1].node, NodeId(5));
        assert_eq!(seen[1].fire_state, FireState::Extinguished);
        assert_eq!(ext.pick_count(), 2);
    }

    #[test]
    fn test_contains_parts() {
        let ext = Extinguisher::new(NodeId(3), vec![NodeId(4)]);
        assert!(ext.contains(NodeId(3)));
        assert!(ext.contains(NodeId(4)));
        assert!(!ext.contains(NodeId(0)));
    }

    #[test]
    fn test_default_layout_matches_single_cylinder() {
        let cfg = ExtinguisherConfig::default();
        assert_eq!(cfg.body_offset(), Vec3::new(0.0, 0.5, 0.0));
        assert!(cfg.nozzle.is_none());
        assert!(cfg.hose.is_none());
    }
}
