//! Fire effect: a pulsing emissive sphere or a particle flame
//!
//! Either way the effect has two states. It starts [`FireState::Active`] and
//! moves to [`FireState::Extinguished`] once; there is no way back.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::context::{EmitterId, FrameTime, TickId};
use crate::geometry::Rgb;
use crate::graph::{NodeId, SceneGraph};
use crate::particles::EmitterConfig;

pub const PULSE_AMPLITUDE: f32 = 0.2;
/// Radians per millisecond
pub const PULSE_FREQUENCY: f32 = 0.005;

/// Vertical scale of a pulsing fire mesh at `elapsed_ms`
pub fn pulse_scale(elapsed_ms: f64, amplitude: f32, frequency: f32) -> f32 {
    1.0 + amplitude * (elapsed_ms * frequency as f64).sin() as f32
}

/// Pulsing sphere parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseConfig {
    #[serde(default = "default_diameter")]
    pub diameter: f32,
    #[serde(default = "default_fire_color")]
    pub color: Rgb,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
}

fn default_diameter() -> f32 {
    0.8
}

fn default_fire_color() -> Rgb {
    [1.0, 0.5, 0.0]
}

fn default_amplitude() -> f32 {
    PULSE_AMPLITUDE
}

fn default_frequency() -> f32 {
    PULSE_FREQUENCY
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            diameter: default_diameter(),
            color: default_fire_color(),
            amplitude: default_amplitude(),
            frequency: default_frequency(),
        }
    }
}

/// Particle flame parameters: the emitter plus the small mesh it hangs off
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleFireConfig {
    #[serde(default = "default_anchor_size")]
    pub anchor_size: f32,
    #[serde(default = "default_anchor_color")]
    pub anchor_color: Rgb,
    #[serde(default)]
    pub emitter: EmitterConfig,
}

fn default_anchor_size() -> f32 {
    0.1
}

fn default_anchor_color() -> Rgb {
    [0.2, 0.1, 0.05]
}

impl Default for ParticleFireConfig {
    fn default() -> Self {
        Self {
            anchor_size: default_anchor_size(),
            anchor_color: default_anchor_color(),
            emitter: EmitterConfig::default(),
        }
    }
}

/// Which fire effect to build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum FireVariant {
    PulsingMesh(PulseConfig),
    ParticleSystem(ParticleFireConfig),
}

impl FireVariant {
    pub fn name(&self) -> &'static str {
        match self {
            FireVariant::PulsingMesh(_) => "pulsing_mesh",
            FireVariant::ParticleSystem(_) => "particle_system",
        }
    }
}

impl Default for FireVariant {
    fn default() -> Self {
        FireVariant::PulsingMesh(PulseConfig::default())
    }
}

/// Fire placement and variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireConfig {
    #[serde(default = "default_anchor")]
    pub anchor: Vec3,
    #[serde(flatten)]
    pub variant: FireVariant,
}

fn default_anchor() -> Vec3 {
    Vec3::new(0.0, 0.5, -3.0)
}

impl Default for FireConfig {
    fn default() -> Self {
        Self {
            anchor: default_anchor(),
            variant: FireVariant::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireState {
    #[default]
    Active,
    Extinguished,
}

/// Engine-side parts of a live fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireKind {
    Pulsing { mesh: NodeId, tick: TickId },
    Particles { anchor: NodeId, emitter: EmitterId },
}

/// Handle to the one fire in a scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireEffect {
    kind: FireKind,
    state: FireState,
}

impl FireEffect {
    pub(crate) fn new(kind: FireKind) -> Self {
        Self {
            kind,
            state: FireState::Active,
        }
    }

    pub fn state(&self) -> FireState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == FireState::Active
    }

    pub fn kind(&self) -> FireKind {
        self.kind
    }

    /// The node that carries the effect (sphere or anchor)
    pub fn node(&self) -> NodeId {
        match self.kind {
            FireKind::Pulsing { mesh, .. } => mesh,
            FireKind::Particles { anchor, .. } => anchor,
        }
    }

    /// Move to Extinguished. Returns false if it already was.
    pub(crate) fn mark_extinguished(&mut self) -> bool {
        if self.state == FireState::Extinguished {
            return false;
        }
        self.state = FireState::Extinguished;
        true
    }
}

/// Frame tick that drives a pulsing fire's vertical scale
#[derive(Debug, Clone, Copy)]
pub struct PulseTick {
    pub mesh: NodeId,
    pub amplitude: f32,
    pub frequency: f32,
}

impl crate::context::FrameTick for PulseTick {
    fn tick(&mut self, frame: &FrameTime, graph: &mut SceneGraph) {
        if let Some(node) = graph.get_mut(self.mesh) {
            node.pose.scale.y = pulse_scale(frame.elapsed_ms, self.amplitude, self.frequency);
        }
    }
}
