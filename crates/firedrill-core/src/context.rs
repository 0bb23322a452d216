//! Per-scene state passed explicitly to every composer operation
//!
//! A [`SceneContext`] owns the scene graph, the per-frame tick registry, the
//! particle emitters, the overlay label and the viewport size. Several
//! contexts can live side by side in one process.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::feedback::{InstructionLabel, Notification};
use crate::graph::{NodeId, SceneGraph};
use crate::particles::ParticleEmitter;
use crate::xr::XrStatus;

/// Timing information for one redraw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Milliseconds since the render loop started
    pub elapsed_ms: f64,
    /// Milliseconds since the previous frame (0 on the first frame)
    pub delta_ms: f64,
    /// Frame counter, starting at 0
    pub index: u64,
}

/// Per-frame mutation callback
///
/// Ticks read the frame time and write to the graph. They are re-run on every
/// redraw; nothing they compute is cached between frames.
pub trait FrameTick: Send + Sync {
    fn tick(&mut self, frame: &FrameTime, graph: &mut SceneGraph);
}

impl<F> FrameTick for F
where
    F: FnMut(&FrameTime, &mut SceneGraph) + Send + Sync,
{
    fn tick(&mut self, frame: &FrameTime, graph: &mut SceneGraph) {
        self(frame, graph)
    }
}

/// Handle returned by [`TickRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickId(u64);

/// Ordered list of frame ticks
#[derive(Default)]
pub struct TickRegistry {
    ticks: Vec<(TickId, Box<dyn FrameTick>)>,
    next_id: u64,
}

impl TickRegistry {
    pub fn register(&mut self, tick: impl FrameTick + 'static) -> TickId {
        let id = TickId(self.next_id);
        self.next_id += 1;
        self.ticks.push((id, Box::new(tick)));
        id
    }

    /// Remove a tick; returns false if it was already gone
    pub fn unregister(&mut self, id: TickId) -> bool {
        let before = self.ticks.len();
        self.ticks.retain(|(tid, _)| *tid != id);
        self.ticks.len() != before
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    fn run(&mut self, frame: &FrameTime, graph: &mut SceneGraph) {
        for (_, tick) in self.ticks.iter_mut() {
            tick.tick(frame, graph);
        }
    }
}

impl std::fmt::Debug for TickRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickRegistry")
            .field("ticks", &self.ticks.len())
            .finish()
    }
}

/// Handle to a particle emitter stored in a [`SceneContext`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmitterId(pub usize);

/// Emitter plus the node it follows
#[derive(Debug, Clone)]
pub struct BoundEmitter {
    pub anchor: NodeId,
    pub emitter: ParticleEmitter,
}

/// Output size of the render surface, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height <= 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }
}

/// All mutable state of one scene
#[derive(Debug, Default)]
pub struct SceneContext {
    pub graph: SceneGraph,
    pub ticks: TickRegistry,
    emitters: Vec<BoundEmitter>,
    /// Overlay text, present only in the label variant
    pub label: Option<InstructionLabel>,
    /// Blocking notices raised but not yet shown by the host
    notifications: Vec<Notification>,
    viewport: Viewport,
    xr: XrStatus,
    last_frame: Option<FrameTime>,
}

impl SceneContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(crate) fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn xr_status(&self) -> &XrStatus {
        &self.xr
    }

    pub(crate) fn set_xr_status(&mut self, status: XrStatus) {
        self.xr = status;
    }

    pub fn add_emitter(&mut self, anchor: NodeId, emitter: ParticleEmitter) -> EmitterId {
        let id = EmitterId(self.emitters.len());
        self.emitters.push(BoundEmitter { anchor, emitter });
        id
    }

    pub fn emitter(&self, id: EmitterId) -> Option<&ParticleEmitter> {
        self.emitters.get(id.0).map(|b| &b.emitter)
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut ParticleEmitter> {
        self.emitters.get_mut(id.0).map(|b| &mut b.emitter)
    }

    pub fn emitters(&self) -> &[BoundEmitter] {
        &self.emitters
    }

    pub(crate) fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn pending_notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Take every notice raised since the last call
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn last_frame(&self) -> Option<FrameTime> {
        self.last_frame
    }

    /// Run one redraw worth of scene updates at `elapsed_ms`
    ///
    /// Ticks run first, in registration order, then every emitter is stepped
    /// at its anchor's current world position.
    pub fn advance(&mut self, elapsed_ms: f64) -> FrameTime {
        let frame = match self.last_frame {
            Some(prev) => FrameTime {
                elapsed_ms,
                delta_ms: (elapsed_ms - prev.elapsed_ms).max(0.0),
                index: prev.index + 1,
            },
            None => FrameTime {
                elapsed_ms,
                delta_ms: 0.0,
                index: 0,
            },
        };

        self.ticks.run(&frame, &mut self.graph);

        let dt_secs = (frame.delta_ms / 1000.0) as f32;
        for bound in self.emitters.iter_mut() {
            let origin = self.graph.world_position(bound.anchor);
            bound.emitter.update(dt_secs, origin);
        }

        if frame.index == 0 {
            debug!(ticks = self.ticks.len(), emitters = self.emitters.len(), "First frame");
        }

        self.last_frame = Some(frame);
        frame
    }
}
