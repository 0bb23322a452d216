//! Scene assembly and the pick-to-extinguish interaction
//!
//! [`SceneComposer`] builds the room, the fire and the extinguisher into a
//! [`SceneContext`] and owns the handles to them. It is the only place the
//! fire changes state, and the only way in is a pick on the extinguisher.

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::config::SceneConfig;
use crate::context::{SceneContext, Viewport};
use crate::environment::{Environment, EnvironmentConfig, SurfaceKind};
use crate::extinguisher::{Extinguisher, ExtinguisherConfig, PickEvent};
use crate::feedback::{FeedbackConfig, InstructionLabel, Notification};
use crate::fire::{FireEffect, FireKind, FireState, FireVariant, PulseTick};
use crate::geometry::{MaterialDesc, Pose, Shape};
use crate::graph::{NodeId, NodeRole};
use crate::particles::ParticleEmitter;
use crate::render_loop::RenderSurface;
use crate::xr::{XrError, XrPlatform, XrSessionInfo, XrSessionOptions, XrStatus};

/// Owner of the fire and extinguisher handles for one scene
#[derive(Debug, Default)]
pub struct SceneComposer {
    environment: Environment,
    fire: Option<FireEffect>,
    extinguisher: Option<Extinguisher>,
    /// Message raised on extinguish when there is no overlay label
    notice: Option<String>,
}

impl SceneComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build everything a config describes: feedback, room, fire, extinguisher
    ///
    /// The XR request is not made here; it is async and the caller decides
    /// how to drive it (see [`SceneComposer::request_immersive_session`]).
    pub fn compose(config: &SceneConfig, ctx: &mut SceneContext) -> Self {
        let mut composer = Self::new();
        composer.set_feedback(ctx, &config.feedback);
        composer.build_environment(ctx, &config.environment);
        composer.spawn_fire_effect(ctx, &config.fire.variant, config.fire.anchor);
        composer.spawn_extinguisher(ctx, &config.extinguisher);
        info!(
            scene = %config.name,
            nodes = ctx.graph.len(),
            fire = config.fire.variant.name(),
            xr = config.xr.is_some(),
            "Scene composed"
        );
        composer
    }

    /// Install the overlay label, or remember the notice to raise later
    pub fn set_feedback(&mut self, ctx: &mut SceneContext, feedback: &FeedbackConfig) {
        match feedback {
            FeedbackConfig::Label(label) => {
                ctx.label = Some(InstructionLabel::new(label));
                self.notice = None;
            }
            FeedbackConfig::Notification { message } => {
                ctx.label = None;
                self.notice = Some(message.clone());
            }
        }
    }

    /// Create one static node per surface and per furniture item
    ///
    /// Dimensions are taken as given; a zero-sized wall is still a wall.
    pub fn build_environment(
        &mut self,
        ctx: &mut SceneContext,
        config: &EnvironmentConfig,
    ) -> &Environment {
        let mut env = Environment::default();

        for surface in &config.surfaces {
            let bucket = match surface.kind {
                SurfaceKind::Floor => &mut env.floors,
                SurfaceKind::Ceiling => &mut env.ceilings,
                SurfaceKind::Wall => &mut env.walls,
            };
            let id = ctx.graph.add(
                surface.display_name(bucket.len()),
                surface.kind.role(),
                surface.shape.clone(),
                Pose::at(surface.position).with_rotation(surface.rotation),
                surface.material.clone(),
            );
            bucket.push(id);
        }

        for item in &config.furniture {
            let root = ctx.graph.add(
                item.name.clone(),
                NodeRole::Furniture,
                Shape::Empty,
                Pose::at(item.position).with_rotation(item.rotation),
                MaterialDesc::default(),
            );
            for (i, part) in item.parts.iter().enumerate() {
                ctx.graph.add_child(
                    root,
                    format!("{}-{}", item.name, i),
                    NodeRole::Furniture,
                    part.shape.clone(),
                    Pose::at(part.offset),
                    part.material.clone(),
                );
            }
            env.furniture.push(root);
        }

        info!(
            floors = env.floors.len(),
            ceilings = env.ceilings.len(),
            walls = env.walls.len(),
            furniture = env.furniture.len(),
            "Environment built"
        );

        self.environment.floors.extend(env.floors);
        self.environment.ceilings.extend(env.ceilings);
        self.environment.walls.extend(env.walls);
        self.environment.furniture.extend(env.furniture);
        &self.environment
    }

    /// Create the scene's fire at `anchor`
    ///
    /// A scene has one fire. Asking again returns the existing one untouched.
    pub fn spawn_fire_effect(
        &mut self,
        ctx: &mut SceneContext,
        variant: &FireVariant,
        anchor: Vec3,
    ) -> &FireEffect {
        if self.fire.is_some() {
            warn!(variant = variant.name(), "Fire effect already spawned, ignoring");
        }
        self.fire.get_or_insert_with(|| {
            let kind = match variant {
                FireVariant::PulsingMesh(pulse) => {
                    let mesh = ctx.graph.add(
                        "fire",
                        NodeRole::FireMesh,
                        Shape::Sphere {
                            diameter: pulse.diameter,
                        },
                        Pose::at(anchor),
                        MaterialDesc::emissive(pulse.color),
                    );
                    let tick = ctx.ticks.register(PulseTick {
                        mesh,
                        amplitude: pulse.amplitude,
                        frequency: pulse.frequency,
                    });
                    FireKind::Pulsing { mesh, tick }
                }
                FireVariant::ParticleSystem(particles) => {
                    let anchor_node = ctx.graph.add(
                        "fire-anchor",
                        NodeRole::FireAnchor,
                        Shape::cube(particles.anchor_size),
                        Pose::at(anchor),
                        MaterialDesc::diffuse(particles.anchor_color),
                    );
                    let mut emitter = ParticleEmitter::new(particles.emitter.clone());
                    emitter.start();
                    let emitter = ctx.add_emitter(anchor_node, emitter);
                    FireKind::Particles {
                        anchor: anchor_node,
                        emitter,
                    }
                }
            };
            info!(variant = variant.name(), ?anchor, "Fire spawned");
            FireEffect::new(kind)
        })
    }

    /// Create the extinguisher composite
    ///
    /// Clicks reach it through [`SceneComposer::pick`]. A second call returns
    /// the existing extinguisher.
    pub fn spawn_extinguisher(
        &mut self,
        ctx: &mut SceneContext,
        config: &ExtinguisherConfig,
    ) -> &Extinguisher {
        if self.extinguisher.is_some() {
            warn!("Extinguisher already spawned, ignoring");
        }
        self.extinguisher.get_or_insert_with(|| {
            let root = ctx.graph.add(
                "extinguisher",
                NodeRole::Extinguisher,
                Shape::Empty,
                config.root_pose(),
                MaterialDesc::default(),
            );
            let mut parts = vec![ctx.graph.add_child(
                root,
                "extinguisher-body",
                NodeRole::ExtinguisherPart,
                Shape::Cylinder {
                    height: config.body_height,
                    diameter: config.body_diameter,
                },
                Pose::at(config.body_offset()),
                MaterialDesc::diffuse(config.body_color),
            )];
            if let Some(nozzle) = &config.nozzle {
                parts.push(ctx.graph.add_child(
                    root,
                    "extinguisher-nozzle",
                    NodeRole::ExtinguisherPart,
                    Shape::Cylinder {
                        height: nozzle.height,
                        diameter: nozzle.diameter,
                    },
                    Pose::at(config.nozzle_offset(nozzle)),
                    MaterialDesc::diffuse(nozzle.color),
                ));
            }
            if let Some(hose) = &config.hose {
                parts.push(ctx.graph.add_child(
                    root,
                    "extinguisher-hose",
                    NodeRole::ExtinguisherPart,
                    Shape::Tube {
                        path: hose.path.clone(),
                        radius: hose.radius,
                    },
                    Pose::default(),
                    MaterialDesc::diffuse(hose.color),
                ));
            }
            info!(position = ?config.position, parts = parts.len(), "Extinguisher spawned");
            Extinguisher::new(root, parts)
        })
    }

    /// Subscribe to extinguisher clicks. Returns false if there is no extinguisher yet.
    pub fn on_pick(&mut self, handler: impl FnMut(&PickEvent) + Send + Sync + 'static) -> bool {
        match self.extinguisher.as_mut() {
            Some(ext) => {
                ext.on_pick(handler);
                true
            }
            None => false,
        }
    }

    /// Deliver a click on `node`
    ///
    /// Returns `None` when the node is not part of the extinguisher. The
    /// first click puts the fire out; later clicks are still reported to
    /// subscribers but change nothing.
    pub fn pick(&mut self, ctx: &mut SceneContext, node: NodeId) -> Option<PickEvent> {
        let ext = self.extinguisher.as_mut()?;
        if !ext.contains(node) {
            return None;
        }
        let state = self.fire.as_ref().map(|f| f.state()).unwrap_or_default();
        let event = ext.dispatch(node, state);
        info!(%node, pick_count = event.pick_count, "Extinguisher picked");

        if state == FireState::Active {
            self.extinguish(ctx);
        } else {
            debug!(pick_count = event.pick_count, "Fire already out, pick ignored");
        }
        Some(event)
    }

    /// Put the fire out and tell the user
    ///
    /// Only reachable through [`SceneComposer::pick`]. Returns false if the
    /// fire was already out (or never spawned).
    pub(crate) fn extinguish(&mut self, ctx: &mut SceneContext) -> bool {
        let Some(fire) = self.fire.as_mut() else {
            return false;
        };
        if !fire.mark_extinguished() {
            return false;
        }

        match fire.kind() {
            FireKind::Pulsing { mesh, .. } => ctx.graph.set_enabled(mesh, false),
            FireKind::Particles { anchor, emitter } => {
                if let Some(emitter) = ctx.emitter_mut(emitter) {
                    emitter.stop();
                }
                ctx.graph.set_enabled(anchor, false);
            }
        }

        if let Some(label) = ctx.label.as_mut() {
            label.confirm();
        } else if let Some(message) = &self.notice {
            ctx.push_notification(Notification {
                message: message.clone(),
            });
        }

        info!(node = %fire.node(), "Fire extinguished");
        true
    }

    /// Mark an XR request as in flight
    ///
    /// Returns false (and changes nothing) if a request was already made; a
    /// scene asks at most once.
    pub fn begin_immersive_session(
        &self,
        ctx: &mut SceneContext,
        options: &XrSessionOptions,
    ) -> bool {
        if !matches!(ctx.xr_status(), XrStatus::NotRequested) {
            warn!("Immersive session already requested, ignoring");
            return false;
        }
        info!(
            mode = options.session_mode.as_str(),
            reference_space = options.reference_space_type.as_str(),
            "Requesting immersive session"
        );
        ctx.set_xr_status(XrStatus::Pending(options.clone()));
        true
    }

    /// Record what the platform answered; true if the scene went immersive
    pub fn complete_immersive_session(
        &self,
        ctx: &mut SceneContext,
        result: Result<XrSessionInfo, XrError>,
    ) -> bool {
        match result {
            Ok(info) => {
                info!(
                    mode = info.mode.as_str(),
                    features = ?info.enabled_features,
                    "Immersive session started"
                );
                ctx.set_xr_status(XrStatus::Immersive(info));
                true
            }
            Err(err) => {
                warn!(error = %err, "Immersive session unavailable, staying on canvas");
                ctx.set_xr_status(XrStatus::Fallback(err));
                false
            }
        }
    }

    /// Ask `platform` for an immersive session and record the outcome
    ///
    /// Never fails: a denial leaves the scene in ordinary interactive mode.
    pub async fn request_immersive_session<P: XrPlatform>(
        &self,
        ctx: &mut SceneContext,
        platform: &P,
        options: &XrSessionOptions,
    ) -> XrStatus {
        if self.begin_immersive_session(ctx, options) {
            let result = platform.request_session(options).await;
            self.complete_immersive_session(ctx, result);
        }
        ctx.xr_status().clone()
    }

    /// Tell the surface about a new output size and remember it
    ///
    /// Touches nothing but the viewport; safe to call any number of times.
    pub fn handle_resize(
        &self,
        ctx: &mut SceneContext,
        surface: &mut dyn RenderSurface,
        viewport: Viewport,
    ) {
        debug!(width = viewport.width, height = viewport.height, "Resize");
        surface.resize(viewport);
        ctx.set_viewport(viewport);
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn fire(&self) -> Option<&FireEffect> {
        self.fire.as_ref()
    }

    pub fn fire_state(&self) -> Option<FireState> {
        self.fire.as_ref().map(|f| f.state())
    }

    pub fn extinguisher(&self) -> Option<&Extinguisher> {
        self.extinguisher.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenePreset;
    use crate::context::FrameTime;
    use crate::environment::SurfaceConfig;
    use crate::feedback::{DEFAULT_CONFIRMATION, DEFAULT_PROMPT, GREEN, WHITE};
    use crate::fire::pulse_scale;
    use crate::render_loop::{run_render_loop, FixedStepClock};
    use crate::xr::{NoXr, ReferenceSpaceType, SessionMode};
    use std::f32::consts::FRAC_PI_2;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingSurface {
        frames: u64,
        sizes: Vec<Viewport>,
    }

    impl RenderSurface for RecordingSurface {
        fn render(&mut self, _frame: &FrameTime, _ctx: &SceneContext) {
            self.frames += 1;
        }

        fn resize(&mut self, viewport: Viewport) {
            self.sizes.push(viewport);
        }
    }

    struct GrantingXr;

    impl XrPlatform for GrantingXr {
        async fn request_session(
            &self,
            options: &XrSessionOptions,
        ) -> Result<XrSessionInfo, XrError> {
            Ok(XrSessionInfo {
                mode: options.session_mode,
                reference_space: options.reference_space_type,
                enabled_features: options.optional_features.resolve(),
            })
        }
    }

    fn body(composer: &SceneComposer) -> NodeId {
        composer.extinguisher().unwrap().parts()[0]
    }

    #[test]
    fn test_pulsing_fire_scale_follows_time() {
        let mut ctx = SceneContext::new();
        let composer = SceneComposer::compose(&ScenePreset::Classroom.config(), &mut ctx);
        let mesh = composer.fire().unwrap().node();

        for t in [0.0, 16.0, 250.0, 1000.0, 4321.0] {
            ctx.advance(t);
            let scale = ctx.graph.get(mesh).unwrap().pose.scale.y;
            let expected = 1.0 + 0.2 * ((t as f32) * 0.005).sin();
            assert!((scale - expected).abs() < 1e-4);
            assert_eq!(scale, pulse_scale(t, 0.2, 0.005));
        }
    }

    #[test]
    fn test_one_pick_extinguishes_second_is_noop() {
        let mut ctx = SceneContext::new();
        let mut composer = SceneComposer::compose(&ScenePreset::Classroom.config(), &mut ctx);
        let target = body(&composer);

        assert_eq!(composer.fire_state(), Some(FireState::Active));
        let label = ctx.label.as_ref().unwrap();
        assert_eq!(label.text, DEFAULT_PROMPT);
        assert_eq!(label.color, WHITE);

        let first = composer.pick(&mut ctx, target).unwrap();
        assert_eq!(first.fire_state, FireState::Active);
        assert_eq!(composer.fire_state(), Some(FireState::Extinguished));
        let label = ctx.label.clone().unwrap();
        assert_eq!(label.text, DEFAULT_CONFIRMATION);
        assert_eq!(label.color, GREEN);
        assert!(!ctx.graph.is_visible(composer.fire().unwrap().node()));

        let second = composer.pick(&mut ctx, target).unwrap();
        assert_eq!(second.pick_count, 2);
        assert_eq!(second.fire_state, FireState::Extinguished);
        assert_eq!(composer.fire_state(), Some(FireState::Extinguished));
        assert_eq!(ctx.label, Some(label));
        assert!(ctx.pending_notifications().is_empty());
    }

    #[test]
    fn test_fire_never_goes_out_on_its_own() {
        let mut ctx = SceneContext::new();
        let composer = SceneComposer::compose(&ScenePreset::TrainingRoom.config(), &mut ctx);
        for i in 0..200 {
            ctx.advance(i as f64 * 16.0);
        }
        assert_eq!(composer.fire_state(), Some(FireState::Active));
        assert!(ctx.pending_notifications().is_empty());
    }

    #[test]
    fn test_pick_outside_extinguisher_is_ignored() {
        let mut ctx = SceneContext::new();
        let mut composer = SceneComposer::compose(&ScenePreset::Classroom.config(), &mut ctx);
        let wall = composer.environment().walls[0];
        assert!(composer.pick(&mut ctx, wall).is_none());
        let fire = composer.fire().unwrap().node();
        assert!(composer.pick(&mut ctx, fire).is_none());
        assert_eq!(composer.fire_state(), Some(FireState::Active));
        assert_eq!(composer.extinguisher().unwrap().pick_count(), 0);
    }

    #[test]
    fn test_particle_fire_stops_and_notifies_once() {
        let mut ctx = SceneContext::new();
        let mut composer = SceneComposer::compose(&ScenePreset::OpenRoom.config(), &mut ctx);
        let FireKind::Particles { emitter, anchor } = composer.fire().unwrap().kind() else {
            panic!("open room uses a particle fire");
        };
        ctx.advance(0.0);
        ctx.advance(100.0);
        assert!(!ctx.emitter(emitter).unwrap().particles().is_empty());

        let hose = *composer.extinguisher().unwrap().parts().last().unwrap();
        composer.pick(&mut ctx, hose);
        composer.pick(&mut ctx, hose);

        assert!(!ctx.emitter(emitter).unwrap().is_emitting());
        assert!(!ctx.graph.is_visible(anchor));
        assert!(ctx.label.is_none());
        let notices = ctx.drain_notifications();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, DEFAULT_CONFIRMATION);

        // live particles burn out, no new ones appear
        for i in 2..40 {
            ctx.advance(i as f64 * 50.0);
        }
        assert!(ctx.emitter(emitter).unwrap().particles().is_empty());
    }

    #[test]
    fn test_walls_follow_config() {
        let mut ctx = SceneContext::new();
        let mut composer = SceneComposer::new();
        let shape = Shape::Box {
            width: 4.0,
            height: 3.0,
            depth: 0.1,
        };
        let config = EnvironmentConfig {
            surfaces: vec![
                SurfaceConfig::new(SurfaceKind::Wall, shape.clone(), Vec3::new(0.0, 1.5, -2.0)),
                SurfaceConfig::new(SurfaceKind::Wall, shape.clone(), Vec3::new(2.0, 1.5, 0.0))
                    .rotated(Vec3::new(0.0, FRAC_PI_2, 0.0)),
                SurfaceConfig::new(SurfaceKind::Wall, shape, Vec3::new(-2.0, 1.5, 0.0))
                    .rotated(Vec3::new(0.0, -FRAC_PI_2, 0.0)),
                SurfaceConfig::new(
                    SurfaceKind::Floor,
                    Shape::Ground {
                        width: 4.0,
                        depth: 4.0,
                    },
                    Vec3::ZERO,
                ),
            ],
            furniture: Vec::new(),
        };

        let env = composer.build_environment(&mut ctx, &config).clone();
        assert_eq!(env.walls.len(), 3);
        assert_eq!(ctx.graph.with_role(NodeRole::Wall).count(), 3);
        assert!(!env.has_ceiling());

        let wall_configs = config.surfaces.iter().filter(|s| s.kind == SurfaceKind::Wall);
        for (id, cfg) in env.walls.iter().zip(wall_configs) {
            let node = ctx.graph.get(*id).unwrap();
            assert_eq!(node.pose.position, cfg.position);
            assert_eq!(node.pose.rotation, cfg.rotation);
            assert_eq!(node.shape, cfg.shape);
        }
        let names: Vec<&str> = env
            .walls
            .iter()
            .map(|id| ctx.graph.get(*id).unwrap().name.as_str())
            .collect();
        assert_eq!(names, ["wall1", "wall2", "wall3"]);
    }

    #[test]
    fn test_degenerate_dimensions_pass_through() {
        let mut ctx = SceneContext::new();
        let mut composer = SceneComposer::new();
        let config = EnvironmentConfig {
            surfaces: vec![SurfaceConfig::new(
                SurfaceKind::Wall,
                Shape::Box {
                    width: 0.0,
                    height: -1.0,
                    depth: 0.0,
                },
                Vec3::ZERO,
            )],
            furniture: Vec::new(),
        };
        let env = composer.build_environment(&mut ctx, &config);
        assert_eq!(env.walls.len(), 1);
    }

    #[test]
    fn test_furniture_parts_are_children() {
        let mut ctx = SceneContext::new();
        let composer = SceneComposer::compose(&ScenePreset::TrainingRoom.config(), &mut ctx);
        let env = composer.environment();
        assert_eq!(env.furniture.len(), 2);
        assert!(env.has_ceiling());
        let table = env.furniture[0];
        assert_eq!(ctx.graph.children_of(table).count(), 5);
    }

    #[test]
    fn test_single_fire_and_extinguisher() {
        let mut ctx = SceneContext::new();
        let config = ScenePreset::Classroom.config();
        let mut composer = SceneComposer::compose(&config, &mut ctx);
        let fire = composer.fire().unwrap().clone();
        let ext_root = composer.extinguisher().unwrap().root();
        let nodes = ctx.graph.len();

        let again = composer.spawn_fire_effect(&mut ctx, &config.fire.variant, Vec3::ZERO);
        assert_eq!(again, &fire);
        let again = composer.spawn_extinguisher(&mut ctx, &config.extinguisher);
        assert_eq!(again.root(), ext_root);
        assert_eq!(ctx.graph.len(), nodes);
        assert_eq!(ctx.ticks.len(), 1);
        assert_eq!(ctx.graph.with_role(NodeRole::FireMesh).count(), 1);
        assert_eq!(ctx.graph.with_role(NodeRole::Extinguisher).count(), 1);
    }

    #[test]
    fn test_on_pick_subscribers() {
        let mut ctx = SceneContext::new();
        let mut composer = SceneComposer::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        assert!(!composer.on_pick(|_| {}));

        composer.spawn_extinguisher(&mut ctx, &ExtinguisherConfig::default());
        assert!(composer.on_pick(move |event| sink.lock().unwrap().push(event.pick_count)));
        let target = body(&composer);
        composer.pick(&mut ctx, target);
        composer.pick(&mut ctx, target);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        // no fire spawned: nothing to put out
        assert!(composer.fire_state().is_none());
    }

    #[tokio::test]
    async fn test_denied_xr_keeps_rendering() {
        let mut ctx = SceneContext::new();
        let mut composer = SceneComposer::compose(&ScenePreset::TrainingRoom.config(), &mut ctx);
        let options = XrSessionOptions::default();

        let status = composer
            .request_immersive_session(&mut ctx, &NoXr, &options)
            .await;
        assert_eq!(status, XrStatus::Fallback(XrError::Unsupported));

        let mut surface = RecordingSurface::default();
        let mut clock = FixedStepClock::new(16.0, 10);
        let frames = run_render_loop(&mut ctx, &mut surface, &mut clock, |_, _| {});
        assert_eq!(frames, 10);
        assert_eq!(surface.frames, 10);

        let target = body(&composer);
        composer.pick(&mut ctx, target);
        assert_eq!(composer.fire_state(), Some(FireState::Extinguished));
    }

    #[tokio::test]
    async fn test_granted_xr_is_recorded_once() {
        let mut ctx = SceneContext::new();
        let composer = SceneComposer::new();
        let options = XrSessionOptions::default();
        let status = composer
            .request_immersive_session(&mut ctx, &GrantingXr, &options)
            .await;
        match &status {
            XrStatus::Immersive(info) => {
                assert_eq!(info.mode, SessionMode::ImmersiveAr);
                assert_eq!(info.reference_space, ReferenceSpaceType::LocalFloor);
            }
            other => panic!("unexpected status {other:?}"),
        }

        // second request does not reach the platform
        let again = composer
            .request_immersive_session(&mut ctx, &NoXr, &options)
            .await;
        assert_eq!(again, status);
    }

    #[test]
    fn test_pending_xr_does_not_block_frames() {
        let mut ctx = SceneContext::new();
        let composer = SceneComposer::compose(&ScenePreset::OpenRoom.config(), &mut ctx);
        assert!(composer.begin_immersive_session(&mut ctx, &XrSessionOptions::default()));
        assert!(ctx.xr_status().is_pending());

        let mut surface = RecordingSurface::default();
        let frames = run_render_loop(&mut ctx, &mut surface, &mut FixedStepClock::new(16.0, 5), |_, _| {});
        assert_eq!(frames, 5);

        composer.complete_immersive_session(&mut ctx, Err(XrError::Denied("user".into())));
        assert!(matches!(ctx.xr_status(), XrStatus::Fallback(XrError::Denied(_))));
    }

    #[test]
    fn test_unpresentable_session_falls_back() {
        let mut ctx = SceneContext::new();
        let composer = SceneComposer::compose(&ScenePreset::TrainingRoom.config(), &mut ctx);
        assert!(composer.begin_immersive_session(&mut ctx, &XrSessionOptions::default()));

        let immersive = composer.complete_immersive_session(&mut ctx, Err(XrError::NotPresentable));
        assert!(!immersive);
        assert_eq!(ctx.xr_status(), &XrStatus::Fallback(XrError::NotPresentable));
        assert_eq!(composer.fire_state(), Some(FireState::Active));
    }

    #[test]
    fn test_resize_leaves_scene_state_alone() {
        let mut ctx = SceneContext::new();
        let mut composer = SceneComposer::compose(&ScenePreset::Classroom.config(), &mut ctx);
        let mut surface = RecordingSurface::default();
        let label = ctx.label.clone();
        let picks = composer.extinguisher().unwrap().pick_count();

        for size in [(800.0, 600.0), (800.0, 600.0), (1920.0, 1080.0)] {
            let viewport = Viewport::new(size.0, size.1);
            composer.handle_resize(&mut ctx, &mut surface, viewport);
            assert_eq!(ctx.viewport(), viewport);
        }
        assert_eq!(surface.sizes.len(), 3);
        assert_eq!(composer.fire_state(), Some(FireState::Active));
        assert_eq!(ctx.label, label);
        assert_eq!(composer.extinguisher().unwrap().pick_count(), picks);

        let target = body(&composer);
        composer.pick(&mut ctx, target);
        composer.handle_resize(&mut ctx, &mut surface, Viewport::new(640.0, 480.0));
        assert_eq!(composer.fire_state(), Some(FireState::Extinguished));
    }
}
