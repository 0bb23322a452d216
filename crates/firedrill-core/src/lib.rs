//! Firedrill Core - Scene composition and interaction model
//!
//! This crate provides the engine-agnostic half of the fire safety drill:
//! - Scene configuration, presets and TOML/JSON loading
//! - A flat scene graph and the per-scene [`SceneContext`]
//! - Fire effects (pulsing mesh or particle flame) and their state machine
//! - The clickable extinguisher and pick subscriptions
//! - Immersive session negotiation through an [`XrPlatform`]
//! - A redraw driver for hosts without an engine loop

pub mod composer;
pub mod config;
pub mod context;
pub mod environment;
pub mod extinguisher;
pub mod feedback;
pub mod fire;
pub mod geometry;
pub mod graph;
pub mod particles;
pub mod render_loop;
pub mod xr;

pub use composer::SceneComposer;
pub use config::{CameraConfig, ConfigError, LightConfig, SceneConfig, ScenePreset, SurfaceSettings};
pub use context::{FrameTick, FrameTime, SceneContext, TickId, Viewport};
pub use environment::{Environment, EnvironmentConfig, SurfaceKind};
pub use extinguisher::{Extinguisher, ExtinguisherConfig, PickEvent};
pub use feedback::{FeedbackConfig, InstructionLabel, Notification};
pub use fire::{FireConfig, FireEffect, FireKind, FireState, FireVariant};
pub use geometry::{BlendMode, MaterialDesc, Pose, Rgb, Rgba, Shape};
pub use graph::{NodeId, NodeRole, SceneGraph, SceneNode};
pub use particles::{lerp_rgba, EmitterConfig, Particle, ParticleEmitter};
pub use render_loop::{run_render_loop, render_frame, FixedStepClock, FrameClock, RenderSurface};
pub use xr::{NoXr, XrError, XrPlatform, XrSessionInfo, XrSessionOptions, XrStatus};
