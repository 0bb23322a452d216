//! Firedrill Scene - Bevy rendering of a composed drill scene
//!
//! This crate turns a [`SceneContext`] built by `firedrill-core` into Bevy
//! entities and keeps them in sync every frame. It is shared by the browser
//! build (firedrill-web) and the native window (firedrill-desktop).

pub mod camera;
pub mod interaction;
pub mod particles;
pub mod scene;
pub mod surface;
pub mod ui;

use bevy::prelude::*;
use firedrill_core::{SceneComposer, SceneConfig, SceneContext};

/// The live scene: composer handles plus everything they point into
#[derive(Resource)]
pub struct DrillScene {
    pub ctx: SceneContext,
    pub composer: SceneComposer,
}

impl DrillScene {
    pub fn compose(config: &SceneConfig) -> Self {
        let mut ctx = SceneContext::new();
        let composer = SceneComposer::compose(config, &mut ctx);
        Self { ctx, composer }
    }
}

/// Configuration the scene was built from (camera, lights, surface)
#[derive(Debug, Clone, Resource)]
pub struct DrillSettings(pub SceneConfig);

/// Plugin that renders a drill scene
///
/// Hosts that need to touch the scene before the app starts (to request an
/// immersive session, say) can insert their own [`DrillScene`] first; the
/// plugin only composes one when none is present.
pub struct FiredrillScenePlugin {
    config: SceneConfig,
}

impl FiredrillScenePlugin {
    pub fn new(config: SceneConfig) -> Self {
        Self { config }
    }
}

impl Plugin for FiredrillScenePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DrillScene>() {
            app.insert_resource(DrillScene::compose(&self.config));
        }
        app.insert_resource(ClearColor(scene::rgb(self.config.surface.clear_color)))
            .insert_resource(DrillSettings(self.config.clone()))
            .add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(particles::ParticlesPlugin)
            .add_plugins(interaction::InteractionPlugin)
            .add_plugins(surface::SurfacePlugin)
            .add_plugins(ui::UiPlugin);
    }
}

pub use camera::{CameraSettings, MainCamera};
pub use scene::{NodeEntities, SceneNodeEntity};
pub use ui::NotificationMode;
