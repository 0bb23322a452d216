//! Windowed Bevy app

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use firedrill_core::{NoXr, SceneConfig};
use firedrill_scene::{DrillScene, FiredrillScenePlugin};

/// Compose the scene and settle the XR request before any window exists
///
/// There is no XR runtime on desktop, so this only records the fallback.
pub async fn prepare(config: &SceneConfig) -> DrillScene {
    let mut scene = DrillScene::compose(config);
    if let Some(xr) = &config.xr {
        let DrillScene { ctx, composer } = &mut scene;
        composer.request_immersive_session(ctx, &NoXr, xr).await;
    }
    scene
}

/// Open the window; blocks until it is closed
pub fn run(config: SceneConfig, scene: DrillScene) {
    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: format!("Firedrill - {}", config.name),
                    ..default()
                }),
                ..default()
            })
        )
        // These must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .insert_resource(scene)
        .add_plugins(FiredrillScenePlugin::new(config))
        .run();
}

#[cfg(test)]
mod tests {
    use super::*;
    use firedrill_core::{FireState, ScenePreset, XrError, XrStatus};

    #[tokio::test]
    async fn test_prepare_settles_xr_before_the_window() {
        let scene = prepare(&ScenePreset::TrainingRoom.config()).await;
        assert_eq!(*scene.ctx.xr_status(), XrStatus::Fallback(XrError::Unsupported));
        assert_eq!(scene.composer.fire_state(), Some(FireState::Active));
    }

    #[tokio::test]
    async fn test_prepare_without_xr() {
        let scene = prepare(&ScenePreset::Classroom.config()).await;
        assert_eq!(*scene.ctx.xr_status(), XrStatus::NotRequested);
    }
}
