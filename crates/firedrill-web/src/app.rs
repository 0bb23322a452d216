//! Bevy application setup

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use firedrill_core::SceneConfig;
use firedrill_scene::{FiredrillScenePlugin, NotificationMode};

use crate::xr::WebXrPlugin;

/// Run the Bevy application on the page canvas
pub fn run(config: SceneConfig) {
    let canvas = format!("#{}", config.surface.canvas_id);
    tracing::info!(scene = %config.name, canvas = %canvas, "Starting drill");

    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Firedrill".to_string(),
                    canvas: Some(canvas),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Textures are served next to the page
                file_path: "".to_string(),
                // Don't look for .meta files - static hosting doesn't have them
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // These must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        // Notices become browser alerts
        .insert_resource(NotificationMode::Host)
        .add_plugins(WebXrPlugin {
            options: config.xr.clone(),
        })
        .add_plugins(FiredrillScenePlugin::new(config))
        .run();
}
