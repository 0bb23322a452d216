//! Window resize handling

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use firedrill_core::{FrameTime, RenderSurface, SceneContext, Viewport};

use crate::camera::MainCamera;
use crate::DrillScene;

/// The main camera's projection seen as a render surface
///
/// Bevy draws on its own schedule, so `render` has nothing to do; `resize`
/// keeps the projection's aspect ratio in step with the window.
pub struct CameraSurface<'a> {
    projection: Option<Mut<'a, Projection>>,
}

impl RenderSurface for CameraSurface<'_> {
    fn render(&mut self, _frame: &FrameTime, _ctx: &SceneContext) {}

    fn resize(&mut self, viewport: Viewport) {
        if let Some(Projection::Perspective(perspective)) = self.projection.as_deref_mut() {
            perspective.aspect_ratio = viewport.aspect();
        }
    }
}

pub struct SurfacePlugin;

impl Plugin for SurfacePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, handle_window_resize);
    }
}

fn handle_window_resize(
    windows: Query<&Window, (With<PrimaryWindow>, Changed<Window>)>,
    mut projection: Query<&mut Projection, With<MainCamera>>,
    mut drill: ResMut<DrillScene>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let viewport = Viewport::new(window.width(), window.height());
    if drill.ctx.viewport() == viewport {
        return;
    }

    let mut surface = CameraSurface {
        projection: projection.single_mut().ok(),
    };
    let DrillScene { ctx, composer } = &mut *drill;
    composer.handle_resize(ctx, &mut surface, viewport);
}
