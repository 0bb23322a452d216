//! Extinguisher picking via mouse click or touch tap

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_picking::prelude::{MeshRayCast, MeshRayCastSettings};

use crate::camera::MainCamera;
use crate::particles::ParticleSprite;
use crate::scene::{advance_scene, SceneNodeEntity};
use crate::DrillScene;

/// Pointer travel (pixels) past which a press counts as a drag, not a click
const DRAG_THRESHOLD: f32 = 10.0;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerState>()
            .add_systems(Update, handle_extinguisher_click.before(advance_scene));
    }
}

/// Press tracking so orbit drags don't register as picks
#[derive(Resource, Default)]
pub struct PointerState {
    /// Position where the press or touch started
    start_position: Option<Vec2>,
    /// Whether the pointer has moved significantly since
    is_dragging: bool,
}

impl PointerState {
    fn press(&mut self, pos: Vec2) {
        self.start_position = Some(pos);
        self.is_dragging = false;
    }

    fn moved(&mut self, pos: Vec2) {
        if let Some(start) = self.start_position {
            if pos.distance(start) > DRAG_THRESHOLD {
                self.is_dragging = true;
            }
        }
    }

    /// End the press; returns where it started if it was a click
    fn release(&mut self) -> Option<Vec2> {
        let click = self.start_position.filter(|_| !self.is_dragging);
        self.start_position = None;
        self.is_dragging = false;
        click
    }
}

fn handle_extinguisher_click(
    mut drill: ResMut<DrillScene>,
    mut pointer: ResMut<PointerState>,
    mut ray_cast: MeshRayCast,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    nodes: Query<&SceneNodeEntity>,
    parents: Query<&ChildOf>,
    sprites: Query<(), With<ParticleSprite>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut contexts: bevy_egui::EguiContexts,
) {
    // Check if egui wants the pointer
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);
    if egui_wants_pointer {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let mut click_pos: Option<Vec2> = None;

    for touch in touch_input.iter() {
        if touch_input.just_pressed(touch.id()) {
            pointer.press(touch.position());
        } else {
            pointer.moved(touch.position());
        }
    }
    if touch_input.iter_just_released().next().is_some() {
        click_pos = pointer.release();
    }

    if let Some(cursor_pos) = window.cursor_position() {
        if mouse_button.just_pressed(MouseButton::Left) {
            pointer.press(cursor_pos);
        } else if mouse_button.pressed(MouseButton::Left) {
            pointer.moved(cursor_pos);
        }
    }
    if mouse_button.just_released(MouseButton::Left) {
        click_pos = pointer.release();
    }

    let Some(pos) = click_pos else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, pos) else {
        return;
    };

    let not_sprite = |entity: Entity| !sprites.contains(entity);
    let settings = MeshRayCastSettings::default().with_filter(&not_sprite);
    let Some(hit) = ray_cast.cast_ray(ray, &settings).first().map(|(entity, _)| *entity) else {
        return;
    };

    // Tube segments are unlinked children; walk up to the node entity
    let mut entity = hit;
    let node = loop {
        if let Ok(link) = nodes.get(entity) {
            break link.0;
        }
        match parents.get(entity) {
            Ok(child_of) => entity = child_of.parent(),
            Err(_) => return,
        }
    };

    let DrillScene { ctx, composer } = &mut *drill;
    if composer.pick(ctx, node).is_none() {
        tracing::trace!(%node, "Click landed outside the extinguisher");
    }
}
