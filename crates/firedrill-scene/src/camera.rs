//! Orbit camera around the scene target

use std::f32::consts::PI;

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll};
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use firedrill_core::CameraConfig;

use crate::scene::vec3;
use crate::DrillSettings;

const MIN_BETA: f32 = 0.01;
const MAX_BETA: f32 = PI - 0.01;

/// Camera controller settings, in arc-rotate terms
///
/// `alpha` turns around the vertical axis from +X, `beta` tilts down from
/// straight up, `radius` is the distance to `target`.
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target_radius: f32,
    pub target: Vec3,
    pub sensitivity: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl CameraSettings {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            alpha: config.alpha,
            beta: config.beta.clamp(MIN_BETA, MAX_BETA),
            radius: config.radius,
            target_radius: config.radius,
            target: vec3(config.target),
            sensitivity: 0.005,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
            min_radius: 1.0,
            max_radius: 30.0,
        }
    }

    /// Eye position for the current angles
    pub fn eye(&self) -> Vec3 {
        let (sin_b, cos_b) = self.beta.sin_cos();
        let (sin_a, cos_a) = self.alpha.sin_cos();
        self.target + self.radius * Vec3::new(cos_a * sin_b, cos_b, sin_a * sin_b)
    }

    /// Apply a pointer drag in pixels
    pub fn orbit(&mut self, delta: Vec2) {
        self.alpha -= delta.x * self.sensitivity;
        self.beta = (self.beta - delta.y * self.sensitivity).clamp(MIN_BETA, MAX_BETA);
    }

    /// Apply a zoom step; positive zooms in
    pub fn zoom(&mut self, amount: f32) {
        let factor = 1.0 - amount * self.zoom_speed;
        self.target_radius = (self.target_radius * factor).clamp(self.min_radius, self.max_radius);
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        let settings = app
            .world()
            .get_resource::<DrillSettings>()
            .map(|s| CameraSettings::from_config(&s.0.camera))
            .unwrap_or_default();
        app.insert_resource(settings)
            .add_systems(Update, update_camera);
    }
}

fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    if !egui_wants_pointer {
        if mouse_button.pressed(MouseButton::Left) {
            settings.orbit(mouse_motion.delta);
        }
        if mouse_scroll.delta.y != 0.0 {
            let step = mouse_scroll.delta.y.signum();
            settings.zoom(step);
        }

        let touches: Vec<_> = touch_input.iter().collect();
        match touches.as_slice() {
            [touch] => settings.orbit(touch.delta()),
            [t1, t2] => {
                let curr = t1.position().distance(t2.position());
                let prev = (t1.position() - t1.delta()).distance(t2.position() - t2.delta());
                if curr > 1.0 {
                    let factor = prev / curr;
                    settings.target_radius = (settings.target_radius * factor)
                        .clamp(settings.min_radius, settings.max_radius);
                }
            }
            _ => {}
        }
    }

    let dt = time.delta_secs();
    let lerp_factor = 1.0 - (-settings.smooth_factor * 60.0 * dt).exp();
    settings.radius += (settings.target_radius - settings.radius) * lerp_factor;

    if let Ok(mut transform) = camera_query.single_mut() {
        *transform = settings.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_default_eye_matches_arc_camera() {
        let settings = CameraSettings::default();
        let eye = settings.eye();
        let r = 8.0 * FRAC_PI_4.sin();
        assert!(eye.x.abs() < 1e-5);
        assert!((eye.y - r).abs() < 1e-4);
        assert!((eye.z - r).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_clamps_beta() {
        let mut settings = CameraSettings::default();
        settings.orbit(Vec2::new(0.0, 10_000.0));
        assert_eq!(settings.beta, MIN_BETA);
        settings.orbit(Vec2::new(0.0, -10_000.0));
        assert_eq!(settings.beta, MAX_BETA);
        let alpha = settings.alpha;
        settings.orbit(Vec2::new(100.0, 0.0));
        assert!((settings.alpha - (alpha - 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_zoom_stays_in_range() {
        let mut settings = CameraSettings::from_config(&CameraConfig {
            alpha: FRAC_PI_2,
            beta: 1.0,
            radius: 4.0,
            target: glam::Vec3::ZERO,
        });
        for _ in 0..100 {
            settings.zoom(1.0);
        }
        assert_eq!(settings.target_radius, settings.min_radius);
        for _ in 0..100 {
            settings.zoom(-1.0);
        }
        assert_eq!(settings.target_radius, settings.max_radius);
    }

    #[test]
    fn test_transform_looks_at_target() {
        let settings = CameraSettings::default();
        let transform = settings.transform();
        let forward = transform.forward();
        let to_target = (settings.target - settings.eye()).normalize();
        assert!(forward.dot(to_target) > 0.999);
    }
}
