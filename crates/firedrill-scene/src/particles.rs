//! Camera-facing billboards for particle emitters
//!
//! Each emitter gets a fixed pool of quads, one per particle slot. Slots past
//! the live particle count are hidden.

use bevy::prelude::*;
use bevy_picking::Pickable;
use firedrill_core::context::EmitterId;
use firedrill_core::{lerp_rgba, EmitterConfig, Particle, Rgba};

use crate::camera::MainCamera;
use crate::scene::{advance_scene, alpha_mode, rgba, vec3};
use crate::DrillScene;

/// Birth colors sampled between `color1` and `color2`
const MIX_STEPS: usize = 3;
/// Fade steps from birth to `color_dead`
const FADE_STEPS: usize = 12;

/// One billboard slot in an emitter's pool
#[derive(Component, Debug, Clone, Copy)]
pub struct ParticleSprite {
    pub emitter: EmitterId,
    pub slot: usize,
}

/// Shared materials for one emitter's sprites, one per (birth mix, fade) step
///
/// Sprites swap handles as they age instead of editing their own material.
#[derive(Debug, Clone)]
pub struct ParticlePalette {
    materials: Vec<Handle<StandardMaterial>>,
}

impl ParticlePalette {
    /// Colors in row-major (mix, fade) order
    pub fn colors(config: &EmitterConfig) -> Vec<Rgba> {
        let mut colors = Vec::with_capacity(MIX_STEPS * FADE_STEPS);
        for m in 0..MIX_STEPS {
            let birth = lerp_rgba(config.color1, config.color2, step_fraction(m, MIX_STEPS));
            for f in 0..FADE_STEPS {
                colors.push(lerp_rgba(birth, config.color_dead, step_fraction(f, FADE_STEPS)));
            }
        }
        colors
    }

    /// Palette slot closest to the particle's current color
    pub fn index(config: &EmitterConfig, particle: &Particle) -> usize {
        let mix = birth_mix(config.color1, config.color2, particle.birth_color());
        nearest_step(mix, MIX_STEPS) * FADE_STEPS + nearest_step(particle.life_fraction(), FADE_STEPS)
    }

    fn material(&self, index: usize) -> Option<&Handle<StandardMaterial>> {
        self.materials.get(index)
    }
}

/// Palettes indexed by emitter
#[derive(Resource, Debug, Default)]
pub struct ParticlePalettes(pub Vec<ParticlePalette>);

fn step_fraction(step: usize, steps: usize) -> f32 {
    if steps <= 1 {
        0.0
    } else {
        step as f32 / (steps - 1) as f32
    }
}

fn nearest_step(t: f32, steps: usize) -> usize {
    ((t.clamp(0.0, 1.0) * (steps - 1) as f32).round() as usize).min(steps - 1)
}

/// Where `birth` sits on the line from `a` to `b`, 0.0-1.0
fn birth_mix(a: Rgba, b: Rgba, birth: Rgba) -> f32 {
    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..4 {
        let d = b[i] - a[i];
        num += (birth[i] - a[i]) * d;
        den += d * d;
    }
    if den <= f32::EPSILON {
        0.0
    } else {
        (num / den).clamp(0.0, 1.0)
    }
}

pub struct ParticlesPlugin;

impl Plugin for ParticlesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ParticlePalettes>()
            .add_systems(Startup, spawn_particle_pools)
            .add_systems(Update, update_particle_sprites.after(advance_scene));
    }
}

fn spawn_particle_pools(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut palettes: ResMut<ParticlePalettes>,
    drill: Res<DrillScene>,
) {
    let quad = meshes.add(Rectangle::new(1.0, 1.0));
    for (index, bound) in drill.ctx.emitters().iter().enumerate() {
        let config = bound.emitter.config();
        let palette = ParticlePalette {
            materials: ParticlePalette::colors(config)
                .into_iter()
                .map(|color| {
                    materials.add(StandardMaterial {
                        base_color: rgba(color),
                        unlit: true,
                        alpha_mode: alpha_mode(config.blend_mode),
                        double_sided: true,
                        cull_mode: None,
                        ..default()
                    })
                })
                .collect(),
        };

        for slot in 0..config.capacity {
            let Some(first) = palette.material(0) else {
                break;
            };
            commands.spawn((
                Mesh3d(quad.clone()),
                MeshMaterial3d(first.clone()),
                Transform::default(),
                Visibility::Hidden,
                Pickable::IGNORE,
                ParticleSprite {
                    emitter: EmitterId(index),
                    slot,
                },
            ));
        }
        tracing::debug!(
            emitter = index,
            slots = config.capacity,
            materials = palette.materials.len(),
            "Particle pool spawned"
        );
        palettes.0.push(palette);
    }
}

/// Billboard transform for a particle seen from `camera_rotation`
pub fn billboard(particle: &Particle, camera_rotation: Quat) -> Transform {
    Transform {
        translation: vec3(particle.position),
        rotation: camera_rotation * Quat::from_rotation_z(particle.angle),
        scale: Vec3::splat(particle.size),
    }
}

fn update_particle_sprites(
    drill: Res<DrillScene>,
    palettes: Res<ParticlePalettes>,
    camera: Query<&Transform, (With<MainCamera>, Without<ParticleSprite>)>,
    mut sprites: Query<(
        &ParticleSprite,
        &mut Transform,
        &mut Visibility,
        &mut MeshMaterial3d<StandardMaterial>,
    )>,
) {
    let camera_rotation = camera.single().map(|t| t.rotation).unwrap_or_default();

    for (sprite, mut transform, mut visibility, mut material) in sprites.iter_mut() {
        let Some(emitter) = drill.ctx.emitter(sprite.emitter) else {
            continue;
        };
        match emitter.particles().get(sprite.slot) {
            Some(particle) => {
                *transform = billboard(particle, camera_rotation);
                *visibility = Visibility::Visible;
                let index = ParticlePalette::index(emitter.config(), particle);
                if let Some(handle) = palettes.0.get(sprite.emitter.0).and_then(|p| p.material(index)) {
                    if material.0 != *handle {
                        material.0 = handle.clone();
                    }
                }
            }
            None => {
                if *visibility != Visibility::Hidden {
                    *visibility = Visibility::Hidden;
                }
            }
        }
    }
}
