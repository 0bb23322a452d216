//! CPU particle pool for the flame effect
//!
//! The pool only decides where sprites are, how big, and what color. Drawing
//! them (billboards, additive blending) is the renderer's job.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{BlendMode, Rgba};

/// Emitter parameters, in world units and seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Maximum live particles
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Spawn box corners relative to the anchor
    #[serde(default = "default_emit_box_min")]
    pub emit_box_min: Vec3,
    #[serde(default = "default_emit_box_max")]
    pub emit_box_max: Vec3,
    /// Particles start at a random mix of these two colors
    #[serde(default = "default_color1")]
    pub color1: Rgba,
    #[serde(default = "default_color2")]
    pub color2: Rgba,
    /// Color reached at the end of a particle's life
    #[serde(default = "default_color_dead")]
    pub color_dead: Rgba,
    #[serde(default = "default_min_size")]
    pub min_size: f32,
    #[serde(default = "default_max_size")]
    pub max_size: f32,
    #[serde(default = "default_min_lifetime")]
    pub min_lifetime: f32,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime: f32,
    /// Particles per second
    #[serde(default = "default_emit_rate")]
    pub emit_rate: f32,
    /// Initial direction is picked per component between these two vectors
    #[serde(default = "default_direction1")]
    pub direction1: Vec3,
    #[serde(default = "default_direction2")]
    pub direction2: Vec3,
    #[serde(default = "default_min_emit_power")]
    pub min_emit_power: f32,
    #[serde(default = "default_max_emit_power")]
    pub max_emit_power: f32,
    /// Sprite spin, radians per second
    #[serde(default)]
    pub min_angular_speed: f32,
    #[serde(default = "default_max_angular_speed")]
    pub max_angular_speed: f32,
    #[serde(default)]
    pub gravity: Vec3,
    #[serde(default = "default_blend_mode")]
    pub blend_mode: BlendMode,
    #[serde(default = "default_seed")]
    pub seed: u32,
}

fn default_capacity() -> usize {
    600
}

fn default_emit_box_min() -> Vec3 {
    Vec3::new(-0.2, 0.0, -0.2)
}

fn default_emit_box_max() -> Vec3 {
    Vec3::new(0.2, 0.0, 0.2)
}

fn default_color1() -> Rgba {
    [1.0, 0.5, 0.0, 1.0]
}

fn default_color2() -> Rgba {
    [1.0, 0.2, 0.0, 1.0]
}

fn default_color_dead() -> Rgba {
    [0.0, 0.0, 0.0, 0.0]
}

fn default_min_size() -> f32 {
    0.1
}

fn default_max_size() -> f32 {
    0.5
}

fn default_min_lifetime() -> f32 {
    0.3
}

fn default_max_lifetime() -> f32 {
    1.0
}

fn default_emit_rate() -> f32 {
    400.0
}

fn default_direction1() -> Vec3 {
    Vec3::new(-0.2, 1.0, -0.2)
}

fn default_direction2() -> Vec3 {
    Vec3::new(0.2, 1.0, 0.2)
}

fn default_min_emit_power() -> f32 {
    0.5
}

fn default_max_emit_power() -> f32 {
    1.5
}

fn default_max_angular_speed() -> f32 {
    std::f32::consts::PI
}

fn default_blend_mode() -> BlendMode {
    BlendMode::Add
}

fn default_seed() -> u32 {
    0x5EED_F1AE
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            emit_box_min: default_emit_box_min(),
            emit_box_max: default_emit_box_max(),
            color1: default_color1(),
            color2: default_color2(),
            color_dead: default_color_dead(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            min_lifetime: default_min_lifetime(),
            max_lifetime: default_max_lifetime(),
            emit_rate: default_emit_rate(),
            direction1: default_direction1(),
            direction2: default_direction2(),
            min_emit_power: default_min_emit_power(),
            max_emit_power: default_max_emit_power(),
            min_angular_speed: 0.0,
            max_angular_speed: default_max_angular_speed(),
            gravity: Vec3::ZERO,
            blend_mode: default_blend_mode(),
            seed: default_seed(),
        }
    }
}

/// One live sprite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World-space position
    pub position: Vec3,
    pub velocity: Vec3,
    pub size: f32,
    /// Rotation around the view axis, radians
    pub angle: f32,
    pub angular_speed: f32,
    pub age: f32,
    pub lifetime: f32,
    birth_color: Rgba,
}

impl Particle {
    /// Normalized age in 0.0-1.0
    pub fn life_fraction(&self) -> f32 {
        if self.lifetime <= 0.0 {
            1.0
        } else {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        }
    }

    /// Color the particle was born with
    pub fn birth_color(&self) -> Rgba {
        self.birth_color
    }

    /// Current color, fading from the birth color to `dead`
    pub fn color(&self, dead: Rgba) -> Rgba {
        lerp_rgba(self.birth_color, dead, self.life_fraction())
    }
}

/// Emitter bound to an anchor position
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    config: EmitterConfig,
    particles: Vec<Particle>,
    emitting: bool,
    /// Fractional particles carried between frames
    pending: f32,
    rng: u32,
}

impl ParticleEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        let rng = if config.seed == 0 { default_seed() } else { config.seed };
        Self {
            particles: Vec::with_capacity(config.capacity),
            config,
            emitting: false,
            pending: 0.0,
            rng,
        }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn start(&mut self) {
        self.emitting = true;
    }

    /// Stop spawning; live particles finish their lifetime
    pub fn stop(&mut self) {
        self.emitting = false;
        self.pending = 0.0;
    }

    pub fn is_emitting(&self) -> bool {
        self.emitting
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Drop every live particle
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Age, move and spawn particles. `origin` is the anchor's world position.
    pub fn update(&mut self, dt_secs: f32, origin: Vec3) {
        if dt_secs <= 0.0 {
            return;
        }

        let gravity = self.config.gravity;
        self.particles.retain_mut(|p| {
            p.age += dt_secs;
            if p.age >= p.lifetime {
                return false;
            }
            p.velocity += gravity * dt_secs;
            p.position += p.velocity * dt_secs;
            p.angle += p.angular_speed * dt_secs;
            true
        });

        if !self.emitting {
            return;
        }

        self.pending += self.config.emit_rate * dt_secs;
        while self.pending >= 1.0 {
            self.pending -= 1.0;
            if self.particles.len() >= self.config.capacity {
                // Pool is full; drop the backlog rather than bursting later
                self.pending = self.pending.fract();
                break;
            }
            let particle = self.spawn(origin);
            self.particles.push(particle);
        }
    }

    fn spawn(&mut self, origin: Vec3) -> Particle {
        let c = &self.config;
        let (box_min, box_max) = (c.emit_box_min, c.emit_box_max);
        let (d1, d2) = (c.direction1, c.direction2);
        let (color1, color2) = (c.color1, c.color2);
        let (min_size, max_size) = (c.min_size, c.max_size);
        let (min_life, max_life) = (c.min_lifetime, c.max_lifetime);
        let (min_power, max_power) = (c.min_emit_power, c.max_emit_power);
        let (min_spin, max_spin) = (c.min_angular_speed, c.max_angular_speed);

        let offset = Vec3::new(
            self.range(box_min.x, box_max.x),
            self.range(box_min.y, box_max.y),
            self.range(box_min.z, box_max.z),
        );
        let direction = Vec3::new(
            self.range(d1.x, d2.x),
            self.range(d1.y, d2.y),
            self.range(d1.z, d2.z),
        );
        let power = self.range(min_power, max_power);
        let mix = self.rand();

        Particle {
            position: origin + offset,
            velocity: direction * power,
            size: self.range(min_size, max_size),
            angle: 0.0,
            angular_speed: self.range(min_spin, max_spin),
            age: 0.0,
            lifetime: self.range(min_life, max_life),
            birth_color: lerp_rgba(color1, color2, mix),
        }
    }

    fn rand(&mut self) -> f32 {
        self.rng ^= self.rng << 13;
        self.rng ^= self.rng >> 17;
        self.rng ^= self.rng << 5;
        self.rng as f32 / u32::MAX as f32
    }

    fn range(&mut self, a: f32, b: f32) -> f32 {
        a + (b - a) * self.rand()
    }
}

/// Linear blend from `a` to `b`
pub fn lerp_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> EmitterConfig {
        EmitterConfig {
            capacity: 50,
            emit_rate: 80.0,
            min_lifetime: 0.5,
            max_lifetime: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_emits_at_configured_rate() {
        let mut emitter = ParticleEmitter::new(small_config());
        emitter.start();
        emitter.update(0.125, Vec3::ZERO);
        assert_eq!(emitter.particles().len(), 10);
    }

    #[test]
    fn test_idle_emitter_spawns_nothing() {
        let mut emitter = ParticleEmitter::new(small_config());
        emitter.update(0.125, Vec3::ZERO);
        assert!(emitter.particles().is_empty());
    }

    #[test]
    fn test_capacity_is_respected() {
        let mut emitter = ParticleEmitter::new(EmitterConfig {
            emit_rate: 100.0,
            min_lifetime: 2.0,
            max_lifetime: 2.0,
            ..small_config()
        });
        emitter.start();
        emitter.update(0.25, Vec3::ZERO);
        assert_eq!(emitter.particles().len(), 25);
        emitter.update(0.25, Vec3::ZERO);
        assert_eq!(emitter.particles().len(), 50);
        emitter.update(0.25, Vec3::ZERO);
        assert_eq!(emitter.particles().len(), 50);
    }

    #[test]
    fn test_stop_lets_particles_die_out() {
        let mut emitter = ParticleEmitter::new(small_config());
        emitter.start();
        emitter.update(0.125, Vec3::ZERO);
        emitter.stop();
        assert!(!emitter.is_emitting());
        emitter.update(0.25, Vec3::ZERO);
        assert_eq!(emitter.particles().len(), 10);
        emitter.update(0.25, Vec3::ZERO);
        assert!(emitter.particles().is_empty());
    }

    #[test]
    fn test_spawn_inside_box_and_moving_up() {
        let mut emitter = ParticleEmitter::new(small_config());
        emitter.start();
        let origin = Vec3::new(0.0, 0.5, -3.0);
        emitter.update(0.125, origin);
        assert!(!emitter.particles().is_empty());
        for p in emitter.particles() {
            let local = p.position - origin;
            assert!(local.x.abs() <= 0.2 + 1e-4);
            assert!(local.z.abs() <= 0.2 + 1e-4);
            assert!(p.velocity.y > 0.0);
            assert!(p.size >= 0.1 && p.size <= 0.5);
        }
    }

    #[test]
    fn test_color_fades_to_dead_color() {
        let mut emitter = ParticleEmitter::new(small_config());
        emitter.start();
        emitter.update(0.125, Vec3::ZERO);
        let p = emitter.particles()[0];
        let dead = emitter.config().color_dead;
        assert!(p.color(dead)[3] > 0.9);
        let old = Particle { age: p.lifetime, ..p };
        assert_eq!(old.color(dead), dead);
    }
}
