//! Scene configuration: loading, saving and the built-in presets

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::path::Path;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::environment::{EnvironmentConfig, FurnitureConfig, FurniturePart, SurfaceConfig, SurfaceKind};
use crate::extinguisher::{ExtinguisherConfig, HoseConfig, NozzleConfig};
use crate::feedback::{FeedbackConfig, LabelConfig, DEFAULT_CONFIRMATION};
use crate::fire::{FireConfig, FireVariant, ParticleFireConfig, PulseConfig};
use crate::geometry::{MaterialDesc, Rgb, Shape};
use crate::particles::EmitterConfig;
use crate::xr::{OptionalFeatures, ReferenceSpaceType, SessionMode, XrSessionOptions};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// Drawable surface the scene renders into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSettings {
    /// DOM id of the canvas on the web
    #[serde(default = "default_canvas_id")]
    pub canvas_id: String,
    #[serde(default = "default_clear_color")]
    pub clear_color: Rgb,
}

fn default_canvas_id() -> String {
    "renderCanvas".to_string()
}

fn default_clear_color() -> Rgb {
    [0.7, 0.7, 0.7]
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            canvas_id: default_canvas_id(),
            clear_color: default_clear_color(),
        }
    }
}

/// Orbit camera in arc-rotate terms
///
/// `alpha` is the angle around the vertical axis measured from +X, `beta` the
/// angle down from straight up, `radius` the distance to `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default = "default_beta")]
    pub beta: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default)]
    pub target: Vec3,
}

fn default_alpha() -> f32 {
    FRAC_PI_2
}

fn default_beta() -> f32 {
    FRAC_PI_4
}

fn default_radius() -> f32 {
    8.0
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            beta: default_beta(),
            radius: default_radius(),
            target: Vec3::ZERO,
        }
    }
}

impl CameraConfig {
    /// World-space eye position
    pub fn eye(&self) -> Vec3 {
        self.target
            + Vec3::new(
                self.radius * self.alpha.cos() * self.beta.sin(),
                self.radius * self.beta.cos(),
                self.radius * self.alpha.sin() * self.beta.sin(),
            )
    }
}

/// Sky/ground light: full intensity from `direction`, dimmer from below
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    #[serde(default = "default_light_direction")]
    pub direction: Vec3,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
}

fn default_light_direction() -> Vec3 {
    Vec3::new(1.0, 1.0, 0.0)
}

fn default_intensity() -> f32 {
    1.0
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: default_light_direction(),
            intensity: default_intensity(),
        }
    }
}

/// Complete scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub surface: SurfaceSettings,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub light: LightConfig,
    #[serde(default)]
    pub environment: EnvironmentConfig,
    #[serde(default)]
    pub fire: FireConfig,
    #[serde(default)]
    pub extinguisher: ExtinguisherConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    /// Ask for an immersive session at startup
    #[serde(default)]
    pub xr: Option<XrSessionOptions>,
}

fn default_name() -> String {
    "firedrill".to_string()
}

impl Default for SceneConfig {
    fn default() -> Self {
        ScenePreset::Classroom.config()
    }
}

impl SceneConfig {
    /// Load a scene from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let config = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };
        info!(path = %path.display(), name = %config.name, "Loaded scene configuration");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write this scene as TOML
    pub fn save_toml(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Built-in scene variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenePreset {
    /// Grey ground, one wall, pulsing sphere, label overlay, no XR
    #[default]
    Classroom,
    /// Closed room with ceiling and furniture, particle fire, AR session
    TrainingRoom,
    /// Walls without a ceiling, particle fire, AR session with a feature list
    OpenRoom,
}

impl ScenePreset {
    pub const ALL: [ScenePreset; 3] = [
        ScenePreset::Classroom,
        ScenePreset::TrainingRoom,
        ScenePreset::OpenRoom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenePreset::Classroom => "classroom",
            ScenePreset::TrainingRoom => "training_room",
            ScenePreset::OpenRoom => "open_room",
        }
    }

    pub fn config(&self) -> SceneConfig {
        match self {
            ScenePreset::Classroom => classroom(),
            ScenePreset::TrainingRoom => training_room(),
            ScenePreset::OpenRoom => open_room(),
        }
    }
}

impl FromStr for ScenePreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        ScenePreset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

impl std::fmt::Display for ScenePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const ROOM_HALF: f32 = 5.0;
const WALL_HEIGHT: f32 = 3.0;
const WALL_THICKNESS: f32 = 0.1;

fn classroom() -> SceneConfig {
    SceneConfig {
        name: ScenePreset::Classroom.name().to_string(),
        surface: SurfaceSettings::default(),
        camera: CameraConfig::default(),
        light: LightConfig::default(),
        environment: EnvironmentConfig {
            surfaces: vec![
                SurfaceConfig::new(
                    SurfaceKind::Floor,
                    Shape::Ground {
                        width: 10.0,
                        depth: 10.0,
                    },
                    Vec3::ZERO,
                )
                .named("ground")
                .with_material(MaterialDesc::diffuse([0.4, 0.4, 0.4])),
                SurfaceConfig::new(
                    SurfaceKind::Wall,
                    Shape::Box {
                        width: 10.0,
                        height: WALL_HEIGHT,
                        depth: WALL_THICKNESS,
                    },
                    Vec3::new(0.0, WALL_HEIGHT / 2.0, -ROOM_HALF),
                )
                .named("wall1"),
            ],
            furniture: Vec::new(),
        },
        fire: FireConfig {
            anchor: Vec3::new(0.0, 0.5, -3.0),
            variant: FireVariant::PulsingMesh(PulseConfig::default()),
        },
        extinguisher: ExtinguisherConfig::default(),
        feedback: FeedbackConfig::Label(LabelConfig::default()),
        xr: None,
    }
}

/// Four walls around a 10x10 floor, each facing the room center
fn four_walls(color: Rgb) -> Vec<SurfaceConfig> {
    let wall = || Shape::Box {
        width: 2.0 * ROOM_HALF,
        height: WALL_HEIGHT,
        depth: WALL_THICKNESS,
    };
    let y = WALL_HEIGHT / 2.0;
    let material = MaterialDesc::diffuse(color);
    vec![
        SurfaceConfig::new(SurfaceKind::Wall, wall(), Vec3::new(0.0, y, -ROOM_HALF))
            .with_material(material.clone()),
        SurfaceConfig::new(SurfaceKind::Wall, wall(), Vec3::new(0.0, y, ROOM_HALF))
            .rotated(Vec3::new(0.0, PI, 0.0))
            .with_material(material.clone()),
        SurfaceConfig::new(SurfaceKind::Wall, wall(), Vec3::new(-ROOM_HALF, y, 0.0))
            .rotated(Vec3::new(0.0, FRAC_PI_2, 0.0))
            .with_material(material.clone()),
        SurfaceConfig::new(SurfaceKind::Wall, wall(), Vec3::new(ROOM_HALF, y, 0.0))
            .rotated(Vec3::new(0.0, -FRAC_PI_2, 0.0))
            .with_material(material),
    ]
}

fn table(position: Vec3) -> FurnitureConfig {
    let wood = MaterialDesc::diffuse([0.55, 0.35, 0.2]);
    let leg = |x: f32, z: f32| FurniturePart {
        shape: Shape::Box {
            width: 0.08,
            height: 0.72,
            depth: 0.08,
        },
        offset: Vec3::new(x, 0.36, z),
        material: wood.clone(),
    };
    FurnitureConfig {
        name: "table".to_string(),
        position,
        rotation: Vec3::ZERO,
        parts: vec![
            FurniturePart {
                shape: Shape::Box {
                    width: 1.6,
                    height: 0.06,
                    depth: 0.8,
                },
                offset: Vec3::new(0.0, 0.75, 0.0),
                material: wood.clone(),
            },
            leg(-0.72, -0.32),
            leg(0.72, -0.32),
            leg(-0.72, 0.32),
            leg(0.72, 0.32),
        ],
    }
}

fn cabinet(position: Vec3) -> FurnitureConfig {
    FurnitureConfig {
        name: "cabinet".to_string(),
        position,
        rotation: Vec3::ZERO,
        parts: vec![FurniturePart {
            shape: Shape::Box {
                width: 1.0,
                height: 1.8,
                depth: 0.5,
            },
            offset: Vec3::new(0.0, 0.9, 0.0),
            material: MaterialDesc::diffuse([0.6, 0.6, 0.65]),
        }],
    }
}

fn particle_fire() -> FireConfig {
    FireConfig {
        anchor: Vec3::new(0.0, 0.05, -3.0),
        variant: FireVariant::ParticleSystem(ParticleFireConfig {
            emitter: EmitterConfig::default(),
            ..Default::default()
        }),
    }
}

fn composite_extinguisher(position: Vec3) -> ExtinguisherConfig {
    let base = ExtinguisherConfig {
        position,
        body_height: 0.6,
        body_diameter: 0.2,
        ..Default::default()
    };
    let nozzle = NozzleConfig::default();
    let top = base.nozzle_offset(&nozzle) + Vec3::new(0.0, nozzle.height * 0.5, 0.0);
    ExtinguisherConfig {
        hose: Some(HoseConfig {
            path: vec![
                top,
                top + Vec3::new(0.12, 0.02, 0.0),
                Vec3::new(0.16, 0.3, 0.0),
                Vec3::new(0.14, 0.1, 0.05),
            ],
            radius: 0.015,
            color: [0.1, 0.1, 0.1],
        }),
        nozzle: Some(nozzle),
        ..base
    }
}

fn training_room() -> SceneConfig {
    let mut surfaces = vec![
        SurfaceConfig::new(
            SurfaceKind::Floor,
            Shape::Ground {
                width: 2.0 * ROOM_HALF,
                depth: 2.0 * ROOM_HALF,
            },
            Vec3::ZERO,
        )
        .named("floor")
        .with_material(MaterialDesc::diffuse([0.35, 0.3, 0.25])),
        SurfaceConfig::new(
            SurfaceKind::Ceiling,
            Shape::Ground {
                width: 2.0 * ROOM_HALF,
                depth: 2.0 * ROOM_HALF,
            },
            Vec3::new(0.0, WALL_HEIGHT, 0.0),
        )
        .named("ceiling")
        .rotated(Vec3::new(PI, 0.0, 0.0))
        .with_material(MaterialDesc::diffuse([0.9, 0.9, 0.9])),
    ];
    surfaces.extend(four_walls([0.85, 0.85, 0.8]));

    SceneConfig {
        name: ScenePreset::TrainingRoom.name().to_string(),
        surface: SurfaceSettings::default(),
        camera: CameraConfig {
            alpha: -FRAC_PI_2,
            beta: 1.2,
            radius: 4.0,
            target: Vec3::new(0.0, 1.0, -2.0),
        },
        light: LightConfig {
            direction: Vec3::new(0.0, 1.0, 0.0),
            intensity: 0.9,
        },
        environment: EnvironmentConfig {
            surfaces,
            furniture: vec![table(Vec3::new(-2.5, 0.0, -3.5)), cabinet(Vec3::new(3.5, 0.0, -4.5))],
        },
        fire: particle_fire(),
        extinguisher: composite_extinguisher(Vec3::new(1.5, 0.0, -2.0)),
        feedback: FeedbackConfig::Notification {
            message: DEFAULT_CONFIRMATION.to_string(),
        },
        xr: Some(XrSessionOptions {
            session_mode: SessionMode::ImmersiveAr,
            reference_space_type: ReferenceSpaceType::LocalFloor,
            optional_features: OptionalFeatures::All(true),
        }),
    }
}

fn open_room() -> SceneConfig {
    let mut surfaces = vec![SurfaceConfig::new(
        SurfaceKind::Floor,
        Shape::Ground {
            width: 2.0 * ROOM_HALF,
            depth: 2.0 * ROOM_HALF,
        },
        Vec3::ZERO,
    )
    .named("floor")
    .with_material(MaterialDesc::diffuse([0.45, 0.45, 0.45]))];
    surfaces.extend(four_walls([0.75, 0.78, 0.8]));

    SceneConfig {
        name: ScenePreset::OpenRoom.name().to_string(),
        surface: SurfaceSettings::default(),
        camera: CameraConfig {
            alpha: -FRAC_PI_2,
            beta: 1.1,
            radius: 6.0,
            target: Vec3::new(0.0, 0.5, -2.0),
        },
        light: LightConfig::default(),
        environment: EnvironmentConfig {
            surfaces,
            furniture: vec![table(Vec3::new(2.5, 0.0, -3.5))],
        },
        fire: particle_fire(),
        extinguisher: composite_extinguisher(Vec3::new(-1.5, 0.0, -2.0)),
        feedback: FeedbackConfig::Notification {
            message: DEFAULT_CONFIRMATION.to_string(),
        },
        xr: Some(XrSessionOptions {
            session_mode: SessionMode::ImmersiveAr,
            reference_space_type: ReferenceSpaceType::LocalFloor,
            optional_features: OptionalFeatures::List(vec![
                "hit-test".to_string(),
                "dom-overlay".to_string(),
            ]),
        }),
    }
}
