//! Scene setup - lights, camera, and one entity per scene graph node

use std::collections::HashMap;

use bevy::prelude::*;
use firedrill_core::{
    BlendMode, MaterialDesc, NodeId, Pose, Rgb, Rgba, SceneNode, Shape,
};

use crate::camera::{CameraSettings, MainCamera};
use crate::{DrillScene, DrillSettings};

/// Links an entity to the scene graph node it draws
#[derive(Component, Debug, Clone, Copy)]
pub struct SceneNodeEntity(pub NodeId);

/// Marker component for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Node id to entity lookup, filled at startup
#[derive(Resource, Debug, Default)]
pub struct NodeEntities(pub HashMap<NodeId, Entity>);

/// Plugin for scene setup and per-frame sync
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NodeEntities>()
            .add_systems(Startup, (setup_lights, spawn_scene_nodes))
            .add_systems(Update, (advance_scene, sync_scene_nodes).chain());
    }
}

pub fn rgb(c: Rgb) -> Color {
    Color::srgb(c[0], c[1], c[2])
}

pub fn rgba(c: Rgba) -> Color {
    Color::srgba(c[0], c[1], c[2], c[3])
}

pub fn vec3(v: glam::Vec3) -> Vec3 {
    Vec3::from_array(v.to_array())
}

pub fn pose_transform(pose: &Pose) -> Transform {
    Transform {
        translation: vec3(pose.position),
        rotation: Quat::from_array(pose.quat().to_array()),
        scale: vec3(pose.scale),
    }
}

fn setup_lights(mut commands: Commands, settings: Res<DrillSettings>, camera: Res<CameraSettings>) {
    let light = &settings.0.light;

    // Sky half of the hemisphere as a directional light, ground half as ambient
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.05,
            far: 200.0,
            ..default()
        }),
        camera.transform(),
        AmbientLight {
            color: Color::WHITE,
            brightness: 300.0 * light.intensity,
            ..default()
        },
        MainCamera,
    ));

    let direction = vec3(light.direction).normalize_or(Vec3::Y);
    commands.spawn((
        DirectionalLight {
            illuminance: 6000.0 * light.intensity,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_translation(direction * 10.0).looking_at(Vec3::ZERO, up_for(direction)),
        MainDirectionalLight,
    ));
}

fn up_for(direction: Vec3) -> Vec3 {
    if direction.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    }
}

/// Mesh for a shape, or `None` for shapes drawn some other way
pub fn shape_mesh(shape: &Shape) -> Option<Mesh> {
    let mesh = match *shape {
        Shape::Box {
            width,
            height,
            depth,
        } => Cuboid::new(width, height, depth).mesh().build(),
        Shape::Sphere { diameter } => Sphere::new(diameter * 0.5).mesh().uv(32, 18),
        Shape::Cylinder { height, diameter } => Cylinder::new(diameter * 0.5, height).mesh().build(),
        Shape::Ground { width, depth } => Plane3d::default().mesh().size(width, depth).build(),
        Shape::Plane { width, height } => Plane3d::new(Vec3::Z, Vec2::new(width * 0.5, height * 0.5))
            .mesh()
            .build(),
        Shape::Tube { .. } | Shape::Empty => return None,
    };
    Some(mesh)
}

pub fn material(desc: &MaterialDesc, asset_server: &AssetServer) -> StandardMaterial {
    StandardMaterial {
        base_color: rgb(desc.diffuse),
        emissive: desc
            .emissive
            .map(|e| LinearRgba::from(rgb(e)))
            .unwrap_or(LinearRgba::BLACK),
        base_color_texture: desc.texture.as_ref().map(|path| asset_server.load(path.clone())),
        unlit: desc.unlit,
        perceptual_roughness: 0.8,
        ..default()
    }
}

pub fn alpha_mode(blend: BlendMode) -> AlphaMode {
    match blend {
        BlendMode::Opaque => AlphaMode::Opaque,
        BlendMode::Alpha => AlphaMode::Blend,
        BlendMode::Add => AlphaMode::Add,
    }
}

fn visibility(enabled: bool) -> Visibility {
    if enabled {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

fn spawn_scene_nodes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    drill: Res<DrillScene>,
    mut entities: ResMut<NodeEntities>,
) {
    for node in drill.ctx.graph.iter() {
        let mut entity = commands.spawn((
            Name::new(node.name.clone()),
            SceneNodeEntity(node.id),
            pose_transform(&node.pose),
            visibility(node.enabled),
        ));

        if let Some(parent) = node.parent.and_then(|p| entities.0.get(&p)) {
            entity.insert(ChildOf(*parent));
        }

        let handle = materials.add(material(&node.material, &asset_server));
        match (&node.shape, shape_mesh(&node.shape)) {
            (_, Some(mesh)) => {
                entity.insert((Mesh3d(meshes.add(mesh)), MeshMaterial3d(handle)));
            }
            (Shape::Tube { path, radius }, None) => {
                let radius = *radius;
                entity.with_children(|parent| {
                    for segment in path.windows(2) {
                        let (a, b) = (vec3(segment[0]), vec3(segment[1]));
                        let length = a.distance(b);
                        if length <= f32::EPSILON {
                            continue;
                        }
                        parent.spawn((
                            Mesh3d(meshes.add(Cylinder::new(radius, length))),
                            MeshMaterial3d(handle.clone()),
                            Transform::from_translation((a + b) * 0.5)
                                .with_rotation(Quat::from_rotation_arc(Vec3::Y, (b - a) / length)),
                        ));
                    }
                });
            }
            _ => {}
        }

        let id = entity.id();
        entities.0.insert(node.id, id);
    }

    tracing::info!(entities = entities.0.len(), "Scene nodes spawned");
}

/// Run ticks and emitters for this frame
pub fn advance_scene(mut drill: ResMut<DrillScene>, time: Res<Time>) {
    drill.ctx.advance(time.elapsed_secs_f64() * 1000.0);
}

fn node_changed(node: &SceneNode, transform: &Transform, vis: &Visibility) -> bool {
    *transform != pose_transform(&node.pose) || *vis != visibility(node.enabled)
}

/// Copy poses and visibility from the graph onto entities
fn sync_scene_nodes(
    drill: Res<DrillScene>,
    mut query: Query<(&SceneNodeEntity, &mut Transform, &mut Visibility)>,
) {
    for (link, mut transform, mut vis) in query.iter_mut() {
        let Some(node) = drill.ctx.graph.get(link.0) else {
            continue;
        };
        if node.role.is_static() {
            continue;
        }
        if node_changed(node, &transform, &vis) {
            *transform = pose_transform(&node.pose);
            *vis = visibility(node.enabled);
        }
    }
}
