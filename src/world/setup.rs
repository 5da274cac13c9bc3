use bevy::{
    core_pipeline::tonemapping::Tonemapping,
    pbr::{DistanceFog, FogFalloff},
    prelude::*,
};

use crate::camera::systems::bloom;
use crate::config::{color_from_hex, StationConfig};
use crate::player::{CameraController, Player};

/// Background, fog, ambient light and the player camera.
pub fn setup_world(mut commands: Commands, config: Res<StationConfig>) {
    let scene = &config.scene;
    commands.insert_resource(ClearColor(color_from_hex(scene.background_color)));
    commands.insert_resource(AmbientLight {
        color: color_from_hex(scene.ambient_color),
        brightness: scene.ambient_brightness,
    });

    // Fill light so the station is readable before any neon is registered
    commands.spawn((
        DirectionalLight {
            illuminance: 2_000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 7.5).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let camera = &config.camera;
    let mut player = commands.spawn((
        Player,
        CameraController::default(),
        Camera3d::default(),
        Camera {
            hdr: true,
            ..default()
        },
        Tonemapping::AcesFitted,
        Projection::Perspective(PerspectiveProjection {
            fov: camera.fov.to_radians(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        DistanceFog {
            color: color_from_hex(scene.fog_color),
            falloff: FogFalloff::Linear {
                start: scene.fog_near,
                end: scene.fog_far,
            },
            ..default()
        },
        Transform::from_translation(Vec3::from(camera.initial_position))
            .with_rotation(Quat::from_rotation_y(std::f32::consts::PI)),
    ));
    if config.bloom.enabled {
        player.insert(bloom(&config.bloom));
    }
    info!("World set up");
}
