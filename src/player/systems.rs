use bevy::prelude::*;

use super::components::{GhostMode, Player};
use crate::camera::PointerLock;
use crate::config::{PlayerConfig, StationConfig};

/// Horizontal input in camera space: -z forward, +x right. WASD and arrow keys.
pub fn input_direction(keyboard_input: &ButtonInput<KeyCode>) -> Vec3 {
    let mut direction = Vec3::ZERO;

    if keyboard_input.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        direction.z -= 1.0;
    }
    if keyboard_input.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        direction.z += 1.0;
    }
    if keyboard_input.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        direction.x -= 1.0;
    }
    if keyboard_input.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        direction.x += 1.0;
    }

    // Normalize diagonal movement
    direction.normalize_or_zero()
}

/// Keeps a walking player on the floor and inside the walkable area.
pub fn constrain_walker(translation: Vec3, config: &PlayerConfig) -> Vec3 {
    let [min_x, min_z, max_x, max_z] = config.walk_bounds;
    Vec3::new(
        translation.x.clamp(min_x, max_x),
        config.eye_height,
        translation.z.clamp(min_z, max_z),
    )
}

pub fn toggle_ghost_mode(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    lock: Res<PointerLock>,
    mut ghost: ResMut<GhostMode>,
) {
    if lock.is_locked() && keyboard_input.just_pressed(KeyCode::KeyG) {
        ghost.0 = !ghost.0;
        info!("Ghost mode {}", if ghost.0 { "enabled" } else { "disabled" });
    }
}

pub fn player_movement(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    config: Res<StationConfig>,
    lock: Res<PointerLock>,
    ghost: Res<GhostMode>,
    mut query: Query<&mut Transform, With<Player>>,
) {
    let Ok(mut transform) = query.get_single_mut() else {
        return;
    };
    if !lock.is_locked() {
        return;
    }

    let player = &config.player;
    let delta = time.delta_secs().min(config.interaction.max_frame_delta);
    let direction = input_direction(&keyboard_input);

    let mut speed = player.speed;
    if keyboard_input.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
        speed *= player.sprint_multiplier;
    }

    // Apply movement relative to camera facing direction (only yaw)
    let forward = transform.forward();
    let forward_flat = Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero();
    let right_flat = Vec3::new(-forward.z, 0.0, forward.x).normalize_or_zero();
    let move_direction = forward_flat * -direction.z + right_flat * direction.x;

    transform.translation += move_direction * speed * delta;

    if ghost.0 {
        let mut vertical = 0.0;
        if keyboard_input.pressed(KeyCode::Space) {
            vertical += 1.0;
        }
        if keyboard_input.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
            vertical -= 1.0;
        }
        transform.translation.y += vertical * player.noclip_vertical_speed * delta;
    } else {
        transform.translation = constrain_walker(transform.translation, player);
    }
}
