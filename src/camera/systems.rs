use bevy::{
    core_pipeline::bloom::{Bloom, BloomPrefilter},
    input::mouse::MouseMotion,
    prelude::*,
    window::{CursorGrabMode, PrimaryWindow},
};

use crate::config::{BloomSettings, StationConfig};
use crate::player::{CameraController, Player, MOUSE_SENSITIVITY, PITCH_LIMIT};

/// Whether the pointer is captured for mouse look. Interaction and movement only run while locked.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PointerLock(pub bool);

impl PointerLock {
    pub fn is_locked(&self) -> bool {
        self.0
    }
}

fn set_grab(window: &mut Window, lock: &mut PointerLock, locked: bool) {
    if locked {
        window.cursor_options.grab_mode = CursorGrabMode::Confined;
        window.cursor_options.visible = false;
    } else {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
    if lock.0 != locked {
        debug!("Pointer {}", if locked { "locked" } else { "unlocked" });
    }
    lock.0 = locked;
}

/// Bloom component built from config.
pub fn bloom(settings: &BloomSettings) -> Bloom {
    Bloom {
        intensity: settings.intensity,
        prefilter: BloomPrefilter {
            threshold: settings.threshold,
            threshold_softness: 0.2,
        },
        ..Bloom::NATURAL
    }
}

pub fn grab_cursor(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut lock: ResMut<PointerLock>,
) {
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };
    set_grab(&mut window, &mut lock, true);
}

pub fn release_on_escape(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut lock: ResMut<PointerLock>,
) {
    if !keyboard_input.just_pressed(KeyCode::Escape) || !lock.is_locked() {
        return;
    }
    if let Ok(mut window) = windows.get_single_mut() {
        set_grab(&mut window, &mut lock, false);
    }
}

/// Clicking anywhere while unlocked takes the pointer back.
pub fn lock_on_click(
    mouse_input: Res<ButtonInput<MouseButton>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut lock: ResMut<PointerLock>,
) {
    if lock.is_locked() || !mouse_input.just_pressed(MouseButton::Left) {
        return;
    }
    if let Ok(mut window) = windows.get_single_mut() {
        set_grab(&mut window, &mut lock, true);
    }
}

pub fn mouse_look(
    mut mouse_motion: EventReader<MouseMotion>,
    mut query: Query<(&mut Transform, &mut CameraController), With<Player>>,
    lock: Res<PointerLock>,
) {
    // Only process mouse look when cursor is grabbed
    if !lock.is_locked() {
        mouse_motion.clear();
        return;
    }

    let Ok((mut transform, mut controller)) = query.get_single_mut() else {
        return;
    };

    for event in mouse_motion.read() {
        controller.yaw -= event.delta.x * MOUSE_SENSITIVITY;
        controller.pitch -= event.delta.y * MOUSE_SENSITIVITY;

        // Clamp pitch to prevent flipping
        controller.pitch = controller.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    transform.rotation = Quat::from_euler(EulerRot::YXZ, controller.yaw, controller.pitch, 0.0);
}

pub fn center_cursor(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    lock: Res<PointerLock>,
) {
    let Ok(mut window) = windows.get_single_mut() else {
        return;
    };

    // Only center cursor when it's grabbed and window is focused
    if lock.is_locked() && window.focused {
        let center = Vec2::new(window.width() / 2.0, window.height() / 2.0);
        window.set_cursor_position(Some(center));
    }
}

/// `O` switches bloom on the player camera.
pub fn toggle_bloom(
    mut commands: Commands,
    keyboard_input: Res<ButtonInput<KeyCode>>,
    lock: Res<PointerLock>,
    config: Res<StationConfig>,
    cameras: Query<(Entity, Has<Bloom>), With<Player>>,
) {
    if !lock.is_locked() || !keyboard_input.just_pressed(KeyCode::KeyO) {
        return;
    }
    for (entity, has_bloom) in cameras.iter() {
        if has_bloom {
            commands.entity(entity).remove::<Bloom>();
        } else {
            commands.entity(entity).insert(bloom(&config.bloom));
        }
        info!("Bloom {}", if has_bloom { "disabled" } else { "enabled" });
    }
}
