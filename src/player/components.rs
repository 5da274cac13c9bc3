use bevy::prelude::*;

/// Marker for the player entity. The player is the camera.
#[derive(Component)]
pub struct Player;

/// Camera controller for first-person mouse look.
#[derive(Component)]
pub struct CameraController {
    pub pitch: f32,
    pub yaw: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            yaw: std::f32::consts::PI, // Start facing +Z, into the station
        }
    }
}

/// Noclip flight. Lifts the eye-height lock and the walk bounds.
#[derive(Resource, Debug, Default)]
pub struct GhostMode(pub bool);

// Mouse look constants
pub const MOUSE_SENSITIVITY: f32 = 0.002;
pub const PITCH_LIMIT: f32 = 1.5; // ~86 degrees, just under 90
