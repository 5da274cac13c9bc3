pub mod components;
pub mod systems;

use bevy::prelude::*;

pub use components::{CameraController, GhostMode, Player, MOUSE_SENSITIVITY, PITCH_LIMIT};

use crate::game_state::AppState;
use systems::{player_movement, toggle_ghost_mode};

/// Everything that moves or turns the player this frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovementSet;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GhostMode>().add_systems(
            Update,
            (toggle_ghost_mode, player_movement)
                .chain()
                .in_set(MovementSet)
                .run_if(in_state(AppState::InGame)),
        );
    }
}
