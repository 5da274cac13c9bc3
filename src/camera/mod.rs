pub mod systems;

use bevy::prelude::*;

pub use systems::PointerLock;

use crate::game_state::AppState;
use crate::player::MovementSet;
use systems::{center_cursor, grab_cursor, lock_on_click, mouse_look, release_on_escape, toggle_bloom};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerLock>()
            .add_systems(OnEnter(AppState::InGame), grab_cursor)
            .add_systems(
                Update,
                (
                    (release_on_escape, lock_on_click, mouse_look)
                        .chain()
                        .in_set(MovementSet)
                        .before(crate::player::systems::player_movement),
                    center_cursor,
                    toggle_bloom,
                )
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
