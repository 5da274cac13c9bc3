pub mod components;
pub mod styles;
pub mod systems;

use bevy::prelude::*;

use crate::game_state::AppState;
use systems::*;

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud)
            .add_systems(OnEnter(AppState::InGame), cleanup_loading_overlay)
            .add_systems(Update, (toggle_fps_counter, update_fps_counter))
            .add_systems(
                Update,
                (
                    update_hint_label,
                    update_emergency_banner,
                    update_ghost_banner,
                    update_pause_overlay,
                )
                    .after(crate::interaction::systems::sync_hint)
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
