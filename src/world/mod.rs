pub mod setup;
pub mod station;

use bevy::prelude::*;

use crate::game_state::AppState;
use setup::setup_world;
use station::{on_station_ready, spawn_station, watch_station_load};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(on_station_ready)
            .add_systems(Startup, (setup_world, spawn_station))
            .add_systems(
                Update,
                watch_station_load.run_if(in_state(AppState::Loading)),
            );
    }
}
