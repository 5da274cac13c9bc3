mod camera;
mod config;
mod game_state;
mod hud;
mod interaction;
mod player;
mod world;

use bevy::{
    diagnostic::{FrameTimeDiagnosticsPlugin, LogDiagnosticsPlugin},
    prelude::*,
    window::PresentMode,
};

use camera::CameraPlugin;
use config::ConfigPlugin;
use game_state::AppState;
use hud::HudPlugin;
use interaction::InteractionPlugin;
use player::PlayerPlugin;
use world::WorldPlugin;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Orbital Walk".to_string(),
                    present_mode: PresentMode::AutoNoVsync,
                    ..default()
                }),
                ..default()
            }),
        )
        .add_plugins((
            FrameTimeDiagnosticsPlugin::default(),
            LogDiagnosticsPlugin::default(),
        ))
        .add_plugins(ConfigPlugin::default())
        .init_state::<AppState>()
        .add_plugins((
            WorldPlugin,
            PlayerPlugin,
            CameraPlugin,
            InteractionPlugin,
            HudPlugin,
        ))
        .run();
}
