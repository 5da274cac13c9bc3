use bevy::{asset::LoadState, prelude::*, scene::SceneInstanceReady};

use crate::config::StationConfig;
use crate::game_state::AppState;
use crate::interaction::systems::collect_named_nodes;
use crate::interaction::ModelNodes;

/// Root of a loaded model, tagged with its config id.
#[derive(Component, Debug)]
pub struct StationModel {
    pub id: String,
}

/// Handle of the station glTF, watched for load failures.
#[derive(Resource)]
pub struct StationAsset(pub Handle<Gltf>);

pub fn spawn_station(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<StationConfig>,
) {
    let model = &config.model;
    info!("Loading {} from {}", model.id, model.path);
    commands.insert_resource(StationAsset(asset_server.load(model.path.clone())));
    commands.spawn((
        StationModel {
            id: model.id.clone(),
        },
        Name::new(model.id.clone()),
        SceneRoot(asset_server.load(GltfAssetLabel::Scene(0).from_asset(model.path.clone()))),
        model.transform(),
    ));
}

/// Indexes the named nodes of a freshly spawned model and starts the game.
pub fn on_station_ready(
    trigger: Trigger<SceneInstanceReady>,
    models: Query<&StationModel>,
    children: Query<&Children>,
    names: Query<&Name>,
    mut nodes: ResMut<ModelNodes>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Ok(model) = models.get(trigger.entity()) else {
        return;
    };
    let found = collect_named_nodes(trigger.entity(), &children, &names);
    info!("Indexed {} named nodes in {}", found.len(), model.id);
    nodes.insert_model(model.id.clone(), found);
    next_state.set(AppState::InGame);
}

/// A station that fails to load still lets the player in, with nothing to interact with.
pub fn watch_station_load(
    asset_server: Res<AssetServer>,
    station: Option<Res<StationAsset>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(station) = station else {
        return;
    };
    if let LoadState::Failed(e) = asset_server.load_state(&station.0) {
        error!("Failed to load station model: {}", e);
        next_state.set(AppState::InGame);
    }
}
