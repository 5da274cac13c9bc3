pub mod dispatch;
pub mod door;
pub mod effects;
pub mod emergency;
pub mod lights;
pub mod nodes;
pub mod registry;
pub mod resolver;
pub mod rotate;
pub mod screen;
pub mod state;
pub mod systems;

use bevy::prelude::*;

pub use effects::PropEffect;
pub use nodes::ModelNodes;
pub use resolver::HintText;

use crate::game_state::AppState;
use crate::player::MovementSet;
use effects::{apply_prop_effects, FluidEffects};
use lights::LightSystems;
use resolver::LookTarget;
use screen::{fallback_black_texture, load_black_texture, ScreenMaterials};
use systems::{
    advance_animated_props, apply_initial_screens, check_prop_nodes, cleanup_on_exit,
    handle_emergency_cancel, handle_trigger_keys, init_interaction, init_rotating_props,
    register_neon_lights, resolve_look_target, spawn_doors, sync_hint, tick_emergency,
};

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelNodes>()
            .init_resource::<LightSystems>()
            .init_resource::<LookTarget>()
            .init_resource::<HintText>()
            .init_resource::<ScreenMaterials>()
            .init_resource::<FluidEffects>()
            .add_event::<PropEffect>()
            .add_systems(Startup, (init_interaction, load_black_texture))
            .add_systems(
                OnEnter(AppState::InGame),
                (
                    check_prop_nodes,
                    register_neon_lights,
                    spawn_doors,
                    init_rotating_props,
                    apply_initial_screens,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    advance_animated_props,
                    tick_emergency,
                    resolve_look_target,
                    handle_trigger_keys,
                    handle_emergency_cancel,
                    apply_prop_effects,
                    sync_hint,
                )
                    .chain()
                    .after(MovementSet)
                    .run_if(in_state(AppState::InGame)),
            )
            .add_systems(Update, fallback_black_texture)
            .add_systems(Last, cleanup_on_exit);
    }
}
