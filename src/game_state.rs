use bevy::prelude::*;

/// Top-level application states.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    /// Station model still loading; interactive state is not valid yet.
    #[default]
    Loading,
    InGame,
}
