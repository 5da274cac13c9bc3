use bevy::prelude::*;

/// Marker for the crosshair container.
#[derive(Component)]
pub struct Crosshair;

/// Marker for the interaction hint under the crosshair.
#[derive(Component)]
pub struct HintLabel;

/// Emergency banner with the time left before it hides itself.
#[derive(Component)]
pub struct EmergencyBanner(pub Timer);

/// Marker for the ghost mode banner.
#[derive(Component)]
pub struct GhostBanner;

/// Marker for the FPS readout.
#[derive(Component)]
pub struct FpsCounter;

/// Marker for the full-screen loading overlay.
#[derive(Component)]
pub struct LoadingOverlay;

/// Marker for the pause overlay shown while the pointer is free.
#[derive(Component)]
pub struct PauseOverlay;

/// Marker for the instructions text inside the pause overlay.
#[derive(Component)]
pub struct PauseText;
