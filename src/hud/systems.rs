use bevy::{
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};

use super::components::*;
use super::styles::*;
use crate::camera::PointerLock;
use crate::config::StationConfig;
use crate::interaction::{HintText, PropEffect};
use crate::player::GhostMode;

fn shown(visible: bool) -> Visibility {
    if visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    }
}

pub fn setup_hud(mut commands: Commands, config: Res<StationConfig>) {
    // Crosshair with the hint just below it
    commands
        .spawn((Crosshair, overlay_style()))
        .with_children(|parent| {
            parent.spawn((
                Node {
                    width: Val::Px(4.0),
                    height: Val::Px(4.0),
                    ..default()
                },
                BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.7)),
            ));
            parent.spawn((
                HintLabel,
                Text::new(""),
                hud_text_style(),
                TextColor(HUD_TEXT_COLOR),
                BackgroundColor(PANEL_BACKGROUND),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Percent(55.0),
                    ..panel_style()
                },
                Visibility::Hidden,
            ));
        });

    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            position_type: PositionType::Absolute,
            top: Val::Px(40.0),
            justify_content: JustifyContent::Center,
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                EmergencyBanner(Timer::from_seconds(
                    config.emergency.hud_duration,
                    TimerMode::Once,
                )),
                Text::new("EMERGENCY MODE ACTIVE - press L to cancel"),
                banner_text_style(),
                TextColor(EMERGENCY_TEXT_COLOR),
                BackgroundColor(PANEL_BACKGROUND),
                panel_style(),
                Visibility::Hidden,
            ));
        });

    commands.spawn((
        GhostBanner,
        Text::new("GHOST MODE"),
        hud_text_style(),
        TextColor(GHOST_TEXT_COLOR),
        BackgroundColor(PANEL_BACKGROUND),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(20.0),
            top: Val::Px(20.0),
            ..panel_style()
        },
        Visibility::Hidden,
    ));

    commands.spawn((
        FpsCounter,
        Text::new("FPS: --"),
        hud_text_style(),
        TextColor(HUD_TEXT_COLOR),
        BackgroundColor(PANEL_BACKGROUND),
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(20.0),
            top: Val::Px(20.0),
            ..panel_style()
        },
        Visibility::Hidden,
    ));

    commands
        .spawn((
            PauseOverlay,
            overlay_style(),
            BackgroundColor(OVERLAY_BACKGROUND),
            Visibility::Hidden,
        ))
        .with_children(|parent| {
            parent.spawn((
                PauseText,
                Text::new(MAIN_INSTRUCTIONS),
                overlay_text_style(),
                TextColor(HUD_TEXT_COLOR),
                TextLayout::new_with_justify(JustifyText::Center),
            ));
        });

    commands
        .spawn((
            LoadingOverlay,
            overlay_style(),
            BackgroundColor(Color::srgb(0.02, 0.02, 0.04)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Loading station..."),
                overlay_text_style(),
                TextColor(HUD_TEXT_COLOR),
            ));
        });
}

pub fn cleanup_loading_overlay(mut commands: Commands, query: Query<Entity, With<LoadingOverlay>>) {
    for entity in query.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn update_hint_label(
    hint: Res<HintText>,
    mut query: Query<(&mut Text, &mut Visibility), With<HintLabel>>,
) {
    if !hint.is_changed() {
        return;
    }
    for (mut text, mut visibility) in query.iter_mut() {
        match &hint.0 {
            Some(message) => {
                text.0.clone_from(message);
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

/// Shows the banner when an emergency starts and hides it after a delay, on end, or when unlocked.
pub fn update_emergency_banner(
    time: Res<Time>,
    lock: Res<PointerLock>,
    mut events: EventReader<PropEffect>,
    mut query: Query<(&mut EmergencyBanner, &mut Visibility)>,
) {
    for event in events.read() {
        for (mut banner, mut visibility) in query.iter_mut() {
            match event {
                PropEffect::EmergencyStarted => {
                    banner.0.reset();
                    *visibility = Visibility::Inherited;
                }
                PropEffect::EmergencyEnded => *visibility = Visibility::Hidden,
                _ => {}
            }
        }
    }

    for (mut banner, mut visibility) in query.iter_mut() {
        if *visibility == Visibility::Hidden {
            continue;
        }
        banner.0.tick(time.delta());
        if banner.0.finished() || !lock.is_locked() {
            *visibility = Visibility::Hidden;
        }
    }
}

pub fn update_ghost_banner(
    ghost: Res<GhostMode>,
    lock: Res<PointerLock>,
    mut query: Query<&mut Visibility, With<GhostBanner>>,
) {
    for mut visibility in query.iter_mut() {
        visibility.set_if_neq(shown(ghost.0 && lock.is_locked()));
    }
}

pub fn update_pause_overlay(
    ghost: Res<GhostMode>,
    lock: Res<PointerLock>,
    mut overlay: Query<&mut Visibility, With<PauseOverlay>>,
    mut text: Query<&mut Text, With<PauseText>>,
) {
    for mut visibility in overlay.iter_mut() {
        visibility.set_if_neq(shown(!lock.is_locked()));
    }
    if !ghost.is_changed() {
        return;
    }
    for mut text in text.iter_mut() {
        let instructions = if ghost.0 {
            GHOST_INSTRUCTIONS
        } else {
            MAIN_INSTRUCTIONS
        };
        text.0 = instructions.to_string();
    }
}

/// `P` shows or hides the FPS readout.
pub fn toggle_fps_counter(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut Visibility, With<FpsCounter>>,
) {
    if !keyboard_input.just_pressed(KeyCode::KeyP) {
        return;
    }
    for mut visibility in query.iter_mut() {
        *visibility = shown(*visibility == Visibility::Hidden);
    }
}

pub fn update_fps_counter(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<(&mut Text, &Visibility), With<FpsCounter>>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed());
    for (mut text, visibility) in query.iter_mut() {
        if *visibility == Visibility::Hidden {
            continue;
        }
        if let Some(fps) = fps {
            text.0 = format!("FPS: {fps:.0}");
        }
    }
}
