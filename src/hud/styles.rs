use bevy::prelude::*;

pub const HUD_TEXT_COLOR: Color = Color::srgb(0.9, 0.9, 0.9);
pub const PANEL_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.7);
pub const OVERLAY_BACKGROUND: Color = Color::srgba(0.0, 0.0, 0.0, 0.8);
pub const EMERGENCY_TEXT_COLOR: Color = Color::srgb(1.0, 0.25, 0.25);
pub const GHOST_TEXT_COLOR: Color = Color::srgb(0.5, 0.9, 1.0);

pub const MAIN_INSTRUCTIONS: &str = "Click to play\n\n\
    WASD / arrows: move    Shift: sprint    Mouse: look\n\
    E: interact    F: mission panel    L: end emergency\n\
    G: ghost mode    O: bloom    P: FPS    Esc: pause";

pub const GHOST_INSTRUCTIONS: &str = "Ghost mode paused, click to resume\n\n\
    WASD / arrows: fly    Space / Ctrl: up / down\n\
    G: leave ghost mode    Esc: pause";

pub fn hud_text_style() -> TextFont {
    TextFont {
        font_size: 20.0,
        ..default()
    }
}

pub fn banner_text_style() -> TextFont {
    TextFont {
        font_size: 28.0,
        ..default()
    }
}

pub fn overlay_text_style() -> TextFont {
    TextFont {
        font_size: 24.0,
        ..default()
    }
}

/// Padded panel behind short HUD text.
pub fn panel_style() -> Node {
    Node {
        padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
        ..default()
    }
}

/// Full-screen, centred container.
pub fn overlay_style() -> Node {
    Node {
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        position_type: PositionType::Absolute,
        flex_direction: FlexDirection::Column,
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        ..default()
    }
}
