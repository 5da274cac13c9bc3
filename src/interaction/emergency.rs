use std::time::Duration;

use bevy::prelude::*;

use super::effects::PropEffect;
use super::lights::LightSystems;

/// Global emergency override: recolours affected neon lights and blinks them in sync.
#[derive(Resource, Debug, Clone)]
pub struct EmergencyMode {
    active: bool,
    anchor: Duration,
    visuals_on: bool,
    interval: Duration,
    color: Color,
}

impl EmergencyMode {
    pub fn new(color: Color, interval: Duration) -> Self {
        Self {
            active: false,
            anchor: Duration::ZERO,
            visuals_on: true,
            interval,
            color,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Starts the override at `now`. Returns false if it was already running.
    pub fn activate(&mut self, now: Duration) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.anchor = now;
        self.visuals_on = true;
        info!("Emergency mode activated");
        true
    }

    pub fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.active = false;
        self.anchor = Duration::ZERO;
        self.visuals_on = true;
        info!("Emergency mode deactivated");
        true
    }

    /// Flips the blink phase once per interval. Returns the new phase when it flips.
    pub fn tick(&mut self, now: Duration) -> Option<bool> {
        if !self.active || now.saturating_sub(self.anchor) <= self.interval {
            return None;
        }
        self.visuals_on = !self.visuals_on;
        self.anchor = now;
        Some(self.visuals_on)
    }
}

/// Immediate recolour of every affected light when the emergency starts.
pub fn activation_effects(lights: &LightSystems, color: Color) -> Vec<PropEffect> {
    let mut effects = Vec::new();
    for system in lights.iter().filter(|s| s.emergency_affected) {
        effects.push(PropEffect::SetLight {
            light: system.light,
            visible: true,
            color,
            intensity: system.baseline.intensity,
        });
        effects.push(PropEffect::SetEmissive {
            mesh: system.mesh,
            color,
            intensity: system.baseline.emissive_intensity,
        });
    }
    effects
}

/// Synchronised blink phase for every affected light.
pub fn blink_effects(lights: &LightSystems, color: Color, on: bool) -> Vec<PropEffect> {
    let mut effects = Vec::new();
    for system in lights.iter().filter(|s| s.emergency_affected) {
        effects.push(PropEffect::SetLight {
            light: system.light,
            visible: true,
            color,
            intensity: if on { system.baseline.intensity } else { 0.0 },
        });
        effects.push(PropEffect::SetEmissive {
            mesh: system.mesh,
            color,
            intensity: if on {
                system.baseline.emissive_intensity
            } else {
                0.0
            },
        });
    }
    effects
}

/// Hard reset of every light to its recorded baseline.
pub fn restore_effects(lights: &LightSystems) -> Vec<PropEffect> {
    let mut effects = Vec::new();
    for system in lights.iter() {
        let baseline = system.baseline;
        effects.push(PropEffect::SetLight {
            light: system.light,
            visible: baseline.visible,
            color: baseline.color,
            intensity: baseline.intensity,
        });
        effects.push(PropEffect::SetEmissive {
            mesh: system.mesh,
            color: baseline.emissive_color,
            intensity: if baseline.visible {
                baseline.emissive_intensity
            } else {
                0.0
            },
        });
    }
    effects
}
