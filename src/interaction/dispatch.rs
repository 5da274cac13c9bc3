use std::time::Duration;

use bevy::prelude::*;

use super::effects::{FluidShape, PropEffect};
use super::emergency::{activation_effects, restore_effects, EmergencyMode};
use super::lights::{DynamicLightSystem, LightSystems};
use super::nodes::ModelNodes;
use super::registry::{PropAction, PropConfig, PropRegistry};
use super::resolver::{CurrentTarget, Target};
use super::screen::MaterialKey;
use super::state::{StateKey, StateStore};
use crate::config::color_from_hex;

/// Key that toggles neon lights and doors.
pub const INTERACT_KEY: KeyCode = KeyCode::KeyE;

/// Everything a trigger may read or change.
pub struct InteractionContext<'a> {
    pub registry: &'a PropRegistry,
    pub nodes: &'a ModelNodes,
    pub lights: &'a LightSystems,
    pub states: &'a mut StateStore,
    pub emergency: &'a mut EmergencyMode,
    pub now: Duration,
}

/// Applies `key` to the current target. Returns the scene changes to make.
pub fn dispatch(
    target: Option<&CurrentTarget>,
    key: KeyCode,
    ctx: &mut InteractionContext,
) -> Vec<PropEffect> {
    let Some(target) = target else {
        return Vec::new();
    };
    if let Some(kind) = target.target.kind(ctx.registry) {
        debug!("{:?} pressed on {:?} target", key, kind);
    }
    match &target.target {
        Target::Prop(index) => {
            let Some(prop) = ctx.registry.get(*index) else {
                return Vec::new();
            };
            if prop.trigger_key.map(|k| k.key_code()) != Some(key) {
                return Vec::new();
            }
            trigger_prop(prop, ctx)
        }
        Target::Light(light) => {
            if key != INTERACT_KEY {
                return Vec::new();
            }
            match ctx.lights.get(light) {
                Some(system) => toggle_light(system, ctx),
                None => Vec::new(),
            }
        }
        Target::Door(doorway) => {
            if key != INTERACT_KEY {
                return Vec::new();
            }
            if let Some(door) = ctx.states.door_mut(doorway) {
                if !door.motion.toggle() {
                    debug!("Door {} is moving, toggle ignored", doorway);
                }
            }
            Vec::new()
        }
    }
}

fn trigger_prop(prop: &PropConfig, ctx: &mut InteractionContext) -> Vec<PropEffect> {
    let key = StateKey::Prop(prop.id.clone());
    match &prop.action {
        PropAction::ToggleVisibility { affected, .. } => {
            let nodes: Vec<Entity> = affected
                .iter()
                .filter_map(|name| ctx.nodes.lookup_or_warn(&prop.owner, name))
                .collect();
            vec![PropEffect::FlipVisibility { nodes }]
        }
        PropAction::ToggleScreenMaterial {
            on,
            off,
            initially_on,
            ..
        } => {
            let now_on = !ctx.states.switch(&key).unwrap_or(*initially_on);
            ctx.states.set_switch(key, now_on);
            debug!("Screen {} switched {}", prop.id, if now_on { "on" } else { "off" });
            prop.nodes
                .iter()
                .filter_map(|name| ctx.nodes.lookup(&prop.owner, name))
                .map(|node| PropEffect::SetScreen {
                    key: MaterialKey {
                        prop: prop.id.clone(),
                        node,
                    },
                    on: now_on,
                    config: if now_on { *on } else { *off },
                })
                .collect()
        }
        PropAction::ToggleFluidEffect {
            position,
            radius,
            height,
            color,
            ..
        } => {
            let now_on = !ctx.states.switch(&key).unwrap_or(false);
            ctx.states.set_switch(key, now_on);
            vec![PropEffect::SetFluid {
                prop: prop.id.clone(),
                shape: FluidShape {
                    position: Vec3::from(*position),
                    radius: *radius,
                    height: *height,
                    color: color_from_hex(*color),
                },
                visible: now_on,
            }]
        }
        PropAction::StartGlobalEvent { .. } => {
            if ctx.states.mission_active(&prop.id) || ctx.emergency.is_active() {
                return Vec::new();
            }
            ctx.states.set_mission(&prop.id, true);
            ctx.emergency.activate(ctx.now);
            let mut effects = activation_effects(ctx.lights, ctx.emergency.color());
            effects.push(PropEffect::EmergencyStarted);
            effects
        }
        PropAction::LookRotate { .. } => Vec::new(),
    }
}

fn toggle_light(system: &DynamicLightSystem, ctx: &mut InteractionContext) -> Vec<PropEffect> {
    if ctx.emergency.is_active() {
        return Vec::new();
    }
    let key = StateKey::Light(system.key.clone());
    let now_on = !ctx.states.switch(&key).unwrap_or(system.baseline.visible);
    ctx.states.set_switch(key, now_on);

    let baseline = system.baseline;
    vec![
        PropEffect::SetLight {
            light: system.light,
            visible: now_on,
            color: baseline.color,
            intensity: if now_on { baseline.intensity } else { 0.0 },
        },
        PropEffect::SetEmissive {
            mesh: system.mesh,
            color: baseline.emissive_color,
            intensity: if now_on {
                baseline.emissive_intensity
            } else {
                0.0
            },
        },
    ]
}

/// Leaves emergency mode and hard-resets lights, missions and rotating props to their baselines.
pub fn end_emergency(ctx: &mut InteractionContext) -> Vec<PropEffect> {
    if !ctx.emergency.deactivate() {
        return Vec::new();
    }
    let mut effects = restore_effects(ctx.lights);
    for system in ctx.lights.iter() {
        ctx.states
            .set_switch(StateKey::Light(system.key.clone()), system.baseline.visible);
    }
    ctx.states.clear_missions();
    for (_, rotating) in ctx.states.rotations_mut() {
        effects.push(PropEffect::SetRotation {
            node: rotating.node,
            rotation: rotating.rotation.reset(),
        });
    }
    effects.push(PropEffect::EmergencyEnded);
    effects
}
