use std::collections::BTreeMap;

use bevy::prelude::*;

use super::door::DoorMotion;
use super::lights::LightKey;
use super::registry::{PropAction, PropRegistry};
use super::rotate::RotationState;

/// Key of a state record: a configured prop, a discovered light or a spawned door.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    Prop(String),
    Light(LightKey),
    Door(String),
}

/// A door panel, its interaction volume and its motion.
#[derive(Debug, Clone)]
pub struct DynamicDoor {
    pub panel: Entity,
    pub volume: Entity,
    pub motion: DoorMotion,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatingProp {
    pub node: Entity,
    pub rotation: RotationState,
}

/// Mutable per-prop state. Visibility toggles have no record; they read the live geometry.
#[derive(Debug, Clone)]
pub enum InteractionState {
    Switch(bool),
    Door(DynamicDoor),
    Rotation(RotatingProp),
    Mission { active: bool },
}

#[derive(Resource, Debug, Default)]
pub struct StateStore {
    states: BTreeMap<StateKey, InteractionState>,
}

impl StateStore {
    /// Seeds the records whose defaults come straight from configuration.
    pub fn seed_from_registry(&mut self, registry: &PropRegistry) {
        for (_, prop) in registry.iter() {
            let state = match &prop.action {
                PropAction::ToggleScreenMaterial { initially_on, .. } => {
                    InteractionState::Switch(*initially_on)
                }
                PropAction::ToggleFluidEffect { .. } => InteractionState::Switch(false),
                PropAction::StartGlobalEvent { .. } => InteractionState::Mission { active: false },
                // Needs the node's orientation, inserted once the model is indexed.
                PropAction::LookRotate { .. } => continue,
                PropAction::ToggleVisibility { .. } => continue,
            };
            self.states.insert(StateKey::Prop(prop.id.clone()), state);
        }
    }

    pub fn insert(&mut self, key: StateKey, state: InteractionState) {
        self.states.insert(key, state);
    }

    pub fn get(&self, key: &StateKey) -> Option<&InteractionState> {
        self.states.get(key)
    }

    pub fn switch(&self, key: &StateKey) -> Option<bool> {
        match self.states.get(key)? {
            InteractionState::Switch(on) => Some(*on),
            _ => None,
        }
    }

    pub fn set_switch(&mut self, key: StateKey, on: bool) {
        self.states.insert(key, InteractionState::Switch(on));
    }

    pub fn mission_active(&self, prop: &str) -> bool {
        matches!(
            self.states.get(&StateKey::Prop(prop.to_string())),
            Some(InteractionState::Mission { active: true })
        )
    }

    pub fn set_mission(&mut self, prop: &str, active: bool) {
        self.states.insert(
            StateKey::Prop(prop.to_string()),
            InteractionState::Mission { active },
        );
    }

    pub fn clear_missions(&mut self) {
        for state in self.states.values_mut() {
            if let InteractionState::Mission { active } = state {
                *active = false;
            }
        }
    }

    pub fn door(&self, doorway: &str) -> Option<&DynamicDoor> {
        match self.states.get(&StateKey::Door(doorway.to_string()))? {
            InteractionState::Door(door) => Some(door),
            _ => None,
        }
    }

    pub fn door_mut(&mut self, doorway: &str) -> Option<&mut DynamicDoor> {
        match self.states.get_mut(&StateKey::Door(doorway.to_string()))? {
            InteractionState::Door(door) => Some(door),
            _ => None,
        }
    }

    pub fn doors(&self) -> impl Iterator<Item = (&str, &DynamicDoor)> {
        self.states.iter().filter_map(|(key, state)| match (key, state) {
            (StateKey::Door(name), InteractionState::Door(door)) => Some((name.as_str(), door)),
            _ => None,
        })
    }

    pub fn doors_mut(&mut self) -> impl Iterator<Item = &mut DynamicDoor> {
        self.states.values_mut().filter_map(|state| match state {
            InteractionState::Door(door) => Some(door),
            _ => None,
        })
    }

    pub fn rotation_mut(&mut self, prop: &str) -> Option<&mut RotatingProp> {
        match self.states.get_mut(&StateKey::Prop(prop.to_string()))? {
            InteractionState::Rotation(rotating) => Some(rotating),
            _ => None,
        }
    }

    pub fn rotations_mut(&mut self) -> impl Iterator<Item = (&str, &mut RotatingProp)> {
        self.states.iter_mut().filter_map(|(key, state)| match (key, state) {
            (StateKey::Prop(id), InteractionState::Rotation(rotating)) => {
                Some((id.as_str(), rotating))
            }
            _ => None,
        })
    }

    /// Cancels every pending door auto-close. Returns how many were pending.
    pub fn cancel_pending_timers(&mut self) -> usize {
        let mut cancelled = 0;
        for door in self.doors_mut() {
            if door.motion.has_pending_auto_close() {
                door.motion.cancel_auto_close();
                cancelled += 1;
            }
        }
        cancelled
    }
}
