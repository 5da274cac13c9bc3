use bevy::prelude::*;

/// Identifies a neon light by the model that owns it and its node name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightKey {
    pub owner: String,
    pub node: String,
}

impl LightKey {
    pub fn new(owner: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            node: node.into(),
        }
    }
}

/// Values recorded when a light is registered. Emergency mode restores to these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightBaseline {
    pub color: Color,
    pub intensity: f32,
    pub emissive_color: Color,
    pub emissive_intensity: f32,
    pub visible: bool,
}

/// A point light paired with the emissive mesh it represents.
#[derive(Debug, Clone)]
pub struct DynamicLightSystem {
    pub key: LightKey,
    pub light: Entity,
    pub mesh: Entity,
    pub baseline: LightBaseline,
    pub emergency_affected: bool,
}

/// Every registered neon light, in registration order.
#[derive(Resource, Debug, Default)]
pub struct LightSystems {
    systems: Vec<DynamicLightSystem>,
}

impl LightSystems {
    /// Registers a light, replacing any previous registration under the same key.
    pub fn register(&mut self, system: DynamicLightSystem) {
        match self.systems.iter_mut().find(|s| s.key == system.key) {
            Some(existing) => *existing = system,
            None => self.systems.push(system),
        }
    }

    pub fn get(&self, key: &LightKey) -> Option<&DynamicLightSystem> {
        self.systems.iter().find(|s| &s.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DynamicLightSystem> {
        self.systems.iter()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
