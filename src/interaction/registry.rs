use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// The closed set of things a prop can do when triggered or looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ToggleVisibility,
    ToggleEmissiveLight,
    ToggleDynamicDoor,
    ToggleScreenMaterial,
    ToggleFluidEffect,
    StartGlobalEvent,
    LookRotate,
}

/// Keys a prop may be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerKey {
    KeyE,
    KeyF,
    KeyQ,
    KeyR,
    KeyT,
}

impl TriggerKey {
    pub fn key_code(self) -> KeyCode {
        match self {
            TriggerKey::KeyE => KeyCode::KeyE,
            TriggerKey::KeyF => KeyCode::KeyF,
            TriggerKey::KeyQ => KeyCode::KeyQ,
            TriggerKey::KeyR => KeyCode::KeyR,
            TriggerKey::KeyT => KeyCode::KeyT,
        }
    }
}

/// Material bundle applied to a screen when it switches state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    pub emissive: u32,
    pub emissive_intensity: f32,
    /// Diffuse colour; when absent the original colour is restored.
    #[serde(default)]
    pub color: Option<u32>,
}

/// Static parameters of a configured prop, one variant per configurable action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropAction {
    ToggleVisibility {
        affected: Vec<String>,
        message: String,
    },
    ToggleScreenMaterial {
        on: MaterialConfig,
        off: MaterialConfig,
        initially_on: bool,
        message_on: String,
        message_off: String,
    },
    ToggleFluidEffect {
        position: [f32; 3],
        radius: f32,
        height: f32,
        color: u32,
        message_on: String,
        message_off: String,
    },
    StartGlobalEvent {
        message_idle: String,
        message_active: String,
    },
    LookRotate {
        axis: [f32; 3],
        angle_degrees: f32,
        speed: f32,
    },
}

impl PropAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            PropAction::ToggleVisibility { .. } => ActionKind::ToggleVisibility,
            PropAction::ToggleScreenMaterial { .. } => ActionKind::ToggleScreenMaterial,
            PropAction::ToggleFluidEffect { .. } => ActionKind::ToggleFluidEffect,
            PropAction::StartGlobalEvent { .. } => ActionKind::StartGlobalEvent,
            PropAction::LookRotate { .. } => ActionKind::LookRotate,
        }
    }

    fn messages(&self) -> Vec<&str> {
        match self {
            PropAction::ToggleVisibility { message, .. } => vec![message.as_str()],
            PropAction::ToggleScreenMaterial {
                message_on,
                message_off,
                ..
            }
            | PropAction::ToggleFluidEffect {
                message_on,
                message_off,
                ..
            } => vec![message_on.as_str(), message_off.as_str()],
            PropAction::StartGlobalEvent {
                message_idle,
                message_active,
            } => vec![message_idle.as_str(), message_active.as_str()],
            PropAction::LookRotate { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropConfig {
    pub id: String,
    /// Id of the loaded model the nodes are looked up in.
    pub owner: String,
    /// Nodes the look ray is tested against. The first one is the prop's primary node.
    pub nodes: Vec<String>,
    #[serde(default)]
    pub trigger_key: Option<TriggerKey>,
    pub action: PropAction,
}

impl PropConfig {
    pub fn primary_node(&self) -> Option<&str> {
        self.nodes.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Duplicate prop id: {0}")]
    DuplicateId(String),

    #[error("Prop {0} has no target nodes")]
    NoNodes(String),

    #[error("Node {node} of {owner} is claimed by both {first} and {second}")]
    SharedNode {
        owner: String,
        node: String,
        first: String,
        second: String,
    },

    #[error("Prop {0} has an empty hint message")]
    EmptyMessage(String),

    #[error("Prop {0} needs a trigger key")]
    MissingTriggerKey(String),

    #[error("Look-rotate prop {0} cannot have a trigger key")]
    UnexpectedTriggerKey(String),

    #[error("Look-rotate prop {0} has a zero axis or non-positive speed")]
    InvalidRotation(String),
}

/// Validated, immutable set of configured props.
#[derive(Resource, Debug, Default)]
pub struct PropRegistry {
    props: Vec<PropConfig>,
}

impl PropRegistry {
    pub fn new(props: Vec<PropConfig>) -> Result<Self, RegistryError> {
        let mut ids = HashSet::new();
        let mut claimed: Vec<(&str, &str, &str)> = Vec::new();

        for prop in &props {
            if !ids.insert(prop.id.as_str()) {
                return Err(RegistryError::DuplicateId(prop.id.clone()));
            }
            if prop.nodes.is_empty() {
                return Err(RegistryError::NoNodes(prop.id.clone()));
            }
            for node in &prop.nodes {
                if let Some((_, _, first)) = claimed
                    .iter()
                    .find(|(owner, n, _)| *owner == prop.owner && *n == node.as_str())
                {
                    return Err(RegistryError::SharedNode {
                        owner: prop.owner.clone(),
                        node: node.clone(),
                        first: first.to_string(),
                        second: prop.id.clone(),
                    });
                }
                claimed.push((prop.owner.as_str(), node.as_str(), prop.id.as_str()));
            }
            if prop.action.messages().iter().any(|m| m.trim().is_empty()) {
                return Err(RegistryError::EmptyMessage(prop.id.clone()));
            }
            match (&prop.action, prop.trigger_key) {
                (PropAction::LookRotate { .. }, Some(_)) => {
                    return Err(RegistryError::UnexpectedTriggerKey(prop.id.clone()));
                }
                (PropAction::LookRotate { axis, speed, .. }, None) => {
                    if Vec3::from(*axis).length_squared() <= f32::EPSILON || *speed <= 0.0 {
                        return Err(RegistryError::InvalidRotation(prop.id.clone()));
                    }
                }
                (_, None) => return Err(RegistryError::MissingTriggerKey(prop.id.clone())),
                (_, Some(_)) => {}
            }
        }

        Ok(Self { props })
    }

    pub fn get(&self, index: usize) -> Option<&PropConfig> {
        self.props.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &PropConfig)> {
        self.props.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

const STATION: &str = "spaceStation";

fn screen(index: u32) -> PropConfig {
    PropConfig {
        id: format!("tvScreen_Ecran{index}"),
        owner: STATION.to_string(),
        nodes: vec![format!("Ecran{index}_Objet2_0")],
        trigger_key: Some(TriggerKey::KeyE),
        action: PropAction::ToggleScreenMaterial {
            on: MaterialConfig {
                emissive: 0x87CEFA,
                emissive_intensity: 2.0,
                color: None,
            },
            off: MaterialConfig {
                emissive: 0x000000,
                emissive_intensity: 0.0,
                color: Some(0x000000),
            },
            initially_on: true,
            message_on: format!("Press E to turn off the TV (Ecran{index})"),
            message_off: format!("Press E to turn on the TV (Ecran{index})"),
        },
    }
}

/// The props shipped with the station model.
pub fn default_props() -> Vec<PropConfig> {
    let mut props = vec![
        PropConfig {
            id: "globeInteraction".to_string(),
            owner: STATION.to_string(),
            nodes: vec!["Globe_Objet_0".to_string(), "HoloSupport_Objet_0".to_string()],
            trigger_key: Some(TriggerKey::KeyE),
            action: PropAction::ToggleVisibility {
                affected: vec!["Globe_Objet_0".to_string()],
                message: "Press E to show/hide the globe".to_string(),
            },
        },
        PropConfig {
            id: "missionHoloInteraction".to_string(),
            owner: STATION.to_string(),
            nodes: vec![
                "MissionHolo_Objet3_0".to_string(),
                "HoloSupport_mission_Objet_0".to_string(),
            ],
            trigger_key: Some(TriggerKey::KeyE),
            action: PropAction::ToggleVisibility {
                affected: vec![
                    "MissionHolo_Objet3_0".to_string(),
                    "MissionHolo1_Objet3_0".to_string(),
                ],
                message: "Press E to show/hide the mission hologram".to_string(),
            },
        },
    ];

    props.extend((1..=6).map(screen));

    props.push(PropConfig {
        id: "missionControlPanel".to_string(),
        owner: STATION.to_string(),
        nodes: vec!["Panneau_control_Objet2_0".to_string()],
        trigger_key: Some(TriggerKey::KeyF),
        action: PropAction::StartGlobalEvent {
            message_idle: "Press F to START THE EMERGENCY MISSION".to_string(),
            message_active: "EMERGENCY MISSION ACTIVE! (Press L to cancel)".to_string(),
        },
    });
    props.push(PropConfig {
        id: "sinkTap".to_string(),
        owner: STATION.to_string(),
        nodes: vec!["Lavabo_Objet_0".to_string()],
        trigger_key: Some(TriggerKey::KeyE),
        action: PropAction::ToggleFluidEffect {
            position: [-4.2, 0.95, 2.6],
            radius: 0.03,
            height: 0.35,
            color: 0x9fd8ff,
            message_on: "Press E to turn off the tap".to_string(),
            message_off: "Press E to turn on the tap".to_string(),
        },
    });
    props.push(PropConfig {
        id: "holoSatellite".to_string(),
        owner: STATION.to_string(),
        nodes: vec!["Satellite_Objet_0".to_string()],
        trigger_key: None,
        action: PropAction::LookRotate {
            axis: [0.0, 1.0, 0.0],
            angle_degrees: 90.0,
            speed: 2.0,
        },
    });

    props
}
