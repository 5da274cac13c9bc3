use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::math::{Affine3A, Vec3A};
use bevy::prelude::*;

use super::lights::LightKey;
use super::registry::{ActionKind, PropAction, PropRegistry};
use super::state::{StateKey, StateStore};
use crate::config::{DoorConfig, NeonSettings};

/// What the crosshair can land on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Index into the prop registry.
    Prop(usize),
    Light(LightKey),
    /// Doorway name of a spawned door.
    Door(String),
}

impl Target {
    pub fn kind(&self, registry: &PropRegistry) -> Option<ActionKind> {
        match self {
            Target::Prop(index) => registry.get(*index).map(|prop| prop.action.kind()),
            Target::Light(_) => Some(ActionKind::ToggleEmissiveLight),
            Target::Door(_) => Some(ActionKind::ToggleDynamicDoor),
        }
    }
}

/// The interactable resolved this frame and the node the ray hit it through.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentTarget {
    pub target: Target,
    pub node: Entity,
}

/// Result of the last resolver pass.
#[derive(Resource, Debug, Default)]
pub struct LookTarget {
    pub current: Option<CurrentTarget>,
    /// Look-rotate prop under the crosshair, if any.
    pub rotating: Option<usize>,
}

/// Text shown under the crosshair. `None` hides it.
#[derive(Resource, Debug, Default, PartialEq)]
pub struct HintText(pub Option<String>);

/// One interactable before intersection.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub target: Target,
    pub node: Entity,
    pub look_rotate: bool,
}

/// A local-space box belonging to the candidate at index `candidate`.
/// Only used for proxy volumes that have no mesh of their own.
#[derive(Debug, Clone, Copy)]
pub struct Collider {
    pub candidate: usize,
    pub world_from_local: Affine3A,
    pub bounds: Aabb3d,
}

/// A candidate the look ray crossed, `distance` metres from the eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub candidate: usize,
    pub distance: f32,
}

/// World-space distance along the ray to the collider's entry face, within `max_distance`.
/// An origin inside the box never hits it.
pub fn ray_distance(
    origin: Vec3,
    direction: Dir3,
    max_distance: f32,
    collider: &Collider,
) -> Option<f32> {
    let local_from_world = collider.world_from_local.inverse();
    let local_origin = local_from_world.transform_point3(origin);
    let inside = Vec3A::from(local_origin);
    if inside.cmpge(collider.bounds.min).all() && inside.cmple(collider.bounds.max).all() {
        return None;
    }

    let local_direction = local_from_world.transform_vector3(*direction);
    let scale = local_direction.length();
    let local_dir = Dir3::new(local_direction).ok()?;

    let cast = RayCast3d::new(local_origin, local_dir, max_distance * scale);
    cast.aabb_intersection_at(&collider.bounds)
        .map(|t| t / scale)
}

/// Every collider the ray enters within `max_distance`.
pub fn collider_hits(
    origin: Vec3,
    direction: Dir3,
    max_distance: f32,
    colliders: &[Collider],
) -> Vec<Hit> {
    colliders
        .iter()
        .filter_map(|collider| {
            ray_distance(origin, direction, max_distance, collider).map(|distance| Hit {
                candidate: collider.candidate,
                distance,
            })
        })
        .collect()
}

/// Nearest hit among those whose candidate passes `filter`.
/// On equal distance the earlier candidate wins.
pub fn nearest_hit(hits: &[Hit], filter: impl Fn(usize) -> bool) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    for hit in hits.iter().filter(|h| filter(h.candidate)) {
        let closer = best.is_none_or(|b| {
            hit.distance < b.distance
                || (hit.distance == b.distance && hit.candidate < b.candidate)
        });
        if closer {
            best = Some(*hit);
        }
    }
    best
}

/// Picks the actionable target and the look-rotate prop from this frame's hits.
/// A look-rotate prop only counts when nothing actionable sits in front of it.
pub fn resolve(candidates: &[Candidate], hits: &[Hit]) -> LookTarget {
    let actionable = nearest_hit(hits, |i| !candidates[i].look_rotate);
    let current = actionable.map(|hit| CurrentTarget {
        target: candidates[hit.candidate].target.clone(),
        node: candidates[hit.candidate].node,
    });

    let rotating = nearest_hit(hits, |i| candidates[i].look_rotate)
        .filter(|hit| actionable.is_none_or(|a| hit.distance < a.distance))
        .and_then(|hit| match candidates[hit.candidate].target {
            Target::Prop(index) => Some(index),
            _ => None,
        });

    LookTarget { current, rotating }
}

/// Hint for `target` given its current state.
pub fn hint_text(
    target: &Target,
    registry: &PropRegistry,
    states: &StateStore,
    doors: &DoorConfig,
    neon: &NeonSettings,
) -> Option<String> {
    match target {
        Target::Prop(index) => {
            let prop = registry.get(*index)?;
            let on = || {
                states
                    .switch(&StateKey::Prop(prop.id.clone()))
                    .unwrap_or(false)
            };
            match &prop.action {
                PropAction::ToggleVisibility { message, .. } => Some(message.clone()),
                PropAction::ToggleScreenMaterial {
                    message_on,
                    message_off,
                    ..
                }
                | PropAction::ToggleFluidEffect {
                    message_on,
                    message_off,
                    ..
                } => Some(if on() { message_on } else { message_off }.clone()),
                PropAction::StartGlobalEvent {
                    message_idle,
                    message_active,
                } => Some(
                    if states.mission_active(&prop.id) {
                        message_active
                    } else {
                        message_idle
                    }
                    .clone(),
                ),
                PropAction::LookRotate { .. } => None,
            }
        }
        Target::Light(key) => {
            let on = states
                .switch(&StateKey::Light(key.clone()))
                .unwrap_or(true);
            Some(if on { &neon.message_on } else { &neon.message_off }.clone())
        }
        Target::Door(doorway) => {
            let motion = &states.door(doorway)?.motion;
            let mut text = if motion.is_open() {
                doors.message_close.clone()
            } else {
                doors.message_open.clone()
            };
            if motion.is_animating() {
                text.push_str(&doors.message_moving_suffix);
            }
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::door::DoorMotion;
    use crate::interaction::registry::default_props;
    use crate::interaction::state::{DynamicDoor, InteractionState};

    fn unit_box(candidate: usize, at: Vec3) -> Collider {
        Collider {
            candidate,
            world_from_local: Affine3A::from_translation(at),
            bounds: Aabb3d::new(Vec3::ZERO, Vec3::splat(0.5)),
        }
    }

    fn candidate(target: Target, look_rotate: bool) -> Candidate {
        Candidate {
            target,
            node: Entity::from_raw(0),
            look_rotate,
        }
    }

    fn hit(candidate: usize, distance: f32) -> Hit {
        Hit {
            candidate,
            distance,
        }
    }

    #[test]
    fn no_candidates_means_no_target() {
        let look = resolve(&[], &[]);
        assert!(look.current.is_none());
        assert!(look.rotating.is_none());
    }

    #[test]
    fn nearest_hit_wins() {
        let colliders = [
            unit_box(0, Vec3::new(0.0, 0.0, -3.0)),
            unit_box(1, Vec3::new(0.0, 0.0, -1.5)),
        ];
        let hits = collider_hits(Vec3::ZERO, Dir3::NEG_Z, 10.0, &colliders);
        let nearest = nearest_hit(&hits, |_| true).unwrap();
        assert_eq!(nearest.candidate, 1);
        assert!((nearest.distance - 1.0).abs() < 1e-5);
    }

    #[test]
    fn equal_distance_keeps_first_candidate() {
        let hits = [hit(4, 2.0), hit(3, 2.0)];
        assert_eq!(nearest_hit(&hits, |_| true).map(|h| h.candidate), Some(3));
    }

    #[test]
    fn hits_beyond_max_distance_are_ignored() {
        let colliders = [unit_box(0, Vec3::new(0.0, 0.0, -5.0))];
        assert!(collider_hits(Vec3::ZERO, Dir3::NEG_Z, 3.5, &colliders).is_empty());
    }

    #[test]
    fn scaled_colliders_report_world_distance() {
        let collider = Collider {
            candidate: 0,
            world_from_local: Affine3A::from_scale_rotation_translation(
                Vec3::splat(2.0),
                Quat::IDENTITY,
                Vec3::new(0.0, 0.0, -4.0),
            ),
            bounds: Aabb3d::new(Vec3::ZERO, Vec3::splat(0.5)),
        };
        let distance = ray_distance(Vec3::ZERO, Dir3::NEG_Z, 10.0, &collider).unwrap();
        assert!((distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn standing_inside_a_door_volume_does_not_target_the_door() {
        // Padded volume of a door half a metre behind the player.
        let door = Collider {
            candidate: 0,
            world_from_local: Affine3A::from_translation(Vec3::new(0.0, 0.0, 0.5)),
            bounds: Aabb3d::new(Vec3::ZERO, Vec3::new(1.25, 1.675, 1.24)),
        };
        assert_eq!(ray_distance(Vec3::ZERO, Dir3::NEG_Z, 3.5, &door), None);

        let candidates = [
            candidate(Target::Door("DoorWay1".into()), false),
            candidate(Target::Prop(2), false),
        ];
        let mut hits = collider_hits(Vec3::ZERO, Dir3::NEG_Z, 3.5, &[door]);
        hits.push(hit(1, 2.0));
        let look = resolve(&candidates, &hits);
        assert_eq!(look.current.map(|c| c.target), Some(Target::Prop(2)));
    }

    #[test]
    fn look_rotate_prop_does_not_hide_the_actionable_target() {
        let candidates = [
            candidate(Target::Prop(10), true),
            candidate(Target::Door("DoorWay1".into()), false),
        ];
        let colliders = [
            unit_box(0, Vec3::new(0.0, 0.0, -1.0)),
            unit_box(1, Vec3::new(0.0, 0.0, -2.5)),
        ];
        let hits = collider_hits(Vec3::ZERO, Dir3::NEG_Z, 3.5, &colliders);
        let look = resolve(&candidates, &hits);
        assert_eq!(look.rotating, Some(10));
        assert_eq!(
            look.current.map(|c| c.target),
            Some(Target::Door("DoorWay1".into()))
        );
    }

    #[test]
    fn look_rotate_prop_behind_a_screen_stays_still() {
        let candidates = [
            candidate(Target::Prop(0), false),
            candidate(Target::Prop(10), true),
        ];
        let look = resolve(&candidates, &[hit(0, 0.5), hit(1, 2.3)]);
        assert_eq!(look.rotating, None);
        assert_eq!(look.current.map(|c| c.target), Some(Target::Prop(0)));
    }

    #[test]
    fn hints_follow_state() {
        let registry = PropRegistry::new(default_props()).unwrap();
        let mut states = StateStore::default();
        states.seed_from_registry(&registry);
        let doors = DoorConfig::default();
        let neon = NeonSettings::default();

        let (tv, _) = registry
            .iter()
            .find(|(_, p)| p.id == "tvScreen_Ecran1")
            .unwrap();
        let on = hint_text(&Target::Prop(tv), &registry, &states, &doors, &neon);
        states.set_switch(StateKey::Prop("tvScreen_Ecran1".into()), false);
        let off = hint_text(&Target::Prop(tv), &registry, &states, &doors, &neon);
        assert_ne!(on, off);

        let mut motion = DoorMotion::new(Vec3::ZERO, Quat::IDENTITY, Vec3::X, 0.75, 3.0);
        motion.toggle();
        states.insert(
            StateKey::Door("d1".into()),
            InteractionState::Door(DynamicDoor {
                panel: Entity::from_raw(1),
                volume: Entity::from_raw(2),
                motion,
            }),
        );
        let door = hint_text(&Target::Door("d1".into()), &registry, &states, &doors, &neon);
        assert_eq!(
            door,
            Some(format!("{}{}", doors.message_close, doors.message_moving_suffix))
        );
    }
}
