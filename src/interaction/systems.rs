use std::collections::HashMap;

use bevy::math::bounding::Aabb3d;
use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, RayCastSettings, RayCastVisibility};
use bevy::prelude::*;
use bevy::render::primitives::Aabb;

use super::dispatch::{dispatch, end_emergency, InteractionContext};
use super::door::DoorMotion;
use super::effects::{emissive, for_each_material, PropEffect};
use super::emergency::{blink_effects, EmergencyMode};
use super::lights::{DynamicLightSystem, LightBaseline, LightKey, LightSystems};
use super::nodes::ModelNodes;
use super::registry::{default_props, ActionKind, PropAction, PropRegistry};
use super::resolver::{
    collider_hits, hint_text, resolve, Candidate, Collider, HintText, Hit, LookTarget, Target,
};
use super::rotate::RotationState;
use super::screen::MaterialKey;
use super::state::{DynamicDoor, InteractionState, RotatingProp, StateKey, StateStore};
use crate::camera::PointerLock;
use crate::config::{color_from_hex, StationConfig};
use crate::player::Player;

/// Marker for the invisible box the look ray tests instead of the thin door panel.
#[derive(Component)]
pub struct DoorVolume;

/// Marker for door panels spawned from placement config.
#[derive(Component)]
pub struct DoorPanel;

/// Marker for point lights spawned for neon meshes.
#[derive(Component)]
pub struct NeonLight;

/// Builds the prop registry and the interaction resources from config.
pub fn init_interaction(mut commands: Commands, config: Res<StationConfig>) {
    let props = config.props.clone().unwrap_or_else(default_props);
    let registry = match PropRegistry::new(props) {
        Ok(registry) => {
            info!("Registered {} interactive props", registry.len());
            registry
        }
        Err(e) => {
            error!("Invalid prop configuration: {}", e);
            PropRegistry::default()
        }
    };

    let mut states = StateStore::default();
    states.seed_from_registry(&registry);

    commands.insert_resource(EmergencyMode::new(
        color_from_hex(config.emergency.light_color),
        std::time::Duration::from_millis(config.emergency.blink_interval_ms),
    ));
    commands.insert_resource(registry);
    commands.insert_resource(states);
}

/// Warns once per configured node name that the loaded model does not contain.
pub fn check_prop_nodes(registry: Res<PropRegistry>, nodes: Res<ModelNodes>) {
    let mut missing = 0;
    for (_, prop) in registry.iter() {
        for name in &prop.nodes {
            if nodes.lookup_or_warn(&prop.owner, name).is_none() {
                missing += 1;
            }
        }
    }
    if missing > 0 {
        warn!("{} prop node(s) missing, those props are skipped", missing);
    }
}

/// Pairs every neon mesh with a point light and records its baseline.
#[allow(clippy::too_many_arguments)]
pub fn register_neon_lights(
    mut commands: Commands,
    config: Res<StationConfig>,
    nodes: Res<ModelNodes>,
    children: Query<&Children>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    transforms: Query<&GlobalTransform>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut lights: ResMut<LightSystems>,
    mut states: ResMut<StateStore>,
) {
    let neon = &config.neon;
    for name in &neon.node_names {
        let Some(mesh) = nodes.lookup_or_warn(&config.model.id, name) else {
            continue;
        };
        let Ok(global) = transforms.get(mesh) else {
            continue;
        };

        // Each light gets its own material so recolouring one never touches another.
        let mut source_emissive = None;
        for_each_material(mesh, &children, &mesh_materials, |entity, handle| {
            let Some(mut material) = materials.get(handle).cloned() else {
                return;
            };
            let color = *source_emissive.get_or_insert_with(|| {
                if material.emissive == LinearRgba::BLACK {
                    Color::WHITE
                } else {
                    Color::from(material.emissive)
                }
            });
            material.emissive = emissive(color, neon.emissive_intensity);
            commands
                .entity(entity)
                .insert(MeshMaterial3d(materials.add(material)));
        });
        let color = source_emissive.unwrap_or(Color::WHITE);

        let light = commands
            .spawn((
                NeonLight,
                Name::new(format!("{name}_light")),
                PointLight {
                    color,
                    intensity: neon.light_intensity,
                    range: neon.light_range,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::from_translation(global.translation()),
                Visibility::Inherited,
            ))
            .id();

        let key = LightKey::new(config.model.id.clone(), name.clone());
        lights.register(DynamicLightSystem {
            key: key.clone(),
            light,
            mesh,
            baseline: LightBaseline {
                color,
                intensity: neon.light_intensity,
                emissive_color: color,
                emissive_intensity: neon.emissive_intensity,
                visible: true,
            },
            emergency_affected: !neon.emergency_exempt.contains(name),
        });
        states.set_switch(StateKey::Light(key), true);
    }
    info!("Registered {} neon light(s)", lights.len());
}

/// Spawns every configured door panel and its interaction volume.
pub fn spawn_doors(
    mut commands: Commands,
    config: Res<StationConfig>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut states: ResMut<StateStore>,
) {
    let doors = &config.doors;
    let mesh = meshes.add(Cuboid::new(doors.width, doors.height, doors.thickness));
    let material = materials.add(StandardMaterial {
        base_color_texture: Some(asset_server.load(doors.texture_path.clone())),
        metallic: 0.6,
        perceptual_roughness: 0.4,
        ..default()
    });
    let padding = Vec3::from(doors.volume_padding);
    let half_extents = Vec3::new(doors.width, doors.height, doors.thickness) / 2.0 + padding;

    for instance in &doors.instances {
        let position = Vec3::from(instance.position);
        let rotation = Quat::from_rotation_y(instance.yaw.to_radians());

        let panel = commands
            .spawn((
                DoorPanel,
                Name::new(format!("{}_door", instance.doorway)),
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                Transform::from_translation(position).with_rotation(rotation),
            ))
            .id();
        let volume = commands
            .spawn((
                DoorVolume,
                Name::new(format!("{}_volume", instance.doorway)),
                Transform::from_translation(position).with_rotation(rotation),
                Aabb {
                    center: Vec3::ZERO.into(),
                    half_extents: half_extents.into(),
                },
                Visibility::Hidden,
            ))
            .id();

        states.insert(
            StateKey::Door(instance.doorway.clone()),
            InteractionState::Door(DynamicDoor {
                panel,
                volume,
                motion: DoorMotion::new(
                    position,
                    rotation,
                    doors.local_slide_offset(),
                    doors.animation_duration,
                    doors.auto_close_delay,
                ),
            }),
        );
    }
    info!("Spawned {} door(s)", doors.instances.len());
}

/// Records the resting orientation of every look-rotate prop.
pub fn init_rotating_props(
    registry: Res<PropRegistry>,
    nodes: Res<ModelNodes>,
    transforms: Query<&Transform>,
    mut states: ResMut<StateStore>,
) {
    for (_, prop) in registry.iter() {
        let PropAction::LookRotate {
            axis,
            angle_degrees,
            speed,
        } = &prop.action
        else {
            continue;
        };
        let Some(node) = prop
            .primary_node()
            .and_then(|name| nodes.lookup(&prop.owner, name))
        else {
            continue;
        };
        let Ok(transform) = transforms.get(node) else {
            continue;
        };
        states.insert(
            StateKey::Prop(prop.id.clone()),
            InteractionState::Rotation(RotatingProp {
                node,
                rotation: RotationState::new(
                    transform.rotation,
                    Vec3::from(*axis),
                    angle_degrees.to_radians(),
                    *speed,
                ),
            }),
        );
    }
}

/// Puts every screen into its configured initial state.
pub fn apply_initial_screens(
    registry: Res<PropRegistry>,
    nodes: Res<ModelNodes>,
    states: Res<StateStore>,
    mut effects: EventWriter<PropEffect>,
) {
    for (_, prop) in registry.iter() {
        let PropAction::ToggleScreenMaterial { on, off, initially_on, .. } = &prop.action else {
            continue;
        };
        let now_on = states
            .switch(&StateKey::Prop(prop.id.clone()))
            .unwrap_or(*initially_on);
        for node in prop.nodes.iter().filter_map(|n| nodes.lookup(&prop.owner, n)) {
            effects.send(PropEffect::SetScreen {
                key: MaterialKey {
                    prop: prop.id.clone(),
                    node,
                },
                on: now_on,
                config: if now_on { *on } else { *off },
            });
        }
    }
}

/// Slides doors and turns look-rotate props. Runs whether or not the pointer is locked.
pub fn advance_animated_props(
    time: Res<Time>,
    config: Res<StationConfig>,
    mut states: ResMut<StateStore>,
    mut transforms: Query<&mut Transform>,
) {
    let delta = time.delta_secs().min(config.interaction.max_frame_delta);

    for door in states.doors_mut() {
        if let Some(position) = door.motion.advance(delta) {
            if let Ok(mut transform) = transforms.get_mut(door.panel) {
                transform.translation = position;
            }
        }
    }

    for (_, rotating) in states.rotations_mut() {
        if let Ok(mut transform) = transforms.get_mut(rotating.node) {
            let next = rotating.rotation.step(transform.rotation, delta);
            if next != transform.rotation {
                transform.rotation = next;
            }
        }
    }
}

pub fn tick_emergency(
    time: Res<Time>,
    lights: Res<LightSystems>,
    mut emergency: ResMut<EmergencyMode>,
    mut effects: EventWriter<PropEffect>,
) {
    if let Some(on) = emergency.tick(time.elapsed()) {
        effects.send_batch(blink_effects(&lights, emergency.color(), on));
    }
}

/// Maps the meshes under `root` to `candidate` and boxes any mesh-less proxy volume.
fn collect_hit_shapes(
    candidate: usize,
    root: Entity,
    children: &Query<&Children>,
    meshes: &Query<(), With<Mesh3d>>,
    volumes: &Query<(&GlobalTransform, &Aabb), Without<Mesh3d>>,
    owners: &mut HashMap<Entity, usize>,
    colliders: &mut Vec<Collider>,
) {
    for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
        if meshes.contains(entity) {
            owners.entry(entity).or_insert(candidate);
        } else if let Ok((global, aabb)) = volumes.get(entity) {
            colliders.push(Collider {
                candidate,
                world_from_local: global.affine(),
                bounds: Aabb3d::new(aabb.center, aabb.half_extents),
            });
        }
    }
}

/// Casts the look ray and records the current target and the looked-at rotating prop.
#[allow(clippy::too_many_arguments)]
pub fn resolve_look_target(
    lock: Res<PointerLock>,
    player: Query<&Transform, With<Player>>,
    config: Res<StationConfig>,
    registry: Res<PropRegistry>,
    nodes: Res<ModelNodes>,
    lights: Res<LightSystems>,
    emergency: Res<EmergencyMode>,
    children: Query<&Children>,
    meshes: Query<(), With<Mesh3d>>,
    volumes: Query<(&GlobalTransform, &Aabb), Without<Mesh3d>>,
    mut ray_cast: MeshRayCast,
    mut states: ResMut<StateStore>,
    mut look: ResMut<LookTarget>,
) {
    let eye = player.get_single().ok().filter(|_| lock.is_locked());
    let Some(eye) = eye else {
        look.current = None;
        look.rotating = None;
        for (_, rotating) in states.rotations_mut() {
            rotating.rotation.looked_at = false;
        }
        return;
    };

    let mut candidates = Vec::new();
    let mut owners = HashMap::new();
    let mut colliders = Vec::new();
    let mut add = |target: Target, node: Entity, look_rotate: bool| {
        collect_hit_shapes(
            candidates.len(),
            node,
            &children,
            &meshes,
            &volumes,
            &mut owners,
            &mut colliders,
        );
        candidates.push(Candidate {
            target,
            node,
            look_rotate,
        });
    };

    for (index, prop) in registry.iter() {
        let look_rotate = prop.action.kind() == ActionKind::LookRotate;
        for name in &prop.nodes {
            if let Some(node) = nodes.lookup(&prop.owner, name) {
                add(Target::Prop(index), node, look_rotate);
            }
        }
    }
    if !emergency.is_active() {
        for system in lights.iter() {
            add(Target::Light(system.key.clone()), system.mesh, false);
        }
    }
    for (doorway, door) in states.doors() {
        add(Target::Door(doorway.to_string()), door.volume, false);
    }

    let max_distance = config.interaction.raycast_distance;
    let mut hits = collider_hits(eye.translation, eye.forward(), max_distance, &colliders);

    // Hidden props stay hittable so they can be toggled back on.
    let ray = Ray3d {
        origin: eye.translation,
        direction: eye.forward(),
    };
    let filter = |entity: Entity| owners.contains_key(&entity);
    let settings = RayCastSettings::default()
        .with_visibility(RayCastVisibility::Any)
        .with_filter(&filter)
        .never_early_exit();
    for (entity, mesh_hit) in ray_cast.cast_ray(ray, &settings) {
        if mesh_hit.distance > max_distance {
            continue;
        }
        if let Some(&candidate) = owners.get(entity) {
            hits.push(Hit {
                candidate,
                distance: mesh_hit.distance,
            });
        }
    }

    *look = resolve(&candidates, &hits);

    let rotating = look
        .rotating
        .and_then(|index| registry.get(index))
        .map(|prop| prop.id.as_str());
    for (id, state) in states.rotations_mut() {
        state.rotation.looked_at = rotating == Some(id);
    }
}

/// Dispatches every trigger key pressed this frame against the current target.
#[allow(clippy::too_many_arguments)]
pub fn handle_trigger_keys(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    lock: Res<PointerLock>,
    time: Res<Time>,
    look: Res<LookTarget>,
    registry: Res<PropRegistry>,
    nodes: Res<ModelNodes>,
    lights: Res<LightSystems>,
    mut states: ResMut<StateStore>,
    mut emergency: ResMut<EmergencyMode>,
    mut effects: EventWriter<PropEffect>,
) {
    if !lock.is_locked() {
        return;
    }
    for key in keyboard_input.get_just_pressed() {
        let mut ctx = InteractionContext {
            registry: &registry,
            nodes: &nodes,
            lights: &lights,
            states: &mut states,
            emergency: &mut emergency,
            now: time.elapsed(),
        };
        effects.send_batch(dispatch(look.current.as_ref(), *key, &mut ctx));
    }
}

/// `L` ends emergency mode.
#[allow(clippy::too_many_arguments)]
pub fn handle_emergency_cancel(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    lock: Res<PointerLock>,
    time: Res<Time>,
    registry: Res<PropRegistry>,
    nodes: Res<ModelNodes>,
    lights: Res<LightSystems>,
    mut states: ResMut<StateStore>,
    mut emergency: ResMut<EmergencyMode>,
    mut effects: EventWriter<PropEffect>,
) {
    if !lock.is_locked() || !keyboard_input.just_pressed(KeyCode::KeyL) || !emergency.is_active() {
        return;
    }
    let mut ctx = InteractionContext {
        registry: &registry,
        nodes: &nodes,
        lights: &lights,
        states: &mut states,
        emergency: &mut emergency,
        now: time.elapsed(),
    };
    effects.send_batch(end_emergency(&mut ctx));
}

/// Formats the hint from the state as it stands after this frame's triggers.
pub fn sync_hint(
    config: Res<StationConfig>,
    look: Res<LookTarget>,
    registry: Res<PropRegistry>,
    states: Res<StateStore>,
    mut hint: ResMut<HintText>,
) {
    let text = look.current.as_ref().and_then(|current| {
        hint_text(
            &current.target,
            &registry,
            &states,
            &config.doors,
            &config.neon,
        )
    });
    hint.set_if_neq(HintText(text));
}

/// Cancels pending door timers when the app is shutting down.
pub fn cleanup_on_exit(mut exits: EventReader<AppExit>, mut states: ResMut<StateStore>) {
    if exits.read().next().is_none() {
        return;
    }
    let cancelled = states.cancel_pending_timers();
    info!("Cancelled {} pending door timer(s)", cancelled);
}

/// Indexes every named entity under `root`.
pub fn collect_named_nodes(
    root: Entity,
    children: &Query<&Children>,
    names: &Query<&Name>,
) -> HashMap<String, Entity> {
    let mut found = HashMap::new();
    for entity in children.iter_descendants(root) {
        if let Ok(name) = names.get(entity) {
            // Shallowest match wins when a name repeats.
            found.entry(name.as_str().to_string()).or_insert(entity);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::interaction::registry::{PropConfig, TriggerKey};

    fn frames(app: &mut App, count: usize, step: f32) {
        for _ in 0..count {
            app.world_mut()
                .resource_mut::<Time>()
                .advance_by(Duration::from_secs_f32(step));
            app.update();
        }
    }

    #[test]
    fn door_panel_opens_then_closes_on_its_own() {
        let mut app = App::new();
        app.insert_resource(StationConfig::default())
            .init_resource::<Time>()
            .init_resource::<StateStore>()
            .add_systems(Update, advance_animated_props);

        let panel = app.world_mut().spawn(Transform::default()).id();
        let mut motion = DoorMotion::new(Vec3::ZERO, Quat::IDENTITY, Vec3::X * 1.995, 0.75, 3.0);
        motion.toggle();
        app.world_mut().resource_mut::<StateStore>().insert(
            StateKey::Door("DoorWay1".into()),
            InteractionState::Door(DynamicDoor {
                panel,
                volume: Entity::PLACEHOLDER,
                motion,
            }),
        );

        frames(&mut app, 30, 1.0 / 30.0);
        let open = app.world().get::<Transform>(panel).unwrap().translation;
        assert_eq!(open, Vec3::X * 1.995);

        frames(&mut app, 120, 1.0 / 30.0);
        let states = app.world().resource::<StateStore>();
        assert!(!states.door("DoorWay1").unwrap().motion.is_open());
        assert_eq!(app.world().get::<Transform>(panel).unwrap().translation, Vec3::ZERO);
    }

    #[test]
    fn large_frame_deltas_are_clamped() {
        let mut app = App::new();
        app.insert_resource(StationConfig::default())
            .init_resource::<Time>()
            .init_resource::<StateStore>()
            .add_systems(Update, advance_animated_props);

        let panel = app.world_mut().spawn(Transform::default()).id();
        let mut motion = DoorMotion::new(Vec3::ZERO, Quat::IDENTITY, Vec3::X, 0.75, 3.0);
        motion.toggle();
        app.world_mut().resource_mut::<StateStore>().insert(
            StateKey::Door("DoorWay1".into()),
            InteractionState::Door(DynamicDoor {
                panel,
                volume: Entity::PLACEHOLDER,
                motion,
            }),
        );

        frames(&mut app, 1, 1.0);
        let states = app.world().resource::<StateStore>();
        assert!(states.door("DoorWay1").unwrap().motion.is_animating());
    }

    fn resolver_app(locked: bool) -> App {
        let registry = PropRegistry::new(vec![PropConfig {
            id: "crate".to_string(),
            owner: "station".to_string(),
            nodes: vec!["Crate".to_string()],
            trigger_key: Some(TriggerKey::KeyE),
            action: PropAction::ToggleVisibility {
                affected: vec!["Crate".to_string()],
                message: "Press E to hide the crate".to_string(),
            },
        }])
        .unwrap();

        let mut app = App::new();
        app.insert_resource(StationConfig::default())
            .insert_resource(PointerLock(locked))
            .insert_resource(registry)
            .insert_resource(EmergencyMode::new(Color::BLACK, Duration::from_millis(500)))
            .init_resource::<ModelNodes>()
            .init_resource::<LightSystems>()
            .init_resource::<StateStore>()
            .init_resource::<LookTarget>()
            .init_resource::<HintText>()
            .init_resource::<Assets<Mesh>>()
            .add_systems(Update, (resolve_look_target, sync_hint).chain());

        app.world_mut().spawn((Player, Transform::default()));
        let mesh = app
            .world_mut()
            .resource_mut::<Assets<Mesh>>()
            .add(Cuboid::new(1.0, 1.0, 1.0));
        let node = app
            .world_mut()
            .spawn((
                Mesh3d(mesh),
                GlobalTransform::from_translation(Vec3::new(0.0, 0.0, -2.0)),
                Aabb {
                    center: Vec3::ZERO.into(),
                    half_extents: Vec3::splat(0.5).into(),
                },
            ))
            .id();
        app.world_mut()
            .resource_mut::<ModelNodes>()
            .insert_model("station", HashMap::from([("Crate".to_string(), node)]));
        app
    }

    #[test]
    fn resolver_targets_prop_in_front_of_player() {
        let mut app = resolver_app(true);
        app.update();

        let look = app.world().resource::<LookTarget>();
        assert_eq!(look.current.as_ref().map(|c| &c.target), Some(&Target::Prop(0)));
        assert_eq!(
            app.world().resource::<HintText>(),
            &HintText(Some("Press E to hide the crate".to_string()))
        );
    }

    #[test]
    fn door_volume_around_player_does_not_hide_prop_ahead() {
        let mut app = resolver_app(true);
        let volume = app
            .world_mut()
            .spawn((
                GlobalTransform::from_translation(Vec3::new(0.0, 0.0, 0.5)),
                Aabb {
                    center: Vec3::ZERO.into(),
                    half_extents: Vec3::new(1.25, 1.675, 1.24).into(),
                },
            ))
            .id();
        app.world_mut().resource_mut::<StateStore>().insert(
            StateKey::Door("DoorWay1".into()),
            InteractionState::Door(DynamicDoor {
                panel: Entity::PLACEHOLDER,
                volume,
                motion: DoorMotion::new(Vec3::ZERO, Quat::IDENTITY, Vec3::X, 0.75, 3.0),
            }),
        );
        app.update();

        let look = app.world().resource::<LookTarget>();
        assert_eq!(look.current.as_ref().map(|c| &c.target), Some(&Target::Prop(0)));
    }

    #[test]
    fn unlocked_pointer_clears_target_and_hint() {
        let mut app = resolver_app(false);
        app.update();

        assert!(app.world().resource::<LookTarget>().current.is_none());
        assert_eq!(app.world().resource::<HintText>(), &HintText(None));
    }

    #[test]
    fn repeated_names_resolve_to_shallowest_node() {
        let mut world = World::new();
        let root = world.spawn_empty().id();
        let first = world.spawn(Name::new("Globe_Objet_0")).set_parent(root).id();
        world.spawn(Name::new("Globe_Objet_0")).set_parent(first);

        let mut state: bevy::ecs::system::SystemState<(Query<&Children>, Query<&Name>)> =
            bevy::ecs::system::SystemState::new(&mut world);
        let (children, names) = state.get(&world);
        let found = collect_named_nodes(root, &children, &names);
        assert_eq!(found.get("Globe_Objet_0"), Some(&first));
    }
}
