use std::collections::HashMap;

use bevy::prelude::*;

use super::registry::MaterialConfig;
use super::screen::{apply_screen_state, BlackTexture, MaterialKey, ScreenMaterial, ScreenMaterials};

/// Scene-side consequence of an interaction, applied by `apply_prop_effects`.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum PropEffect {
    /// Flips the live visibility of each node.
    FlipVisibility { nodes: Vec<Entity> },
    SetLight {
        light: Entity,
        visible: bool,
        color: Color,
        intensity: f32,
    },
    /// Sets emissive on every material under `mesh`.
    SetEmissive {
        mesh: Entity,
        color: Color,
        intensity: f32,
    },
    SetScreen {
        key: MaterialKey,
        on: bool,
        config: MaterialConfig,
    },
    SetFluid {
        prop: String,
        shape: FluidShape,
        visible: bool,
    },
    SetRotation { node: Entity, rotation: Quat },
    EmergencyStarted,
    EmergencyEnded,
}

/// Shape of a lazily spawned fluid stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidShape {
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
    pub color: Color,
}

/// Fluid meshes spawned so far, by prop id.
#[derive(Resource, Debug, Default)]
pub struct FluidEffects {
    spawned: HashMap<String, Entity>,
}

/// Emissive colour scaled by intensity, in the form `StandardMaterial` expects.
pub fn emissive(color: Color, intensity: f32) -> LinearRgba {
    let c = color.to_linear();
    LinearRgba::rgb(c.red * intensity, c.green * intensity, c.blue * intensity)
}

/// Calls `f` with the material handle of `root` and of every descendant that has one.
pub fn for_each_material(
    root: Entity,
    children: &Query<&Children>,
    mesh_materials: &Query<&MeshMaterial3d<StandardMaterial>>,
    mut f: impl FnMut(Entity, &Handle<StandardMaterial>),
) {
    for entity in std::iter::once(root).chain(children.iter_descendants(root)) {
        if let Ok(material) = mesh_materials.get(entity) {
            f(entity, &material.0);
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn apply_prop_effects(
    mut commands: Commands,
    mut events: EventReader<PropEffect>,
    mut visibilities: Query<&mut Visibility>,
    mut point_lights: Query<&mut PointLight>,
    mut transforms: Query<&mut Transform>,
    children: Query<&Children>,
    mesh_materials: Query<&MeshMaterial3d<StandardMaterial>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut screens: ResMut<ScreenMaterials>,
    mut fluids: ResMut<FluidEffects>,
    black: Res<BlackTexture>,
) {
    for effect in events.read() {
        match effect {
            PropEffect::FlipVisibility { nodes } => {
                for node in nodes {
                    if let Ok(mut visibility) = visibilities.get_mut(*node) {
                        *visibility = if *visibility == Visibility::Hidden {
                            Visibility::Inherited
                        } else {
                            Visibility::Hidden
                        };
                    }
                }
            }
            PropEffect::SetLight {
                light,
                visible,
                color,
                intensity,
            } => {
                if let Ok(mut point_light) = point_lights.get_mut(*light) {
                    point_light.color = *color;
                    point_light.intensity = *intensity;
                }
                if let Ok(mut visibility) = visibilities.get_mut(*light) {
                    *visibility = if *visible {
                        Visibility::Inherited
                    } else {
                        Visibility::Hidden
                    };
                }
            }
            PropEffect::SetEmissive {
                mesh,
                color,
                intensity,
            } => {
                for_each_material(*mesh, &children, &mesh_materials, |_, handle| {
                    if let Some(material) = materials.get_mut(handle) {
                        material.emissive = emissive(*color, *intensity);
                    }
                });
            }
            PropEffect::SetScreen { key, on, config } => {
                if !screens.contains(key) {
                    let mut cloned = Vec::new();
                    for_each_material(key.node, &children, &mesh_materials, |entity, handle| {
                        let Some(source) = materials.get(handle).cloned() else {
                            return;
                        };
                        let record = ScreenMaterial::record(&source, materials.add(source.clone()));
                        commands
                            .entity(entity)
                            .insert(MeshMaterial3d(record.handle.clone()));
                        cloned.push(record);
                    });
                    if cloned.is_empty() {
                        warn!("Screen {} has no material to switch", key.prop);
                        continue;
                    }
                    debug!("Cloned {} material(s) for screen {}", cloned.len(), key.prop);
                    screens.insert(key.clone(), cloned);
                }
                for record in screens.get(key) {
                    if let Some(material) = materials.get_mut(&record.handle) {
                        apply_screen_state(material, record, *on, config, &black.handle);
                    }
                }
            }
            PropEffect::SetFluid {
                prop,
                shape,
                visible,
            } => {
                let target = if *visible {
                    Visibility::Inherited
                } else {
                    Visibility::Hidden
                };
                if let Some(entity) = fluids.spawned.get(prop) {
                    if let Ok(mut visibility) = visibilities.get_mut(*entity) {
                        *visibility = target;
                    }
                    continue;
                }
                let entity = commands
                    .spawn((
                        Name::new(format!("{prop}_fluid")),
                        Mesh3d(meshes.add(Cylinder::new(shape.radius, shape.height))),
                        MeshMaterial3d(materials.add(StandardMaterial {
                            base_color: shape.color.with_alpha(0.6),
                            emissive: emissive(shape.color, 0.2),
                            alpha_mode: AlphaMode::Blend,
                            perceptual_roughness: 0.1,
                            ..default()
                        })),
                        Transform::from_translation(shape.position),
                        target,
                    ))
                    .id();
                debug!("Spawned fluid effect for {}", prop);
                fluids.spawned.insert(prop.clone(), entity);
            }
            PropEffect::SetRotation { node, rotation } => {
                if let Ok(mut transform) = transforms.get_mut(*node) {
                    transform.rotation = *rotation;
                }
            }
            PropEffect::EmergencyStarted | PropEffect::EmergencyEnded => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let mut app = App::new();
        app.init_resource::<Assets<StandardMaterial>>()
            .init_resource::<Assets<Mesh>>()
            .add_event::<PropEffect>()
            .init_resource::<ScreenMaterials>()
            .init_resource::<FluidEffects>()
            .insert_resource(BlackTexture::new(Handle::default()))
            .add_systems(Update, apply_prop_effects);
        app
    }

    #[test]
    fn flip_visibility_twice_restores() {
        let mut app = app();
        let node = app.world_mut().spawn(Visibility::Inherited).id();

        app.world_mut().send_event(PropEffect::FlipVisibility { nodes: vec![node] });
        app.update();
        assert_eq!(app.world().get::<Visibility>(node), Some(&Visibility::Hidden));

        app.world_mut().send_event(PropEffect::FlipVisibility { nodes: vec![node] });
        app.update();
        assert_eq!(app.world().get::<Visibility>(node), Some(&Visibility::Inherited));
    }

    #[test]
    fn fluid_is_spawned_once_then_toggled() {
        let mut app = app();
        let shape = FluidShape {
            position: Vec3::new(1.0, 1.0, 1.0),
            radius: 0.05,
            height: 0.3,
            color: Color::srgb(0.6, 0.8, 1.0),
        };
        let fluid = |visible| PropEffect::SetFluid {
            prop: "sink".to_string(),
            shape,
            visible,
        };

        app.world_mut().send_event(fluid(true));
        app.update();
        let entity = app.world().resource::<FluidEffects>().spawned["sink"];
        assert_eq!(app.world().get::<Visibility>(entity), Some(&Visibility::Inherited));

        app.world_mut().send_event(fluid(false));
        app.update();
        assert_eq!(app.world().resource::<FluidEffects>().spawned.len(), 1);
        assert_eq!(app.world().get::<Visibility>(entity), Some(&Visibility::Hidden));
    }

    #[test]
    fn switching_one_screen_leaves_siblings_on_the_shared_material() {
        let mut app = app();
        let texture = Handle::weak_from_u128(51);
        let shared = app
            .world_mut()
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                base_color_texture: Some(texture.clone()),
                emissive: LinearRgba::rgb(0.5, 0.8, 1.0),
                ..default()
            });
        let first = app.world_mut().spawn(MeshMaterial3d(shared.clone())).id();
        let second = app.world_mut().spawn(MeshMaterial3d(shared.clone())).id();

        app.world_mut().send_event(PropEffect::SetScreen {
            key: MaterialKey {
                prop: "tvScreen_Ecran1".to_string(),
                node: first,
            },
            on: false,
            config: MaterialConfig {
                emissive: 0x000000,
                emissive_intensity: 0.0,
                color: Some(0x000000),
            },
        });
        app.update();

        let handle_of = |entity| {
            app.world()
                .get::<MeshMaterial3d<StandardMaterial>>(entity)
                .map(|material| material.0.clone())
        };
        let first_handle = handle_of(first).unwrap();
        assert_ne!(first_handle, shared);
        assert_eq!(handle_of(second), Some(shared.clone()));

        let materials = app.world().resource::<Assets<StandardMaterial>>();
        let switched = materials.get(&first_handle).unwrap();
        assert_eq!(switched.base_color_texture, Some(Handle::default()));
        assert_eq!(switched.emissive, LinearRgba::rgb(0.0, 0.0, 0.0));

        let untouched = materials.get(&shared).unwrap();
        assert_eq!(untouched.base_color_texture, Some(texture));
        assert_eq!(untouched.emissive, LinearRgba::rgb(0.5, 0.8, 1.0));
    }

    #[test]
    fn set_light_updates_color_intensity_and_visibility() {
        let mut app = app();
        let light = app
            .world_mut()
            .spawn((PointLight::default(), Visibility::Inherited))
            .id();

        app.world_mut().send_event(PropEffect::SetLight {
            light,
            visible: false,
            color: Color::srgb(1.0, 0.0, 0.0),
            intensity: 0.0,
        });
        app.update();

        let point_light = app.world().get::<PointLight>(light).unwrap();
        assert_eq!(point_light.intensity, 0.0);
        assert_eq!(point_light.color, Color::srgb(1.0, 0.0, 0.0));
        assert_eq!(app.world().get::<Visibility>(light), Some(&Visibility::Hidden));
    }
}
