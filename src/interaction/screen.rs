use std::collections::HashMap;

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use super::effects::emissive;
use super::registry::MaterialConfig;
use crate::config::{color_from_hex, StationConfig};

/// Identifies one screen's cloned materials: the prop and the node it was resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialKey {
    pub prop: String,
    pub node: Entity,
}

/// A per-prop material clone and the values it had before it was first switched.
#[derive(Debug, Clone)]
pub struct ScreenMaterial {
    pub handle: Handle<StandardMaterial>,
    pub original_texture: Option<Handle<Image>>,
    pub original_color: Color,
}

impl ScreenMaterial {
    pub fn record(source: &StandardMaterial, handle: Handle<StandardMaterial>) -> Self {
        Self {
            handle,
            original_texture: source.base_color_texture.clone(),
            original_color: source.base_color,
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct ScreenMaterials {
    clones: HashMap<MaterialKey, Vec<ScreenMaterial>>,
}

impl ScreenMaterials {
    pub fn contains(&self, key: &MaterialKey) -> bool {
        self.clones.contains_key(key)
    }

    pub fn insert(&mut self, key: MaterialKey, materials: Vec<ScreenMaterial>) {
        self.clones.insert(key, materials);
    }

    pub fn get(&self, key: &MaterialKey) -> &[ScreenMaterial] {
        self.clones.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScreenMaterial> {
        self.clones.values().flatten()
    }
}

/// Texture shown on switched-off screens.
#[derive(Resource, Debug, Clone)]
pub struct BlackTexture {
    pub handle: Handle<Image>,
    fallback: bool,
}

impl BlackTexture {
    pub fn new(handle: Handle<Image>) -> Self {
        Self {
            handle,
            fallback: false,
        }
    }

    /// Swaps in a generated texture and repoints screens that showed the old one.
    pub fn fall_back(
        &mut self,
        images: &mut Assets<Image>,
        materials: &mut Assets<StandardMaterial>,
        screens: &ScreenMaterials,
    ) {
        if self.fallback {
            return;
        }
        let failed = std::mem::replace(&mut self.handle, images.add(black_image()));
        self.fallback = true;

        for record in screens.iter() {
            if let Some(material) = materials.get_mut(&record.handle) {
                if material.base_color_texture.as_ref() == Some(&failed) {
                    material.base_color_texture = Some(self.handle.clone());
                }
            }
        }
    }
}

/// Writes the on or off bundle into a cloned screen material.
pub fn apply_screen_state(
    material: &mut StandardMaterial,
    record: &ScreenMaterial,
    on: bool,
    config: &MaterialConfig,
    black: &Handle<Image>,
) {
    material.emissive = emissive(color_from_hex(config.emissive), config.emissive_intensity);
    if on {
        material.base_color_texture = record.original_texture.clone();
        material.base_color = config
            .color
            .map(color_from_hex)
            .unwrap_or(record.original_color);
    } else {
        material.base_color_texture = Some(black.clone());
        material.base_color = config.color.map(color_from_hex).unwrap_or(Color::BLACK);
    }
}

/// 1x1 opaque black image.
pub fn black_image() -> Image {
    Image::new_fill(
        Extent3d {
            width: 1,
            height: 1,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 255],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}

pub fn load_black_texture(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<StationConfig>,
) {
    let handle = asset_server.load(config.interaction.black_texture_path.clone());
    commands.insert_resource(BlackTexture::new(handle));
}

/// Swaps in a synthesized texture when the black screen asset fails to load.
pub fn fallback_black_texture(
    asset_server: Res<AssetServer>,
    mut black: ResMut<BlackTexture>,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    screens: Res<ScreenMaterials>,
) {
    if black.fallback || !matches!(asset_server.load_state(&black.handle), LoadState::Failed(_)) {
        return;
    }
    warn!("Black screen texture failed to load, using a generated one");
    black.fall_back(&mut images, &mut materials, &screens);
}

#[cfg(test)]
mod tests {
    use super::*;

    const ON: MaterialConfig = MaterialConfig {
        emissive: 0x87CEFA,
        emissive_intensity: 2.0,
        color: None,
    };
    const OFF: MaterialConfig = MaterialConfig {
        emissive: 0x000000,
        emissive_intensity: 0.0,
        color: Some(0x000000),
    };

    fn screen() -> (StandardMaterial, ScreenMaterial, Handle<Image>) {
        let texture = Handle::weak_from_u128(41);
        let source = StandardMaterial {
            base_color: Color::srgb(0.5, 0.5, 0.5),
            base_color_texture: Some(texture.clone()),
            ..default()
        };
        let record = ScreenMaterial::record(&source, Handle::weak_from_u128(42));
        (source, record, texture)
    }

    #[test]
    fn off_then_on_restores_original_texture() {
        let (mut material, record, texture) = screen();
        let black = Handle::weak_from_u128(43);

        apply_screen_state(&mut material, &record, false, &OFF, &black);
        assert_eq!(material.base_color_texture, Some(black.clone()));
        assert_eq!(material.emissive, LinearRgba::rgb(0.0, 0.0, 0.0));

        apply_screen_state(&mut material, &record, true, &ON, &black);
        assert_eq!(material.base_color_texture, Some(texture));
        assert_eq!(material.base_color, Color::srgb(0.5, 0.5, 0.5));
    }

    #[test]
    fn off_without_color_falls_back_to_black() {
        let (mut material, record, _) = screen();
        let off = MaterialConfig { color: None, ..OFF };
        apply_screen_state(&mut material, &record, false, &off, &Handle::default());
        assert_eq!(material.base_color, Color::BLACK);
    }

    #[test]
    fn unknown_key_has_no_materials() {
        let screens = ScreenMaterials::default();
        let key = MaterialKey {
            prop: "tv".into(),
            node: Entity::from_raw(1),
        };
        assert!(!screens.contains(&key));
        assert!(screens.get(&key).is_empty());
    }

    #[test]
    fn fallback_repoints_only_switched_off_screens() {
        let mut images = Assets::<Image>::default();
        let mut materials = Assets::<StandardMaterial>::default();
        let failed = Handle::weak_from_u128(44);
        let mut black = BlackTexture::new(failed.clone());

        let (source, _, texture) = screen();
        let off = materials.add(StandardMaterial {
            base_color_texture: Some(failed.clone()),
            ..source.clone()
        });
        let on = materials.add(source.clone());
        let mut screens = ScreenMaterials::default();
        for (node, handle) in [(1, &off), (2, &on)] {
            screens.insert(
                MaterialKey {
                    prop: format!("tv{node}"),
                    node: Entity::from_raw(node),
                },
                vec![ScreenMaterial::record(&source, handle.clone())],
            );
        }

        black.fall_back(&mut images, &mut materials, &screens);

        assert_ne!(black.handle, failed);
        assert_eq!(images.get(&black.handle).map(Image::width), Some(1));
        assert_eq!(
            materials.get(&off).unwrap().base_color_texture,
            Some(black.handle.clone())
        );
        assert_eq!(materials.get(&on).unwrap().base_color_texture, Some(texture));
    }

    #[test]
    fn generated_black_image_is_single_pixel() {
        let image = black_image();
        assert_eq!(image.width(), 1);
        assert_eq!(image.height(), 1);
        assert_eq!(image.data, vec![0, 0, 0, 255]);
    }
}
