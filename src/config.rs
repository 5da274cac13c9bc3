use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::interaction::registry::PropConfig;

/// Where the optional configuration override lives, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/station.json";

/// Reads the station config into a resource. Add after `DefaultPlugins` so load
/// errors reach the log.
pub struct ConfigPlugin {
    pub path: PathBuf,
}

impl Default for ConfigPlugin {
    fn default() -> Self {
        Self {
            path: PathBuf::from(CONFIG_PATH),
        }
    }
}

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(StationConfig::load_or_default(&self.path));
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything the station needs at startup. Every section falls back to its defaults.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub model: ModelConfig,
    pub doors: DoorConfig,
    pub scene: SceneConfig,
    pub camera: CameraConfig,
    pub player: PlayerConfig,
    pub interaction: InteractionSettings,
    pub emergency: EmergencySettings,
    pub neon: NeonSettings,
    pub bloom: BloomSettings,
    /// Overrides the built-in prop set when present.
    pub props: Option<Vec<PropConfig>>,
}

impl StationConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Loads `path` if it exists, otherwise the defaults. Parse failures are logged.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                info!("Loaded station config from {}", path.display());
                config
            }
            Err(e) => {
                error!("{} ({}), using defaults", e, path.display());
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub id: String,
    pub path: String,
    pub position: [f32; 3],
    /// Euler angles in degrees.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: "spaceStation".to_string(),
            path: "models/spaceStation.glb".to_string(),
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

impl ModelConfig {
    pub fn transform(&self) -> Transform {
        let [rx, ry, rz] = self.rotation.map(f32::to_radians);
        Transform::from_translation(Vec3::from(self.position))
            .with_rotation(Quat::from_euler(EulerRot::XYZ, rx, ry, rz))
            .with_scale(Vec3::from(self.scale))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideAxis {
    X,
    Y,
    Z,
}

impl SlideAxis {
    pub fn unit(self) -> Vec3 {
        match self {
            SlideAxis::X => Vec3::X,
            SlideAxis::Y => Vec3::Y,
            SlideAxis::Z => Vec3::Z,
        }
    }
}

/// Placement of one door. Positions are authored by hand, not derived from the doorway mesh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorInstance {
    pub doorway: String,
    pub position: [f32; 3],
    /// Yaw in degrees.
    pub yaw: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    pub texture_path: String,
    pub width: f32,
    pub height: f32,
    pub thickness: f32,
    pub slide_offset_factor: f32,
    pub animation_duration: f32,
    pub slide_axis: SlideAxis,
    pub slide_direction: f32,
    pub auto_close_delay: f32,
    /// Extra size of the invisible interaction volume around the door panel.
    pub volume_padding: [f32; 3],
    pub message_open: String,
    pub message_close: String,
    pub message_moving_suffix: String,
    pub instances: Vec<DoorInstance>,
}

impl Default for DoorConfig {
    fn default() -> Self {
        let door = |doorway: &str, position: [f32; 3], yaw: f32| DoorInstance {
            doorway: doorway.to_string(),
            position,
            yaw,
        };
        Self {
            texture_path: "textures/door_metal_panel.png".to_string(),
            width: 2.1,
            height: 3.15,
            thickness: 0.08,
            slide_offset_factor: 0.95,
            animation_duration: 0.75,
            slide_axis: SlideAxis::X,
            slide_direction: 1.0,
            auto_close_delay: 3.0,
            volume_padding: [0.2, 0.1, 1.2],
            message_open: "Press E to open the door".to_string(),
            message_close: "Press E to close the door".to_string(),
            message_moving_suffix: " (moving...)".to_string(),
            instances: vec![
                door("DoorWay1_Objet2_0", [3.5, 1.575, -5.0], 0.0),
                door("DoorWay2_Objet2_0", [-6.62, 1.575, -1.0], 90.0),
                door("DoorWay3_Objet2_0", [9.3, 1.575, 1.2], 0.0),
                door("DoorWay4_Objet2_0", [-3.5, 1.575, 4.5], 0.0),
            ],
        }
    }
}

impl DoorConfig {
    /// Offset from the closed to the open position in the door's own frame.
    pub fn local_slide_offset(&self) -> Vec3 {
        self.slide_axis.unit() * self.slide_direction.signum() * self.width * self.slide_offset_factor
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub background_color: u32,
    pub fog_color: u32,
    pub fog_near: f32,
    pub fog_far: f32,
    pub ambient_color: u32,
    pub ambient_brightness: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            background_color: 0x101010,
            fog_color: 0x101010,
            fog_near: 20.0,
            fog_far: 100.0,
            ambient_color: 0xffffff,
            ambient_brightness: 300.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub initial_position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            initial_position: [3.0, 1.7, -7.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub speed: f32,
    pub sprint_multiplier: f32,
    pub eye_height: f32,
    pub noclip_vertical_speed: f32,
    /// Walkable area on the XZ plane, `[min_x, min_z, max_x, max_z]`.
    pub walk_bounds: [f32; 4],
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 3.0,
            sprint_multiplier: 3.0,
            eye_height: 1.7,
            noclip_vertical_speed: 6.0,
            walk_bounds: [-12.0, -12.0, 12.0, 12.0],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    pub raycast_distance: f32,
    pub max_frame_delta: f32,
    pub black_texture_path: String,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            raycast_distance: 3.5,
            max_frame_delta: 1.0 / 30.0,
            black_texture_path: "textures/black.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencySettings {
    pub light_color: u32,
    pub blink_interval_ms: u64,
    pub hud_duration: f32,
}

impl Default for EmergencySettings {
    fn default() -> Self {
        Self {
            light_color: 0xff0000,
            blink_interval_ms: 500,
            hud_duration: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeonSettings {
    pub node_names: Vec<String>,
    /// Neon nodes left out of the emergency blink.
    pub emergency_exempt: Vec<String>,
    pub light_intensity: f32,
    pub light_range: f32,
    pub emissive_intensity: f32,
    pub message_on: String,
    pub message_off: String,
}

impl Default for NeonSettings {
    fn default() -> Self {
        let mut node_names = vec!["Neon_Objet_0".to_string()];
        node_names.extend((1..=14).map(|i| format!("Neon{i}_Objet_0")));
        Self {
            node_names,
            emergency_exempt: Vec::new(),
            light_intensity: 40_000.0,
            light_range: 12.0,
            emissive_intensity: 1.5,
            message_on: "Press E to turn off the neon light".to_string(),
            message_off: "Press E to turn on the neon light".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    pub enabled: bool,
    pub intensity: f32,
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            intensity: 0.25,
            threshold: 0.2,
        }
    }
}

/// Converts a `0xRRGGBB` value into an sRGB colour.
pub fn color_from_hex(hex: u32) -> Color {
    Color::srgb_u8((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = StationConfig::from_json(r#"{ "player": { "speed": 5.0 } }"#).unwrap();
        assert_eq!(config.player.speed, 5.0);
        assert_eq!(config.player.eye_height, 1.7);
        assert_eq!(config.doors.instances.len(), 4);
        assert_eq!(config.emergency.hud_duration, 10.0);
        assert!(config.props.is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            StationConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = StationConfig::load_or_default(Path::new("does/not/exist.json"));
        assert_eq!(config.interaction.raycast_distance, 3.5);
    }

    #[test]
    fn plugin_inserts_config_from_file() {
        let path = std::env::temp_dir().join("orbital_walk_plugin_config.json");
        std::fs::write(&path, r#"{ "interaction": { "raycast_distance": 5.0 } }"#).unwrap();

        let mut app = App::new();
        app.add_plugins(ConfigPlugin { path: path.clone() });
        let _ = std::fs::remove_file(&path);

        let config = app.world().resource::<StationConfig>();
        assert_eq!(config.interaction.raycast_distance, 5.0);
    }

    #[test]
    fn plugin_falls_back_on_malformed_file() {
        let path = std::env::temp_dir().join("orbital_walk_malformed_config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut app = App::new();
        app.add_plugins(ConfigPlugin { path: path.clone() });
        let _ = std::fs::remove_file(&path);

        let config = app.world().resource::<StationConfig>();
        assert_eq!(config.interaction.raycast_distance, 3.5);
    }

    #[test]
    fn default_door_slides_along_local_x() {
        let offset = DoorConfig::default().local_slide_offset();
        assert!((offset.x - 1.995).abs() < 1e-6);
        assert_eq!(offset.y, 0.0);
        assert_eq!(offset.z, 0.0);
    }

    #[test]
    fn hex_colors_decode() {
        let c = color_from_hex(0x87CEFA).to_srgba();
        assert!((c.red - 0x87 as f32 / 255.0).abs() < 1e-6);
        assert!((c.green - 0xCE as f32 / 255.0).abs() < 1e-6);
        assert!((c.blue - 0xFA as f32 / 255.0).abs() < 1e-6);
    }
}
