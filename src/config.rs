//! Viewer configuration.
//!
//! Every setting has a default matching the built-in scene, so an empty (or
//! missing) config file is valid. Settings can be changed from code with the
//! `with_*` builder methods or loaded from TOML:
//!
//! ```toml
//! speed_factor = 4.0
//! texture_dir = "assets/textures"
//!
//! [camera]
//! speed = 200.0
//! zoom_min = 0.25
//!
//! [keys]
//! pause = "Space"
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::input::KeyBindings;

/// How fast the simulation runs and how orbits map to scene units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    /// Visual multiplier from simulated days to ticks.
    pub speed_factor: f64,
    /// Scene units per semi-major-axis unit (AU).
    pub orbit_scale: f64,
    /// Radians of self-rotation per km/h of equatorial speed, per tick.
    pub rotation_scale: f64,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            speed_factor: 10.0,
            orbit_scale: 30.0,
            rotation_scale: 0.00005,
        }
    }
}

/// Camera motion, lens and follow-mode settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting free-fly position.
    pub position: [f32; 3],
    /// Starting horizontal angle in radians. π looks down -Z.
    pub yaw: f32,
    /// Starting vertical angle in radians.
    pub pitch: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Radians per pixel of mouse motion.
    pub mouse_speed: f32,
    /// Field of view at zoom 1, in degrees.
    pub base_fov_degrees: f32,
    /// Zoom change per frame while a zoom key is held.
    pub zoom_step: f32,
    /// Smallest zoom value.
    pub zoom_min: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Follow offset behind the body, in multiples of its visual radius.
    pub follow_distance: f32,
    /// Follow offset above the body, in multiples of its visual radius.
    pub follow_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 120.0, 500.0],
            yaw: std::f32::consts::PI,
            pitch: -0.3,
            speed: 140.0,
            mouse_speed: 0.005,
            base_fov_degrees: 45.0,
            zoom_step: 0.1,
            zoom_min: 0.1,
            aspect: 4.0 / 3.0,
            near: 0.1,
            far: 4000.0,
            follow_distance: 6.0,
            follow_height: 1.5,
        }
    }
}

impl CameraConfig {
    pub fn start_position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// Point light at the Sun plus material factors.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub color: [f32; 3],
    pub position: [f32; 3],
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            position: [0.0, 0.0, 0.0],
            ambient: 0.1,
            diffuse: 1.0,
            specular: 0.3,
            shininess: 16.0,
        }
    }
}

/// Backdrop sphere drawn around the camera.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    pub enabled: bool,
    pub radius: f32,
    /// Texture file stem.
    pub texture: String,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            radius: 3000.0,
            texture: "stars".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: [f64; 3],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Solarium".to_string(),
            width: 1024,
            height: 768,
            clear_color: [0.0, 0.0, 0.3],
        }
    }
}

/// Complete viewer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    #[serde(flatten)]
    pub orbit: OrbitConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub starfield: StarfieldConfig,
    pub window: WindowConfig,
    pub keys: KeyBindings,
    /// Directory searched for `<stem>.jpg` / `<stem>.png` textures.
    pub texture_dir: PathBuf,
    pub sphere_sectors: u32,
    pub sphere_stacks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            orbit: OrbitConfig::default(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            starfield: StarfieldConfig::default(),
            window: WindowConfig::default(),
            keys: KeyBindings::default(),
            texture_dir: PathBuf::from("textures"),
            sphere_sectors: 36,
            sphere_stacks: 18,
        }
    }
}

impl SimulationConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    /// Set the visual speed multiplier.
    pub fn with_speed_factor(mut self, speed_factor: f64) -> Self {
        self.orbit.speed_factor = speed_factor;
        self
    }

    /// Set scene units per AU.
    pub fn with_orbit_scale(mut self, scale: f64) -> Self {
        self.orbit.orbit_scale = scale;
        self
    }

    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_lighting(mut self, lighting: LightingConfig) -> Self {
        self.lighting = lighting;
        self
    }

    /// Replace the backdrop settings. Use `enabled: false` to draw none.
    pub fn with_starfield(mut self, starfield: StarfieldConfig) -> Self {
        self.starfield = starfield;
        self
    }

    pub fn with_key_bindings(mut self, keys: KeyBindings) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_texture_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.texture_dir = dir.into();
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Sphere tessellation used for every body.
    pub fn with_sphere_detail(mut self, sectors: u32, stacks: u32) -> Self {
        self.sphere_sectors = sectors;
        self.sphere_stacks = stacks;
        self
    }

    /// Reject settings that would produce a degenerate scene.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(value: f64) -> bool {
            value.is_finite() && value > 0.0
        }

        let invalid = |field: &'static str, reason: &'static str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        };
        let cam = &self.camera;

        if !positive(self.orbit.speed_factor) {
            return invalid("speed_factor", "must be a positive number");
        }
        if !positive(self.orbit.orbit_scale) {
            return invalid("orbit_scale", "must be a positive number");
        }
        if !(self.orbit.rotation_scale.is_finite() && self.orbit.rotation_scale >= 0.0) {
            return invalid("rotation_scale", "must be zero or positive");
        }
        if !positive(cam.zoom_min as f64) {
            return invalid("camera.zoom_min", "must be a positive number");
        }
        if !positive(cam.zoom_step as f64) {
            return invalid("camera.zoom_step", "must be a positive number");
        }
        if !(cam.base_fov_degrees > 0.0 && cam.base_fov_degrees < 180.0) {
            return invalid("camera.base_fov_degrees", "must be between 0 and 180");
        }
        if !positive(cam.aspect as f64) {
            return invalid("camera.aspect", "must be a positive number");
        }
        if !positive(cam.near as f64) || !(cam.far > cam.near) {
            return invalid("camera.far", "clip planes need 0 < near < far");
        }
        if self.sphere_sectors < 3 || self.sphere_stacks < 2 {
            return invalid("sphere_sectors", "spheres need at least 3 sectors and 2 stacks");
        }
        if self.starfield.enabled
            && !(self.starfield.radius > 0.0 && self.starfield.radius < cam.far)
        {
            return invalid("starfield.radius", "must be positive and inside the far plane");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;

    #[test]
    fn test_defaults_are_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.orbit.speed_factor, 10.0);
        assert_eq!(config.camera.zoom_min, 0.1);
        assert_eq!(config.sphere_sectors, 36);
        assert_eq!(config.sphere_stacks, 18);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = SimulationConfig::from_toml_str(
            r#"
            speed_factor = 2.5
            texture_dir = "assets"

            [camera]
            speed = 60.0

            [keys]
            pause = "Space"
            "#,
        )
        .unwrap();

        assert_eq!(config.orbit.speed_factor, 2.5);
        assert_eq!(config.orbit.orbit_scale, 30.0);
        assert_eq!(config.camera.speed, 60.0);
        assert_eq!(config.camera.mouse_speed, 0.005);
        assert_eq!(config.texture_dir, PathBuf::from("assets"));
        assert_eq!(config.keys.pause, KeyCode::Space);
        assert_eq!(config.keys.resume, KeyCode::R);
    }

    #[test]
    fn test_rejects_zero_zoom_min() {
        let result = SimulationConfig::from_toml_str("[camera]\nzoom_min = 0.0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "camera.zoom_min", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_syntax() {
        let result = SimulationConfig::from_toml_str("speed_factor = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_builder() {
        let config = SimulationConfig::new()
            .with_speed_factor(1.0)
            .with_orbit_scale(12.0)
            .with_sphere_detail(8, 4)
            .with_window_size(800, 600);
        assert!(config.validate().is_ok());
        assert_eq!(config.orbit.orbit_scale, 12.0);
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn test_rejects_starfield_beyond_far_plane() {
        let config = SimulationConfig::new().with_starfield(StarfieldConfig {
            radius: 5000.0,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }
}
