use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Window size and title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 900,
            title: "Parkview".into(),
        }
    }
}

/// Camera start state and control parameters. Angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub world_up: Vec3,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    /// World units per second.
    pub speed: f32,
    /// Degrees of rotation per pixel of mouse travel.
    pub sensitivity: f32,
    pub fov_degrees: f32,
    pub min_fov_degrees: f32,
    pub max_fov_degrees: f32,
    /// Pitch is clamped to `[-pitch_limit, pitch_limit]`. Must stay below 90.
    pub pitch_limit_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            world_up: Vec3::Y,
            yaw_degrees: -90.0,
            pitch_degrees: 0.0,
            speed: 25.0,
            sensitivity: 0.1,
            fov_degrees: 45.0,
            min_fov_degrees: 1.0,
            max_fov_degrees: 45.0,
            pitch_limit_degrees: 89.0,
        }
    }
}

/// Near and far clip planes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub clear_color: [f32; 4],
    /// Scene table file. The built-in theme park is used when unset.
    pub scene: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
            clear_color: [0.1, 0.1, 0.1, 1.0],
            scene: None,
        }
    }
}

impl AppConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        if !(cam.pitch_limit_degrees > 0.0 && cam.pitch_limit_degrees < 90.0) {
            return Err(ConfigError::Invalid(format!(
                "pitch limit {} must be inside (0, 90)",
                cam.pitch_limit_degrees
            )));
        }
        if !(cam.min_fov_degrees > 0.0
            && cam.min_fov_degrees <= cam.max_fov_degrees
            && cam.max_fov_degrees < 180.0)
        {
            return Err(ConfigError::Invalid(format!(
                "fov range [{}, {}] is not valid",
                cam.min_fov_degrees, cam.max_fov_degrees
            )));
        }
        let finite = [
            ("speed", cam.speed),
            ("sensitivity", cam.sensitivity),
            ("yaw_degrees", cam.yaw_degrees),
            ("pitch_degrees", cam.pitch_degrees),
            ("fov_degrees", cam.fov_degrees),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("camera {name} {value} is not finite")));
        }
        if !cam.position.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "camera position {} is not finite",
                cam.position
            )));
        }
        // Yaw and pitch are measured against the Y axis.
        let up = cam.world_up;
        if !(up.is_finite() && up.x == 0.0 && up.z == 0.0 && up.y != 0.0) {
            return Err(ConfigError::Invalid(format!(
                "world_up {up} must point along +Y or -Y"
            )));
        }
        if !(self.projection.near > 0.0 && self.projection.far > self.projection.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes near={} far={} are not valid",
                self.projection.near, self.projection.far
            )));
        }
        Ok(())
    }

    pub fn aspect(&self) -> f32 {
        self.window.width as f32 / self.window.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.camera.yaw_degrees, -90.0);
        assert!((config.aspect() - 1500.0 / 900.0).abs() < 1e-6);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "camera:\n  speed: 4.0\nprojection:\n  far: 5000.0").unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.camera.speed, 4.0);
        assert_eq!(config.camera.sensitivity, 0.1);
        assert_eq!(config.projection.far, 5000.0);
        assert_eq!(config.projection.near, 0.1);
        assert_eq!(config.window.width, 1500);
    }

    #[test]
    fn rejects_pitch_limit_at_pole() {
        let mut config = AppConfig::default();
        config.camera.pitch_limit_degrees = 90.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_inverted_fov_range() {
        let mut config = AppConfig::default();
        config.camera.min_fov_degrees = 50.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_camera_fields() {
        let config: AppConfig = serde_yaml::from_str("camera:\n  sensitivity: .nan\n").unwrap();
        assert!(config.camera.sensitivity.is_nan());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = AppConfig::default();
        config.camera.speed = f32::INFINITY;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.camera.position.y = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn world_up_must_lie_on_the_y_axis() {
        let mut config = AppConfig::default();
        config.camera.world_up = Vec3::X;
        config.camera.yaw_degrees = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.camera.world_up = Vec3::new(0.0, 1.0, 0.1);
        assert!(config.validate().is_err());

        config.camera.world_up = Vec3::NEG_Y;
        config.validate().unwrap();
        config.camera.world_up = Vec3::new(0.0, 3.0, 0.0);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_bad_clip_planes() {
        let mut config = AppConfig::default();
        config.projection.near = 0.0;
        assert!(config.validate().is_err());
        config.projection.near = 10.0;
        config.projection.far = 1.0;
        assert!(config.validate().is_err());
    }
}
