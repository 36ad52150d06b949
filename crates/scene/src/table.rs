use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SceneError;

/// A model file the scene refers to by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub key: String,
    pub path: PathBuf,
}

/// Static rotation applied last in the placement. Degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationSpec {
    pub degrees: f32,
    pub axis: Vec3,
}

/// Time-driven rotation about `axis`, followed by a translation by `offset`.
///
/// A zero offset spins the object in place; a non-zero offset makes it
/// orbit its placement origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationSpec {
    pub axis: Vec3,
    pub degrees_per_second: f32,
    #[serde(default)]
    pub offset: Vec3,
}

/// One placed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    /// Key into [`SceneTable::models`].
    pub model: String,
    pub translation: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub rotation: Option<RotationSpec>,
    #[serde(default)]
    pub animation: Option<AnimationSpec>,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

/// Cubemap face images in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyboxSpec {
    pub faces: [PathBuf; 6],
}

/// The complete scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTable {
    pub models: Vec<ModelSpec>,
    pub objects: Vec<ObjectSpec>,
    pub skybox: SkyboxSpec,
}

impl SceneTable {
    /// Load a table from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let data = std::fs::read_to_string(path)?;
        let table = match ext.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml_str(&data)?,
            Some("json") => Self::from_json_str(&data)?,
            _ => return Err(SceneError::UnsupportedFormat(path.to_path_buf())),
        };
        tracing::info!(
            "loaded scene table from {} ({} models, {} objects)",
            path.display(),
            table.models.len(),
            table.objects.len()
        );
        Ok(table)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, SceneError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Path of the model registered under `key`.
    pub fn model_path(&self, key: &str) -> Option<&Path> {
        self.models
            .iter()
            .find(|m| m.key == key)
            .map(|m| m.path.as_path())
    }

    /// Model keys that no object references.
    pub fn unused_models(&self) -> Vec<&str> {
        self.models
            .iter()
            .filter(|m| !self.objects.iter().any(|o| o.model == m.key))
            .map(|m| m.key.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const YAML: &str = r#"
models:
  - key: wheel
    path: models/wheel.obj
objects:
  - name: near wheel
    model: wheel
    translation: [1.0, 2.0, 3.0]
  - name: far wheel
    model: wheel
    translation: [10.0, 0.0, 0.0]
    scale: [2.0, 2.0, 2.0]
    rotation:
      degrees: 45.0
      axis: [0.0, 1.0, 0.0]
    animation:
      axis: [0.0, 1.0, 0.0]
      degrees_per_second: -5.0
skybox:
  faces: [px.jpg, nx.jpg, py.jpg, ny.jpg, pz.jpg, nz.jpg]
"#;

    #[test]
    fn parse_yaml_with_defaults() {
        let table = SceneTable::from_yaml_str(YAML).unwrap();
        assert_eq!(table.objects.len(), 2);
        assert_eq!(table.objects[0].scale, Vec3::ONE);
        assert!(table.objects[0].rotation.is_none());
        let anim = table.objects[1].animation.unwrap();
        assert_eq!(anim.offset, Vec3::ZERO);
        assert_eq!(anim.degrees_per_second, -5.0);
        assert_eq!(table.skybox.faces[2], PathBuf::from("py.jpg"));
    }

    #[test]
    fn model_lookup_and_unused() {
        let mut table = SceneTable::from_yaml_str(YAML).unwrap();
        assert_eq!(table.model_path("wheel"), Some(Path::new("models/wheel.obj")));
        assert!(table.model_path("missing").is_none());
        assert!(table.unused_models().is_empty());

        table.models.push(ModelSpec {
            key: "spare".into(),
            path: "spare.obj".into(),
        });
        assert_eq!(table.unused_models(), vec!["spare"]);
    }

    #[test]
    fn load_by_extension() {
        let table = SceneTable::from_yaml_str(YAML).unwrap();

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(serde_json::to_string(&table).unwrap().as_bytes())
            .unwrap();
        assert_eq!(SceneTable::load(json.path()).unwrap(), table);

        let mut yaml = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        yaml.write_all(table.to_yaml_string().unwrap().as_bytes())
            .unwrap();
        assert_eq!(SceneTable::load(yaml.path()).unwrap(), table);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let err = SceneTable::load(file.path()).unwrap_err();
        assert!(matches!(err, SceneError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SceneTable::load("/nonexistent/scene.yaml").unwrap_err();
        assert!(matches!(err, SceneError::Io(_)));
    }
}
