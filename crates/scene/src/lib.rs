//! Scene description for the viewer.
//!
//! The scene is data, not logic: a table of models, object placements and
//! skybox faces. It can come from a YAML/JSON file or from the built-in
//! theme park layout.
//!
//! # Invariants
//! - Object order in the table is render order.
//! - Angles in tables and config are degrees; consumers convert once.

mod config;
mod error;
mod table;
mod theme_park;

pub use config::{AppConfig, CameraConfig, ProjectionConfig, WindowConfig};
pub use error::{ConfigError, SceneError};
pub use table::{AnimationSpec, ModelSpec, ObjectSpec, RotationSpec, SceneTable, SkyboxSpec};
pub use theme_park::theme_park;

pub fn crate_info() -> &'static str {
    "parkview-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
