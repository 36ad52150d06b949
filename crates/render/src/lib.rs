//! Viewing core: renderer-agnostic camera, catalog and frame composition.
//!
//! # Invariants
//! - The camera basis is always derived from yaw/pitch, never set directly.
//! - Catalog order is draw order; the skybox is always drawn last.
//! - The same catalog, camera state and time history produce a
//!   bit-identical sequence of backend calls.
//!
//! Backends implement [`RenderBackend`]. [`RecordingBackend`] captures
//! every call so composition can be checked without a GPU; swap in the wgpu
//! backend without changing callers.

mod backend;
mod camera;
mod catalog;
mod composer;
mod placement;
mod recording;
mod skybox;
mod viewer;

pub use backend::{DepthFunc, Program, RenderBackend, uniforms};
pub use camera::Camera;
pub use catalog::{CatalogError, SceneCatalog, SceneObject};
pub use composer::{FrameComposer, FrameStats};
pub use placement::{Animation, Placement, Rotation};
pub use recording::{Command, DrawRecord, DrawTarget, RecordingBackend};
pub use skybox::{
    DepthFuncGuard, SKYBOX_TEXTURE_UNIT, SKYBOX_VERTEX_COUNT, SKYBOX_VERTICES, SkyboxRenderer,
    rotation_only,
};
pub use viewer::{FrameClock, ViewerState};

pub fn crate_info() -> &'static str {
    "parkview-render v0.1.0"
}
