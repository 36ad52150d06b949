//! wgpu render backend for the park viewer.
//!
//! Implements [`parkview_render::RenderBackend`] on top of wgpu. Scene
//! models are drawn as lit proxy cubes; the skybox samples a cube texture.
//!
//! # Invariants
//! - The backend never mutates camera or catalog state.
//! - Draws replay in submission order within one render pass.
//! - Failed models and empty cubemaps draw nothing.

mod gpu;
mod shaders;
mod texture;

pub use gpu::WgpuRenderer;
pub use texture::{GpuTextureLoader, GpuTextures};
