use glam::{Mat3, Mat4};
use parkview_common::TextureHandle;
use std::ops::{Deref, DerefMut};

use crate::backend::{DepthFunc, Program, RenderBackend, uniforms};

/// Texture unit the skybox cubemap is bound to.
pub const SKYBOX_TEXTURE_UNIT: u32 = 0;

pub const SKYBOX_VERTEX_COUNT: u32 = 36;

/// Unit cube, two triangles per face, positions only.
#[rustfmt::skip]
pub const SKYBOX_VERTICES: [[f32; 3]; 36] = [
    [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
    [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],

    [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],

    [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],

    [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
    [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],

    [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
    [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
];

/// Strip translation from a view matrix, keeping its upper-left 3x3.
pub fn rotation_only(view: &Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(*view))
}

/// Sets a depth function and puts the previous one back on drop.
///
/// Restoration also happens when the scope unwinds.
pub struct DepthFuncGuard<'a, B: RenderBackend + ?Sized> {
    backend: &'a mut B,
    previous: DepthFunc,
}

impl<'a, B: RenderBackend + ?Sized> DepthFuncGuard<'a, B> {
    pub fn new(backend: &'a mut B, func: DepthFunc) -> Self {
        let previous = backend.depth_func();
        backend.set_depth_func(func);
        Self { backend, previous }
    }

    pub fn previous(&self) -> DepthFunc {
        self.previous
    }
}

impl<B: RenderBackend + ?Sized> Deref for DepthFuncGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> DerefMut for DepthFuncGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: RenderBackend + ?Sized> Drop for DepthFuncGuard<'_, B> {
    fn drop(&mut self) {
        self.backend.set_depth_func(self.previous);
    }
}

/// Draws the environment cube behind everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyboxRenderer {
    cubemap: TextureHandle,
}

impl SkyboxRenderer {
    pub fn new(cubemap: TextureHandle) -> Self {
        Self { cubemap }
    }

    pub fn cubemap(&self) -> TextureHandle {
        self.cubemap
    }

    /// One-time program setup: point the sampler at the cubemap unit.
    pub fn configure<B: RenderBackend + ?Sized>(&self, backend: &mut B) {
        backend.use_program(Program::Skybox);
        backend.set_int(uniforms::SKYBOX, SKYBOX_TEXTURE_UNIT as i32);
    }

    /// Draw with depth-equal-passes so the cube lands at the far plane.
    ///
    /// Must come after all scene geometry in the frame.
    pub fn render<B: RenderBackend + ?Sized>(&self, backend: &mut B, view: &Mat4, projection: &Mat4) {
        if self.cubemap.is_empty() {
            tracing::trace!("skybox cubemap unavailable, backend will skip the draw");
        }
        let mut guard = DepthFuncGuard::new(backend, DepthFunc::LessEqual);
        guard.use_program(Program::Skybox);
        guard.set_mat4(uniforms::VIEW, &rotation_only(view));
        guard.set_mat4(uniforms::PROJECTION, projection);
        guard.bind_cubemap(SKYBOX_TEXTURE_UNIT, self.cubemap);
        guard.draw_skybox(SKYBOX_VERTEX_COUNT);
    }
}
