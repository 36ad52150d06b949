use glam::Mat4;
use parkview_common::{ModelHandle, TextureHandle};

/// Uniform names shared by the core and every backend's shaders.
pub mod uniforms {
    pub const MODEL: &str = "model";
    pub const VIEW: &str = "view";
    pub const PROJECTION: &str = "projection";
    /// Sampler unit of the skybox cubemap.
    pub const SKYBOX: &str = "skybox";
}

/// Depth comparison used for subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DepthFunc {
    #[default]
    Less,
    LessEqual,
}

/// Shader programs the core switches between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Program {
    /// Lit mesh program; takes `model`, `view` and `projection`.
    Scene,
    /// Cubemap program; takes `view`, `projection` and the `skybox` unit.
    Skybox,
}

/// The rendering seam: shader programs, fixed-function state and draws.
///
/// Calls are fire-and-forget and executed in submission order. Callers
/// must [`use_program`](Self::use_program) before setting that program's
/// uniforms.
pub trait RenderBackend {
    /// Clear color and depth at the start of a frame.
    fn clear(&mut self, color: [f32; 4]);

    fn use_program(&mut self, program: Program);

    /// Set a matrix uniform on the current program.
    fn set_mat4(&mut self, name: &str, value: &Mat4);

    /// Set an integer uniform on the current program.
    fn set_int(&mut self, name: &str, value: i32);

    fn depth_func(&self) -> DepthFunc;

    fn set_depth_func(&mut self, func: DepthFunc);

    /// Draw a model with the current program and uniforms.
    ///
    /// A handle whose model failed to load draws nothing.
    fn draw_model(&mut self, model: ModelHandle);

    fn bind_cubemap(&mut self, unit: u32, texture: TextureHandle);

    /// Draw the unit skybox cube. An empty bound cubemap draws nothing.
    fn draw_skybox(&mut self, vertex_count: u32);
}
