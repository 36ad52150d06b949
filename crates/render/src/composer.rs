use glam::Mat4;
use parkview_scene::AppConfig;

use crate::backend::{Program, RenderBackend, uniforms};
use crate::camera::Camera;
use crate::catalog::SceneCatalog;
use crate::skybox::SkyboxRenderer;

/// Counts from one composed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Model draws issued, one per catalog entry.
    pub models: usize,
    pub skybox: bool,
}

/// Builds one frame's worth of backend calls from the camera and catalog.
///
/// Holds no per-frame state, so identical inputs give identical calls.
#[derive(Debug, Clone)]
pub struct FrameComposer {
    near: f32,
    far: f32,
    width: u32,
    height: u32,
    clear_color: [f32; 4],
    skybox: SkyboxRenderer,
}

impl FrameComposer {
    pub fn new(config: &AppConfig, skybox: SkyboxRenderer) -> Self {
        Self {
            near: config.projection.near,
            far: config.projection.far,
            width: config.window.width.max(1),
            height: config.window.height.max(1),
            clear_color: config.clear_color,
            skybox,
        }
    }

    /// Track a new framebuffer size. Zero sizes (minimized) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            tracing::debug!("ignoring zero-sized resize {width}x{height}");
            return;
        }
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn projection(&self, camera: &Camera) -> Mat4 {
        camera.projection_matrix(self.aspect(), self.near, self.far)
    }

    pub fn skybox(&self) -> &SkyboxRenderer {
        &self.skybox
    }

    /// Emit the frame: clear, every catalog entry in order, then the skybox.
    pub fn compose<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        camera: &Camera,
        catalog: &SceneCatalog,
        elapsed: f32,
    ) -> FrameStats {
        let _span = tracing::debug_span!("compose_frame", elapsed).entered();

        let projection = self.projection(camera);
        let view = camera.view_matrix();

        backend.clear(self.clear_color);
        backend.use_program(Program::Scene);
        backend.set_mat4(uniforms::PROJECTION, &projection);
        backend.set_mat4(uniforms::VIEW, &view);

        let mut stats = FrameStats::default();
        for object in catalog.iter() {
            backend.set_mat4(uniforms::MODEL, &object.model_matrix(elapsed));
            backend.draw_model(object.model);
            stats.models += 1;
        }

        self.skybox.render(backend, &view, &projection);
        stats.skybox = true;

        tracing::trace!(models = stats.models, "frame composed");
        stats
    }
}
