use glam::Mat4;
use parkview_common::{ModelHandle, TextureHandle};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

use crate::backend::{DepthFunc, Program, RenderBackend};

/// One backend call, as issued.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Clear([f32; 4]),
    UseProgram(Program),
    SetMat4 { name: String, value: Mat4 },
    SetInt { name: String, value: i32 },
    SetDepthFunc(DepthFunc),
    DrawModel(ModelHandle),
    BindCubemap { unit: u32, texture: TextureHandle },
    DrawSkybox(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTarget {
    Model(ModelHandle),
    Skybox(TextureHandle),
}

/// State captured at the moment a draw actually produced geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub program: Program,
    pub target: DrawTarget,
    pub model: Option<Mat4>,
    pub view: Option<Mat4>,
    pub projection: Option<Mat4>,
    pub depth_func: DepthFunc,
}

/// Headless backend that records every call.
///
/// Models marked unavailable and empty cubemaps produce no [`DrawRecord`],
/// matching how a real backend skips them. Uniform writes with no program
/// bound are counted as violations.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    draws: Vec<DrawRecord>,
    program: Option<Program>,
    mat4s: BTreeMap<(Program, String), Mat4>,
    ints: BTreeMap<(Program, String), i32>,
    depth_func: DepthFunc,
    cubemaps: BTreeMap<u32, TextureHandle>,
    unavailable: BTreeSet<ModelHandle>,
    violations: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat `model` as failed to load; drawing it yields nothing.
    pub fn mark_unavailable(&mut self, model: ModelHandle) {
        self.unavailable.insert(model);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn violations(&self) -> usize {
        self.violations
    }

    pub fn mat4_uniform(&self, program: Program, name: &str) -> Option<Mat4> {
        self.mat4s.get(&(program, name.to_owned())).copied()
    }

    pub fn int_uniform(&self, program: Program, name: &str) -> Option<i32> {
        self.ints.get(&(program, name.to_owned())).copied()
    }

    /// Forget recorded calls, keeping bound state.
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    /// SHA-256 over the exact bit patterns of every recorded call.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for command in &self.commands {
            hash_command(&mut hasher, command);
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    fn record_draw(&mut self, program: Program, target: DrawTarget) {
        let uniform = |name: &str| self.mat4s.get(&(program, name.to_owned())).copied();
        let record = DrawRecord {
            program,
            target,
            model: uniform(crate::uniforms::MODEL),
            view: uniform(crate::uniforms::VIEW),
            projection: uniform(crate::uniforms::PROJECTION),
            depth_func: self.depth_func,
        };
        self.draws.push(record);
    }
}

impl RenderBackend for RecordingBackend {
    fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(Command::Clear(color));
    }

    fn use_program(&mut self, program: Program) {
        self.program = Some(program);
        self.commands.push(Command::UseProgram(program));
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.commands.push(Command::SetMat4 {
            name: name.to_owned(),
            value: *value,
        });
        match self.program {
            Some(program) => {
                self.mat4s.insert((program, name.to_owned()), *value);
            }
            None => self.violations += 1,
        }
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.commands.push(Command::SetInt {
            name: name.to_owned(),
            value,
        });
        match self.program {
            Some(program) => {
                self.ints.insert((program, name.to_owned()), value);
            }
            None => self.violations += 1,
        }
    }

    fn depth_func(&self) -> DepthFunc {
        self.depth_func
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        self.depth_func = func;
        self.commands.push(Command::SetDepthFunc(func));
    }

    fn draw_model(&mut self, model: ModelHandle) {
        self.commands.push(Command::DrawModel(model));
        let Some(program) = self.program else {
            self.violations += 1;
            return;
        };
        if !self.unavailable.contains(&model) {
            self.record_draw(program, DrawTarget::Model(model));
        }
    }

    fn bind_cubemap(&mut self, unit: u32, texture: TextureHandle) {
        self.cubemaps.insert(unit, texture);
        self.commands.push(Command::BindCubemap { unit, texture });
    }

    fn draw_skybox(&mut self, vertex_count: u32) {
        self.commands.push(Command::DrawSkybox(vertex_count));
        let Some(program) = self.program else {
            self.violations += 1;
            return;
        };
        let texture = self
            .cubemaps
            .get(&crate::SKYBOX_TEXTURE_UNIT)
            .copied()
            .unwrap_or_default();
        if !texture.is_empty() {
            self.record_draw(program, DrawTarget::Skybox(texture));
        }
    }
}

fn hash_command(hasher: &mut Sha256, command: &Command) {
    let mat = |hasher: &mut Sha256, m: &Mat4| {
        for v in m.to_cols_array() {
            hasher.update(v.to_bits().to_le_bytes());
        }
    };
    match command {
        Command::Clear(color) => {
            hasher.update([0u8]);
            for c in color {
                hasher.update(c.to_bits().to_le_bytes());
            }
        }
        Command::UseProgram(program) => hasher.update([1u8, *program as u8]),
        Command::SetMat4 { name, value } => {
            hasher.update([2u8]);
            hasher.update(name.as_bytes());
            mat(hasher, value);
        }
        Command::SetInt { name, value } => {
            hasher.update([3u8]);
            hasher.update(name.as_bytes());
            hasher.update(value.to_le_bytes());
        }
        Command::SetDepthFunc(func) => hasher.update([4u8, *func as u8]),
        Command::DrawModel(model) => {
            hasher.update([5u8]);
            hasher.update(model.0.to_le_bytes());
        }
        Command::BindCubemap { unit, texture } => {
            hasher.update([6u8]);
            hasher.update(unit.to_le_bytes());
            hasher.update(texture.0.to_le_bytes());
        }
        Command::DrawSkybox(count) => {
            hasher.update([7u8]);
            hasher.update(count.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms;

    #[test]
    fn uniform_before_program_is_a_violation() {
        let mut backend = RecordingBackend::new();
        backend.set_mat4(uniforms::VIEW, &Mat4::IDENTITY);
        assert_eq!(backend.violations(), 1);

        backend.use_program(Program::Scene);
        backend.set_mat4(uniforms::VIEW, &Mat4::IDENTITY);
        assert_eq!(backend.violations(), 1);
        assert_eq!(
            backend.mat4_uniform(Program::Scene, uniforms::VIEW),
            Some(Mat4::IDENTITY)
        );
        assert_eq!(backend.mat4_uniform(Program::Skybox, uniforms::VIEW), None);
    }

    #[test]
    fn unavailable_models_draw_nothing() {
        let mut backend = RecordingBackend::new();
        backend.mark_unavailable(ModelHandle(2));
        backend.use_program(Program::Scene);
        backend.draw_model(ModelHandle(1));
        backend.draw_model(ModelHandle(2));
        assert_eq!(backend.commands().len(), 3);
        assert_eq!(backend.draws().len(), 1);
        assert_eq!(backend.draws()[0].target, DrawTarget::Model(ModelHandle(1)));
    }

    #[test]
    fn digest_tracks_bit_patterns() {
        let run = |value: f32| {
            let mut backend = RecordingBackend::new();
            backend.use_program(Program::Scene);
            backend.set_mat4(uniforms::MODEL, &Mat4::from_scale(glam::Vec3::splat(value)));
            backend.digest()
        };
        assert_eq!(run(2.0), run(2.0));
        assert_ne!(run(2.0), run(2.000001));
        assert_eq!(run(1.0).len(), 64);
    }

    #[test]
    fn clear_log_keeps_state() {
        let mut backend = RecordingBackend::new();
        backend.use_program(Program::Skybox);
        backend.set_int(uniforms::SKYBOX, 0);
        backend.clear_log();
        assert!(backend.commands().is_empty());
        assert_eq!(backend.int_uniform(Program::Skybox, uniforms::SKYBOX), Some(0));
    }
}
