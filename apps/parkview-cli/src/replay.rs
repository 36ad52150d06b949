use glam::Vec3;
use parkview_assets::AssetStore;
use parkview_common::TextureHandle;
use parkview_input::{InputState, Key, MouseTracker};
use parkview_render::{
    Camera, FrameComposer, RecordingBackend, SceneCatalog, SkyboxRenderer, ViewerState,
};
use parkview_scene::AppConfig;

/// Input sampled at one frame of a scripted run.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Seconds since start.
    pub time: f64,
    pub keys: Vec<(Key, bool)>,
    pub pointer: Option<(f64, f64)>,
    pub scroll: f32,
}

/// A fixed walk-and-look sequence at 60 frames per second.
///
/// Walks forward for the first half, strafes right for the second, sweeps
/// the pointer steadily and zooms in and back out once.
pub fn demo_script(frames: usize) -> Vec<Frame> {
    let half = frames / 2;
    (0..frames)
        .map(|i| {
            let mut keys = Vec::new();
            if i == 0 {
                keys.push((Key::W, true));
            }
            if i == half {
                keys.push((Key::W, false));
                keys.push((Key::D, true));
            }
            let scroll = match i {
                10 => 3.0,
                40 => -2.0,
                _ => 0.0,
            };
            Frame {
                time: i as f64 / 60.0,
                keys,
                pointer: Some((750.0 + 3.0 * i as f64, 450.0 - (i % 20) as f64)),
                scroll,
            }
        })
        .collect()
}

/// What a scripted run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    pub digest: String,
    pub frames: usize,
    pub draws: usize,
    pub position: Vec3,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub fov_degrees: f32,
}

/// Drive the viewer through `script` against a recording backend.
pub fn run(
    config: &AppConfig,
    catalog: &SceneCatalog,
    assets: &AssetStore,
    cubemap: TextureHandle,
    script: &[Frame],
) -> ReplayOutcome {
    let mut backend = RecordingBackend::new();
    for model in catalog.models() {
        if !assets.is_ready(model) {
            backend.mark_unavailable(model);
        }
    }

    let composer = FrameComposer::new(config, SkyboxRenderer::new(cubemap));
    composer.skybox().configure(&mut backend);

    let mut viewer = ViewerState::new(Camera::from_config(&config.camera), 0.0);
    let mut input = InputState::new();
    let mut mouse = MouseTracker::new();
    let mut frames = 0;

    for frame in script {
        for &(key, pressed) in &frame.keys {
            if let Some(action) = input.handle_key(key, pressed) {
                viewer.apply(action, 0.0);
            }
        }
        if let Some(action) = frame.pointer.and_then(|(x, y)| mouse.sample(x, y)) {
            viewer.apply(action, 0.0);
        }
        if let Some(action) = input.scroll(frame.scroll) {
            viewer.apply(action, 0.0);
        }
        viewer.advance(frame.time, &input);
        if !viewer.is_running() {
            break;
        }
        composer.compose(&mut backend, &viewer.camera, catalog, viewer.elapsed());
        frames += 1;
    }

    let camera = &viewer.camera;
    ReplayOutcome {
        digest: backend.digest(),
        frames,
        draws: backend.draws().len(),
        position: camera.position(),
        yaw_degrees: camera.yaw_degrees(),
        pitch_degrees: camera.pitch_degrees(),
        fov_degrees: camera.fov_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkview_common::ModelHandle;
    use parkview_render::{Placement, SceneObject};

    fn small_catalog() -> SceneCatalog {
        SceneCatalog::new(vec![
            SceneObject::new("a", ModelHandle(1), Placement::new(Vec3::X, Vec3::ONE)),
            SceneObject::new("b", ModelHandle(1), Placement::new(Vec3::Z, Vec3::splat(3.0))),
        ])
    }

    #[test]
    fn identical_runs_match() {
        let config = AppConfig::default();
        let assets = AssetStore::new();
        let script = demo_script(60);
        let a = run(&config, &small_catalog(), &assets, TextureHandle(1), &script);
        let b = run(&config, &small_catalog(), &assets, TextureHandle(1), &script);
        assert_eq!(a, b);
        assert_eq!(a.frames, 60);
    }

    #[test]
    fn unregistered_models_draw_nothing() {
        let config = AppConfig::default();
        let outcome = run(
            &config,
            &small_catalog(),
            &AssetStore::new(),
            TextureHandle(1),
            &demo_script(4),
        );
        // Only the skybox reaches the screen.
        assert_eq!(outcome.draws, 4);
    }

    #[test]
    fn script_moves_and_turns_the_camera() {
        let config = AppConfig::default();
        let outcome = run(
            &config,
            &small_catalog(),
            &AssetStore::new(),
            TextureHandle(1),
            &demo_script(60),
        );
        assert_ne!(outcome.position, config.camera.position);
        assert!(outcome.yaw_degrees > config.camera.yaw_degrees);
        assert!((outcome.fov_degrees - 44.0).abs() < 1e-3);
    }

    #[test]
    fn escape_ends_the_run_early() {
        let mut script = demo_script(10);
        script[3].keys.push((Key::Escape, true));
        let outcome = run(
            &AppConfig::default(),
            &small_catalog(),
            &AssetStore::new(),
            TextureHandle::EMPTY,
            &script,
        );
        assert_eq!(outcome.frames, 3);
    }
}
