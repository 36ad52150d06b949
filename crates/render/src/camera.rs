use glam::{Mat4, Vec3};
use parkview_common::MoveDirection;
use parkview_scene::CameraConfig;
use std::f32::consts::{PI, TAU};

/// Largest accepted pitch limit, in degrees. Keeps the basis away from the poles.
const MAX_PITCH_LIMIT_DEGREES: f32 = 89.9;

/// First-person camera with a yaw/pitch-derived orthonormal basis.
///
/// Angles are stored in radians; the `*_degrees` accessors and the config
/// are the only places degrees appear.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    /// World units per second.
    speed: f32,
    /// Radians per pixel.
    sensitivity: f32,
    fov: f32,
    min_fov: f32,
    max_fov: f32,
    pitch_limit: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl Camera {
    /// Camera at `position` with the default orientation and controls.
    pub fn new(position: Vec3) -> Self {
        Self::from_config(&CameraConfig {
            position,
            ..CameraConfig::default()
        })
    }

    /// Build a camera from config. Non-finite fields fall back to their
    /// defaults and `world_up` is pinned to the Y axis the angles are measured in.
    pub fn from_config(config: &CameraConfig) -> Self {
        let defaults = CameraConfig::default();
        let pitch_limit = finite_or(config.pitch_limit_degrees, defaults.pitch_limit_degrees)
            .clamp(0.0, MAX_PITCH_LIMIT_DEGREES);
        let world_up = match config.world_up.try_normalize() {
            Some(up) if up.y.abs() > 1.0 - 1e-4 => Vec3::Y * up.y.signum(),
            _ => {
                tracing::warn!("world_up {} is not along Y, using +Y", config.world_up);
                Vec3::Y
            }
        };
        let mut min_fov = finite_or(config.min_fov_degrees, defaults.min_fov_degrees);
        let mut max_fov = finite_or(config.max_fov_degrees, defaults.max_fov_degrees);
        if min_fov > max_fov {
            std::mem::swap(&mut min_fov, &mut max_fov);
        }
        let position = if config.position.is_finite() {
            config.position
        } else {
            defaults.position
        };

        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: world_up,
            right: Vec3::X,
            world_up,
            yaw: wrap_angle(finite_or(config.yaw_degrees, defaults.yaw_degrees).to_radians()),
            pitch: 0.0,
            speed: finite_or(config.speed, defaults.speed),
            sensitivity: finite_or(config.sensitivity, defaults.sensitivity).to_radians(),
            fov: finite_or(config.fov_degrees, defaults.fov_degrees)
                .clamp(min_fov, max_fov)
                .to_radians(),
            min_fov: min_fov.to_radians(),
            max_fov: max_fov.to_radians(),
            pitch_limit: pitch_limit.to_radians(),
        };
        let pitch = finite_or(config.pitch_degrees, defaults.pitch_degrees);
        camera.pitch = camera.clamp_pitch(pitch.to_radians());
        camera.update_vectors();
        camera
    }

    /// Rotate by pointer travel in window pixels, screen Y pointing down.
    ///
    /// Non-finite deltas are ignored.
    pub fn process_mouse_delta(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            tracing::debug!("ignoring non-finite mouse delta ({dx}, {dy})");
            return;
        }
        self.yaw = wrap_angle(self.yaw + dx * self.sensitivity);
        // Screen Y grows downward while pitch grows upward.
        self.pitch = self.clamp_pitch(self.pitch - dy * self.sensitivity);
        self.update_vectors();
    }

    /// Zoom by a scroll delta: the field of view shrinks by `dy` degrees.
    pub fn process_scroll(&mut self, dy: f32) {
        if !dy.is_finite() {
            return;
        }
        self.fov = (self.fov - dy.to_radians()).clamp(self.min_fov, self.max_fov);
    }

    /// Move along the basis for `dt` seconds of wall-clock time.
    pub fn process_movement(&mut self, direction: MoveDirection, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let velocity = self.speed * dt;
        match direction {
            MoveDirection::Forward => self.position += self.front * velocity,
            MoveDirection::Backward => self.position -= self.front * velocity,
            MoveDirection::Left => self.position -= self.right * velocity,
            MoveDirection::Right => self.position += self.right * velocity,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, near, far)
    }

    /// Set the orientation directly, in degrees. Pitch is clamped.
    pub fn set_orientation(&mut self, yaw_degrees: f32, pitch_degrees: f32) {
        if !yaw_degrees.is_finite() || !pitch_degrees.is_finite() {
            return;
        }
        self.yaw = wrap_angle(yaw_degrees.to_radians());
        self.pitch = self.clamp_pitch(pitch_degrees.to_radians());
        self.update_vectors();
    }

    pub fn set_position(&mut self, position: Vec3) {
        if position.is_finite() {
            self.position = position;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw_degrees(&self) -> f32 {
        self.yaw.to_degrees()
    }

    pub fn pitch_degrees(&self) -> f32 {
        self.pitch.to_degrees()
    }

    /// Vertical field of view in radians.
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    fn clamp_pitch(&self, pitch: f32) -> f32 {
        pitch.clamp(-self.pitch_limit, self.pitch_limit)
    }

    fn update_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.front = Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// Wrap an angle into [-PI, PI).
fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(cam: &Camera) {
        let (f, r, u) = (cam.front(), cam.right(), cam.up());
        assert!((f.length() - 1.0).abs() < EPS, "front length {}", f.length());
        assert!((r.length() - 1.0).abs() < EPS, "right length {}", r.length());
        assert!((u.length() - 1.0).abs() < EPS, "up length {}", u.length());
        assert!(f.dot(r).abs() < EPS);
        assert!(f.dot(u).abs() < EPS);
        assert!(r.dot(u).abs() < EPS);
    }

    #[test]
    fn default_faces_negative_z() {
        let cam = Camera::new(Vec3::ZERO);
        assert!((cam.yaw_degrees() + 90.0).abs() < 1e-4);
        assert_eq!(cam.pitch_degrees(), 0.0);
        assert!(cam.front().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(cam.right().abs_diff_eq(Vec3::X, EPS));
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn pitch_clamps_below_the_pole() {
        let mut cam = Camera::default();
        // Push far past +90 degrees (pointer moving up the screen).
        for _ in 0..100 {
            cam.process_mouse_delta(0.0, -500.0);
        }
        assert!((cam.pitch_degrees() - 89.0).abs() < 1e-3);
        assert!(cam.pitch_degrees() < 90.0);
        assert!(cam.front().y < 1.0);

        for _ in 0..100 {
            cam.process_mouse_delta(0.0, 500.0);
        }
        assert!((cam.pitch_degrees() + 89.0).abs() < 1e-3);
        assert!(cam.front().y > -1.0);
        assert_orthonormal(&cam);
    }

    #[test]
    fn pitch_limit_config_cannot_reach_the_pole() {
        let cam = Camera::from_config(&CameraConfig {
            pitch_limit_degrees: 120.0,
            pitch_degrees: 120.0,
            ..CameraConfig::default()
        });
        assert!(cam.pitch_degrees() < 90.0);
        assert!(cam.front().y < 1.0);
    }

    #[test]
    fn non_finite_config_falls_back_to_defaults() {
        let mut cam = Camera::from_config(&CameraConfig {
            sensitivity: f32::NAN,
            speed: f32::INFINITY,
            yaw_degrees: f32::NAN,
            pitch_degrees: f32::NEG_INFINITY,
            fov_degrees: f32::NAN,
            position: Vec3::new(f32::NAN, 0.0, 0.0),
            ..CameraConfig::default()
        });
        assert_eq!(cam, Camera::default());

        cam.process_mouse_delta(1.0, 1.0);
        cam.process_movement(MoveDirection::Forward, 0.1);
        assert!(cam.front().is_finite());
        assert!(cam.position().is_finite());
        assert_orthonormal(&cam);
    }

    #[test]
    fn world_up_off_the_y_axis_is_pinned() {
        let cam = Camera::from_config(&CameraConfig {
            world_up: Vec3::X,
            yaw_degrees: 0.0,
            ..CameraConfig::default()
        });
        assert!(cam.right().is_finite());
        assert!(cam.up().abs_diff_eq(Vec3::Y, EPS));
        assert_orthonormal(&cam);

        let scaled = Camera::from_config(&CameraConfig {
            world_up: Vec3::new(0.0, 2.0, 0.0),
            ..CameraConfig::default()
        });
        assert_eq!(scaled, Camera::default());
    }

    #[test]
    fn basis_is_orthonormal_everywhere() {
        let mut cam = Camera::default();
        for yaw in (-360..=360).step_by(15) {
            for pitch in (-95..=95).step_by(5) {
                cam.set_orientation(yaw as f32, pitch as f32);
                assert_orthonormal(&cam);
                assert!(cam.front().y.abs() < 1.0);
            }
        }
    }

    #[test]
    fn basis_stays_orthonormal_under_mouse_sequences() {
        let mut cam = Camera::default();
        // Deterministic pseudo-random walk.
        let mut state = 0x2545_f491_u32;
        for _ in 0..2000 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let dx = (state % 400) as f32 - 200.0;
            let dy = ((state >> 8) % 400) as f32 - 200.0;
            cam.process_mouse_delta(dx, dy);
            assert_orthonormal(&cam);
        }
    }

    #[test]
    fn mouse_right_turns_right_and_up_looks_up() {
        let mut cam = Camera::new(Vec3::ZERO);
        cam.process_mouse_delta(10.0, 0.0);
        assert!((cam.yaw_degrees() + 89.0).abs() < 1e-3);
        assert!(cam.front().x > 0.0);

        cam.process_mouse_delta(0.0, -10.0);
        assert!((cam.pitch_degrees() - 1.0).abs() < 1e-3);
        assert!(cam.front().y > 0.0);
    }

    #[test]
    fn non_finite_mouse_input_is_ignored() {
        let mut cam = Camera::default();
        let before = cam.clone();
        cam.process_mouse_delta(f32::NAN, 1.0);
        cam.process_mouse_delta(1.0, f32::INFINITY);
        cam.process_scroll(f32::NAN);
        cam.process_movement(MoveDirection::Forward, f32::NAN);
        cam.set_orientation(f32::NAN, 0.0);
        assert_eq!(cam, before);
    }

    #[test]
    fn yaw_wraps_without_changing_direction() {
        let mut cam = Camera::new(Vec3::ZERO);
        let front = cam.front();
        // 3600 px at 0.1 deg/px is exactly ten full turns.
        for _ in 0..36 {
            cam.process_mouse_delta(100.0, 0.0);
        }
        assert!(cam.yaw_degrees().abs() <= 180.0);
        assert!(cam.front().abs_diff_eq(front, 1e-3));
    }

    #[test]
    fn movement_is_frame_rate_independent() {
        let mut once = Camera::new(Vec3::ZERO);
        let mut twice = once.clone();
        once.process_movement(MoveDirection::Forward, 0.1);
        twice.process_movement(MoveDirection::Forward, 0.05);
        twice.process_movement(MoveDirection::Forward, 0.05);
        assert!(once.position().abs_diff_eq(twice.position(), EPS));
        assert!(once.position().z < 0.0);
    }

    #[test]
    fn movement_follows_the_basis() {
        let config = CameraConfig::default();
        let step = config.speed * 0.5;

        let mut cam = Camera::new(Vec3::ZERO);
        cam.process_movement(MoveDirection::Right, 0.5);
        assert!(cam.position().abs_diff_eq(Vec3::new(step, 0.0, 0.0), 1e-4));
        cam.process_movement(MoveDirection::Left, 0.5);
        assert!(cam.position().abs_diff_eq(Vec3::ZERO, 1e-4));
        cam.process_movement(MoveDirection::Backward, 0.5);
        assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 0.0, step), 1e-4));
    }

    #[test]
    fn non_positive_dt_does_not_move() {
        let mut cam = Camera::new(Vec3::ONE);
        cam.process_movement(MoveDirection::Forward, 0.0);
        cam.process_movement(MoveDirection::Forward, -1.0);
        assert_eq!(cam.position(), Vec3::ONE);
    }

    #[test]
    fn fov_stays_within_bounds() {
        let mut cam = Camera::default();
        for _ in 0..1000 {
            cam.process_scroll(1.0);
        }
        assert!(cam.fov_degrees() >= 1.0 - 1e-4);

        for _ in 0..1000 {
            cam.process_scroll(-1.0);
        }
        assert!(cam.fov_degrees() <= 45.0 + 1e-4);
    }

    #[test]
    fn scroll_out_from_default_clamps_to_max() {
        let mut cam = Camera::default();
        cam.process_scroll(-5.0);
        assert!((cam.fov_degrees() - 45.0).abs() < 1e-4);

        let mut wide = Camera::from_config(&CameraConfig {
            max_fov_degrees: 90.0,
            ..CameraConfig::default()
        });
        wide.process_scroll(-5.0);
        assert!((wide.fov_degrees() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn view_matrix_maps_eye_to_origin() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 3.0));
        let view = cam.view_matrix();
        let eye = view.transform_point3(Vec3::new(0.0, 0.0, 3.0));
        assert!(eye.abs_diff_eq(Vec3::ZERO, EPS));
        // A point straight ahead lands on the -Z view axis.
        let ahead = view.transform_point3(Vec3::new(0.0, 0.0, -7.0));
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, -10.0), 1e-4));
    }

    #[test]
    fn projection_is_finite() {
        let cam = Camera::default();
        let proj = cam.projection_matrix(1500.0 / 900.0, 0.1, 1000.0);
        assert!(proj.is_finite());
    }
}
