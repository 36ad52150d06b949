use parkview_input::{Action, InputState};

use crate::camera::Camera;

/// Frame timing from an external monotonic clock, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    start: f64,
    last: f64,
}

impl FrameClock {
    pub fn new(start: f64) -> Self {
        let start = if start.is_finite() { start } else { 0.0 };
        Self { start, last: start }
    }

    /// Advance to `now` and return the frame delta.
    ///
    /// A clock that jumps backwards or reports garbage yields a zero delta
    /// and leaves the last timestamp alone.
    pub fn tick(&mut self, now: f64) -> f32 {
        if !now.is_finite() || now < self.last {
            tracing::debug!("non-monotonic clock sample {now}, last {}", self.last);
            return 0.0;
        }
        let dt = now - self.last;
        self.last = now;
        dt as f32
    }

    /// Seconds between the start and the last accepted tick.
    pub fn elapsed(&self) -> f32 {
        (self.last - self.start) as f32
    }
}

/// Everything the frame loop mutates between frames.
#[derive(Debug, Clone)]
pub struct ViewerState {
    pub camera: Camera,
    pub clock: FrameClock,
    running: bool,
}

impl ViewerState {
    pub fn new(camera: Camera, start: f64) -> Self {
        Self {
            camera,
            clock: FrameClock::new(start),
            running: true,
        }
    }

    /// Start timing afresh at `now`, so the next frame's delta does not
    /// include whatever ran in between.
    pub fn restart_clock(&mut self, now: f64) {
        self.clock = FrameClock::new(now);
    }

    /// Apply one action. Movement is scaled by `dt`.
    pub fn apply(&mut self, action: Action, dt: f32) {
        match action {
            Action::Move(direction) => self.camera.process_movement(direction, dt),
            Action::Look { dx, dy } => self.camera.process_mouse_delta(dx, dy),
            Action::Zoom(dy) => self.camera.process_scroll(dy),
            Action::Exit => self.stop(),
        }
    }

    /// Tick the clock and apply held movement keys. Returns the delta.
    pub fn advance(&mut self, now: f64, input: &InputState) -> f32 {
        let dt = self.clock.tick(now);
        for action in input.movement_actions() {
            self.apply(action, dt);
        }
        dt
    }

    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        if self.running {
            tracing::info!("exit requested");
        }
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use parkview_common::MoveDirection;
    use parkview_input::Key;

    #[test]
    fn clock_reports_deltas_and_elapsed() {
        let mut clock = FrameClock::new(10.0);
        assert_eq!(clock.tick(10.5), 0.5);
        assert_eq!(clock.tick(10.75), 0.25);
        assert_eq!(clock.elapsed(), 0.75);
    }

    #[test]
    fn clock_rejects_backwards_and_nan() {
        let mut clock = FrameClock::new(1.0);
        clock.tick(2.0);
        assert_eq!(clock.tick(1.5), 0.0);
        assert_eq!(clock.tick(f64::NAN), 0.0);
        assert_eq!(clock.elapsed(), 1.0);
        assert_eq!(clock.tick(3.0), 1.0);
    }

    #[test]
    fn held_keys_move_by_speed_times_dt() {
        let mut viewer = ViewerState::new(Camera::new(Vec3::ZERO), 0.0);
        let mut input = InputState::new();
        input.handle_key(Key::W, true);
        let front = viewer.camera.front();

        let dt = viewer.advance(0.1, &input);
        assert!((dt - 0.1).abs() < 1e-6);
        let expected = front * 25.0 * dt;
        assert!(viewer.camera.position().abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn zero_dt_frame_does_not_move() {
        let mut viewer = ViewerState::new(Camera::new(Vec3::ZERO), 5.0);
        let mut input = InputState::new();
        input.handle_key(Key::D, true);
        viewer.advance(5.0, &input);
        assert_eq!(viewer.camera.position(), Vec3::ZERO);
    }

    #[test]
    fn restarted_clock_skips_setup_time() {
        let mut viewer = ViewerState::new(Camera::new(Vec3::ZERO), 0.0);
        let mut input = InputState::new();
        input.handle_key(Key::W, true);

        // Three seconds of startup work pass before the first frame.
        viewer.restart_clock(3.0);
        let dt = viewer.advance(3.016, &input);
        assert!((dt - 0.016).abs() < 1e-5);
        assert!(viewer.camera.position().length() < 25.0 * 0.02);
        assert!(viewer.elapsed() < 0.02);
    }

    #[test]
    fn exit_action_stops_the_loop() {
        let mut viewer = ViewerState::new(Camera::default(), 0.0);
        assert!(viewer.is_running());
        viewer.apply(Action::Exit, 0.0);
        assert!(!viewer.is_running());
    }

    #[test]
    fn look_and_zoom_reach_the_camera() {
        let mut viewer = ViewerState::new(Camera::default(), 0.0);
        viewer.apply(Action::Look { dx: 100.0, dy: 0.0 }, 0.016);
        assert!((viewer.camera.yaw_degrees() - (-80.0)).abs() < 1e-3);
        viewer.apply(Action::Zoom(5.0), 0.016);
        assert!((viewer.camera.fov_degrees() - 40.0).abs() < 1e-3);
        viewer.apply(Action::Move(MoveDirection::Left), 0.0);
        assert_eq!(viewer.camera.position(), Camera::default().position());
    }
}
