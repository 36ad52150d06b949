use crate::action::Action;

/// Turns absolute pointer positions into look deltas.
///
/// Makes no assumption about the sampling rate: each delta is simply the
/// travel since the previous accepted sample.
#[derive(Debug, Clone, Default)]
pub struct MouseTracker {
    last: Option<(f64, f64)>,
}

impl MouseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed an absolute window-space position.
    ///
    /// Returns `None` for the first sample after construction or
    /// [`reset`](Self::reset), for non-finite samples, and when the pointer
    /// did not move.
    pub fn sample(&mut self, x: f64, y: f64) -> Option<Action> {
        if !x.is_finite() || !y.is_finite() {
            tracing::debug!("dropping non-finite mouse sample ({x}, {y})");
            return None;
        }
        let previous = self.last.replace((x, y))?;
        let dx = (x - previous.0) as f32;
        let dy = (y - previous.1) as f32;
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        Some(Action::Look { dx, dy })
    }

    /// Forget the last position, e.g. when the window loses focus.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn is_seeded(&self) -> bool {
        self.last.is_some()
    }
}
