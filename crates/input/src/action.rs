use parkview_common::MoveDirection;

/// A high-level action produced from raw input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Move along the camera basis for this frame's elapsed time.
    Move(MoveDirection),
    /// Pointer travel since the previous sample, in window pixels (Y down).
    Look { dx: f32, dy: f32 },
    /// Scroll wheel delta; positive zooms in.
    Zoom(f32),
    /// Stop the frame loop.
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_move_is_constructible() {
        let a = Action::Move(MoveDirection::Forward);
        assert!(matches!(a, Action::Move(MoveDirection::Forward)));
    }

    #[test]
    fn action_look_carries_deltas() {
        let a = Action::Look { dx: 1.5, dy: -2.0 };
        assert_eq!(a, Action::Look { dx: 1.5, dy: -2.0 });
    }
}
