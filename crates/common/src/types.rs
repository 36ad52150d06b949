use serde::{Deserialize, Serialize};

/// Content-addressed handle to a renderable model.
///
/// Many catalog entries may share one handle. A handle whose model failed
/// to load stays valid as an id; backends treat drawing it as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelHandle(pub u64);

/// Opaque GPU texture handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

impl TextureHandle {
    /// Handle left behind by a texture that failed to load.
    pub const EMPTY: Self = Self(0);

    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

impl Default for TextureHandle {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Planar movement directions relative to the camera basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

impl MoveDirection {
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::Forward,
        MoveDirection::Backward,
        MoveDirection::Left,
        MoveDirection::Right,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_texture_handle() {
        assert!(TextureHandle::EMPTY.is_empty());
        assert!(TextureHandle::default().is_empty());
        assert!(!TextureHandle(3).is_empty());
    }

    #[test]
    fn model_handles_compare_by_id() {
        assert_eq!(ModelHandle(7), ModelHandle(7));
        assert_ne!(ModelHandle(7), ModelHandle(8));
    }
}
