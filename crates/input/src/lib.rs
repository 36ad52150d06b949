//! Input mapping: raw key state, mouse positions and scroll become [`Action`]s.
//!
//! # Invariants
//! - The camera consumes actions, never raw window events.
//! - The first mouse sample after (re)activation only seeds the tracker.
//! - Non-finite samples are dropped here, before they reach the camera.

pub mod action;
pub mod mouse;
pub mod state;

pub use action::Action;
pub use mouse::MouseTracker;
pub use state::{InputState, Key};

pub fn crate_info() -> &'static str {
    "parkview-input v0.1.0"
}
