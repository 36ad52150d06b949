//! Shared types for the parkview workspace.
//!
//! Handles are opaque ids owned by the asset side. The viewing core only
//! ever borrows them; it never allocates or frees the resources behind them.

mod types;

pub use types::{ModelHandle, MoveDirection, TextureHandle};
