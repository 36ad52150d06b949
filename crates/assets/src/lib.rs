//! Asset side of the viewer: model registry and texture loading.
//!
//! Models are identified by content-addressed handles derived from their
//! file path. The renderer consumes models and textures by handle, never by
//! raw file path.
//!
//! # Invariants
//! - Load failures are never fatal. A failed model keeps its handle with a
//!   `Failed` status; a failed texture yields [`TextureHandle::EMPTY`].
//! - The store owns every handle it hands out for the lifetime of the run.

mod textures;

pub use textures::{
    CpuTextures, DecodedCubemap, DecodedImage, TextureLoader, decode_2d, decode_cubemap,
    load_2d_or_empty, load_cubemap_or_empty,
};

use parkview_common::{ModelHandle, TextureHandle};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),
    #[error("cubemap face {face} is {width}x{height}, faces must be square")]
    NonSquareFace { face: usize, width: u32, height: u32 },
    #[error("cubemap face {face} is {actual}px, expected {expected}px like face 0")]
    FaceSizeMismatch {
        face: usize,
        expected: u32,
        actual: u32,
    },
}

/// Load state of a registered model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    Ready,
    Failed(String),
}

/// A model entry in the registry.
#[derive(Debug, Clone)]
pub struct ModelEntry {
    pub key: String,
    pub path: PathBuf,
    pub status: ModelStatus,
}

/// Content-addressed model registry.
///
/// Registering the same path twice yields the same handle, so catalog
/// entries that place one model several times share it.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    models: BTreeMap<ModelHandle, ModelEntry>,
    keys: BTreeMap<String, ModelHandle>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model file under `key` and return its handle.
    ///
    /// Parsing the mesh is the loader backend's job; here the file only has
    /// to exist and be readable. Failures are logged and recorded.
    pub fn register_model(&mut self, key: &str, path: impl AsRef<Path>) -> ModelHandle {
        let path = path.as_ref();
        let handle = content_hash(path);
        let status = match check_readable(path) {
            Ok(()) => ModelStatus::Ready,
            Err(e) => {
                tracing::warn!("model '{key}' failed to load from {}: {e}", path.display());
                ModelStatus::Failed(e.to_string())
            }
        };
        self.models.insert(
            handle,
            ModelEntry {
                key: key.to_string(),
                path: path.to_path_buf(),
                status,
            },
        );
        self.keys.insert(key.to_string(), handle);
        handle
    }

    /// Handle registered under `key`.
    pub fn handle_for(&self, key: &str) -> Option<ModelHandle> {
        self.keys.get(key).copied()
    }

    pub fn get(&self, handle: ModelHandle) -> Option<&ModelEntry> {
        self.models.get(&handle)
    }

    pub fn is_ready(&self, handle: ModelHandle) -> bool {
        matches!(
            self.models.get(&handle).map(|m| &m.status),
            Some(ModelStatus::Ready)
        )
    }

    /// Handles of every model that loaded, in handle order.
    pub fn ready_handles(&self) -> impl Iterator<Item = ModelHandle> + '_ {
        self.models
            .iter()
            .filter(|(_, m)| m.status == ModelStatus::Ready)
            .map(|(h, _)| *h)
    }

    pub fn failed_count(&self) -> usize {
        self.models
            .values()
            .filter(|m| matches!(m.status, ModelStatus::Failed(_)))
            .count()
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn check_readable(path: &Path) -> Result<(), AssetError> {
    let meta = std::fs::metadata(path)?;
    if !meta.is_file() {
        return Err(AssetError::NotAFile(path.to_path_buf()));
    }
    std::fs::File::open(path)?;
    Ok(())
}

fn content_hash(path: &Path) -> ModelHandle {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    ModelHandle(u64::from_le_bytes(bytes))
}

/// Texture handle allocator shared by loader implementations.
///
/// Hands out ids starting at 1 so that 0 stays [`TextureHandle::EMPTY`].
#[derive(Debug, Clone, Default)]
pub struct TextureIds {
    next: u32,
}

impl TextureIds {
    pub fn next_handle(&mut self) -> TextureHandle {
        self.next += 1;
        TextureHandle(self.next)
    }
}

pub fn crate_info() -> &'static str {
    "parkview-assets v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn register_readable_model() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "o cube").unwrap();

        let mut store = AssetStore::new();
        let id = store.register_model("cube", file.path());
        assert!(store.is_ready(id));
        assert_eq!(store.handle_for("cube"), Some(id));
        assert_eq!(store.len(), 1);
        assert_eq!(store.failed_count(), 0);
    }

    #[test]
    fn missing_model_is_recorded_not_fatal() {
        let mut store = AssetStore::new();
        let id = store.register_model("ghost", "/nonexistent/ghost.obj");
        assert!(!store.is_ready(id));
        assert!(matches!(
            store.get(id).map(|m| &m.status),
            Some(ModelStatus::Failed(_))
        ));
        assert_eq!(store.failed_count(), 1);
        assert_eq!(store.ready_handles().count(), 0);
    }

    #[test]
    fn directory_is_not_a_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AssetStore::new();
        let id = store.register_model("dir", dir.path());
        assert!(!store.is_ready(id));
    }

    #[test]
    fn content_addressed_dedup() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut store = AssetStore::new();
        let id1 = store.register_model("a", file.path());
        let id2 = store.register_model("b", file.path());
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.handle_for("a"), store.handle_for("b"));
    }

    #[test]
    fn texture_ids_skip_empty() {
        let mut ids = TextureIds::default();
        let first = ids.next_handle();
        assert!(!first.is_empty());
        assert_ne!(first, ids.next_handle());
    }
}
