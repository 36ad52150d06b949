use parkview_common::TextureHandle;
use std::path::{Path, PathBuf};

use crate::{AssetError, TextureIds};

/// RGBA8 pixels decoded from an image file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Six square RGBA8 faces in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCubemap {
    pub face_size: u32,
    pub faces: [Vec<u8>; 6],
}

/// Decode an image file into RGBA8.
pub fn decode_2d(path: impl AsRef<Path>) -> Result<DecodedImage, AssetError> {
    let bytes = std::fs::read(path.as_ref())?;
    let image = image::load_from_memory(&bytes)?.to_rgba8();
    Ok(DecodedImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

/// Decode six cubemap faces. All faces must be square and the same size.
pub fn decode_cubemap(faces: &[PathBuf; 6]) -> Result<DecodedCubemap, AssetError> {
    let mut face_size = 0;
    let mut data: [Vec<u8>; 6] = Default::default();
    for (i, path) in faces.iter().enumerate() {
        let face = decode_2d(path)?;
        if face.width != face.height {
            return Err(AssetError::NonSquareFace {
                face: i,
                width: face.width,
                height: face.height,
            });
        }
        if i == 0 {
            face_size = face.width;
        } else if face.width != face_size {
            return Err(AssetError::FaceSizeMismatch {
                face: i,
                expected: face_size,
                actual: face.width,
            });
        }
        data[i] = face.rgba;
    }
    Ok(DecodedCubemap {
        face_size,
        faces: data,
    })
}

/// Texture loading seam. Implementations upload decoded pixels wherever
/// their backend keeps textures and return an opaque handle.
pub trait TextureLoader {
    fn load_2d(&mut self, path: &Path) -> Result<TextureHandle, AssetError>;
    fn load_cubemap(&mut self, faces: &[PathBuf; 6]) -> Result<TextureHandle, AssetError>;
}

/// Load a 2D texture, logging and returning an empty handle on failure.
pub fn load_2d_or_empty(loader: &mut impl TextureLoader, path: &Path) -> TextureHandle {
    match loader.load_2d(path) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!("texture failed to load at {}: {e}", path.display());
            TextureHandle::EMPTY
        }
    }
}

/// Load a cubemap, logging and returning an empty handle on failure.
pub fn load_cubemap_or_empty(
    loader: &mut impl TextureLoader,
    faces: &[PathBuf; 6],
) -> TextureHandle {
    match loader.load_cubemap(faces) {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(
                "cubemap failed to load from {}: {e}",
                faces[0].parent().unwrap_or(Path::new(".")).display()
            );
            TextureHandle::EMPTY
        }
    }
}

/// Texture loader that keeps decoded pixels in memory.
///
/// Used by headless tools to check that every texture in a scene decodes.
#[derive(Debug, Default)]
pub struct CpuTextures {
    ids: TextureIds,
    images: Vec<(TextureHandle, DecodedImage)>,
    cubemaps: Vec<(TextureHandle, DecodedCubemap)>,
}

impl CpuTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self, handle: TextureHandle) -> Option<&DecodedImage> {
        self.images
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, img)| img)
    }

    pub fn cubemap(&self, handle: TextureHandle) -> Option<&DecodedCubemap> {
        self.cubemaps
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, cube)| cube)
    }
}

impl TextureLoader for CpuTextures {
    fn load_2d(&mut self, path: &Path) -> Result<TextureHandle, AssetError> {
        let image = decode_2d(path)?;
        let handle = self.ids.next_handle();
        self.images.push((handle, image));
        Ok(handle)
    }

    fn load_cubemap(&mut self, faces: &[PathBuf; 6]) -> Result<TextureHandle, AssetError> {
        let cubemap = decode_cubemap(faces)?;
        let handle = self.ids.next_handle();
        self.cubemaps.push((handle, cubemap));
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn faces(dir: &Path, sizes: [u32; 6]) -> [PathBuf; 6] {
        let names = ["px", "nx", "py", "ny", "pz", "nz"];
        std::array::from_fn(|i| write_png(dir, &format!("{}.png", names[i]), sizes[i], sizes[i]))
    }

    #[test]
    fn decode_png_to_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "bricks.png", 4, 2);
        let img = decode_2d(&path).unwrap();
        assert_eq!((img.width, img.height), (4, 2));
        assert_eq!(img.rgba.len(), 4 * 2 * 4);
        assert_eq!(&img.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn decode_missing_file() {
        let err = decode_2d("/nonexistent/bricks.png").unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
    }

    #[test]
    fn decode_garbage_is_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(matches!(decode_2d(&path), Err(AssetError::Image(_))));
    }

    #[test]
    fn decode_cubemap_faces() {
        let dir = tempfile::tempdir().unwrap();
        let cube = decode_cubemap(&faces(dir.path(), [8; 6])).unwrap();
        assert_eq!(cube.face_size, 8);
        assert!(cube.faces.iter().all(|f| f.len() == 8 * 8 * 4));
    }

    #[test]
    fn cubemap_rejects_mismatched_faces() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_cubemap(&faces(dir.path(), [8, 8, 8, 4, 8, 8])).unwrap_err();
        assert!(matches!(
            err,
            AssetError::FaceSizeMismatch {
                face: 3,
                expected: 8,
                actual: 4
            }
        ));
    }

    #[test]
    fn cubemap_rejects_non_square_face() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = faces(dir.path(), [8; 6]);
        paths[1] = write_png(dir.path(), "wide.png", 8, 4);
        assert!(matches!(
            decode_cubemap(&paths),
            Err(AssetError::NonSquareFace { face: 1, .. })
        ));
    }

    #[test]
    fn failed_loads_yield_empty_handles() {
        let mut textures = CpuTextures::new();
        let missing = PathBuf::from("/nonexistent/face.png");
        let faces: [PathBuf; 6] = std::array::from_fn(|_| missing.clone());

        assert!(load_2d_or_empty(&mut textures, &missing).is_empty());
        assert!(load_cubemap_or_empty(&mut textures, &faces).is_empty());
    }

    #[test]
    fn cpu_textures_keep_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let mut textures = CpuTextures::new();
        let flat = load_2d_or_empty(&mut textures, &write_png(dir.path(), "a.png", 2, 2));
        let cube = load_cubemap_or_empty(&mut textures, &faces(dir.path(), [2; 6]));

        assert!(!flat.is_empty());
        assert_ne!(flat, cube);
        assert_eq!(textures.image(flat).unwrap().width, 2);
        assert_eq!(textures.cubemap(cube).unwrap().face_size, 2);
        assert!(textures.cubemap(flat).is_none());
    }
}
