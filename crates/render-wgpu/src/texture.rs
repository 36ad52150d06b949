use parkview_assets::{AssetError, DecodedCubemap, DecodedImage, TextureIds, TextureLoader};
use parkview_common::TextureHandle;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

struct GpuTexture {
    _texture: wgpu::Texture,
    /// Present for cubemaps: the skybox program's group 1.
    cube_bind_group: Option<wgpu::BindGroup>,
}

/// GPU-resident textures keyed by handle.
pub struct GpuTextures {
    ids: TextureIds,
    entries: BTreeMap<TextureHandle, GpuTexture>,
    cube_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
}

impl GpuTextures {
    pub fn new(device: &wgpu::Device) -> Self {
        let cube_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cubemap_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        // Clamp on every axis so seams between faces do not bleed.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            ids: TextureIds::default(),
            entries: BTreeMap::new(),
            cube_layout,
            sampler,
        }
    }

    pub fn cube_layout(&self) -> &wgpu::BindGroupLayout {
        &self.cube_layout
    }

    pub(crate) fn cube_bind_group(&self, handle: TextureHandle) -> Option<&wgpu::BindGroup> {
        self.entries.get(&handle)?.cube_bind_group.as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow as a [`TextureLoader`] that uploads through `device` and `queue`.
    pub fn loader<'a>(
        &'a mut self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
    ) -> GpuTextureLoader<'a> {
        GpuTextureLoader {
            device,
            queue,
            textures: self,
        }
    }

    fn upload_2d(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, image: &DecodedImage) -> TextureHandle {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = create_rgba_texture(device, "texture_2d", size);
        write_layer(queue, &texture, 0, image.width, image.height, &image.rgba);

        let handle = self.ids.next_handle();
        self.entries.insert(
            handle,
            GpuTexture {
                _texture: texture,
                cube_bind_group: None,
            },
        );
        handle
    }

    fn upload_cubemap(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, cubemap: &DecodedCubemap) -> TextureHandle {
        let size = wgpu::Extent3d {
            width: cubemap.face_size,
            height: cubemap.face_size,
            depth_or_array_layers: 6,
        };
        let texture = create_rgba_texture(device, "cubemap", size);
        // Layers follow +X, -X, +Y, -Y, +Z, -Z.
        for (layer, face) in cubemap.faces.iter().enumerate() {
            write_layer(queue, &texture, layer as u32, cubemap.face_size, cubemap.face_size, face);
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("cubemap_view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cubemap_bind_group"),
            layout: &self.cube_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let handle = self.ids.next_handle();
        self.entries.insert(
            handle,
            GpuTexture {
                _texture: texture,
                cube_bind_group: Some(bind_group),
            },
        );
        handle
    }
}

/// Short-lived loader view over [`GpuTextures`].
pub struct GpuTextureLoader<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    textures: &'a mut GpuTextures,
}

impl TextureLoader for GpuTextureLoader<'_> {
    fn load_2d(&mut self, path: &Path) -> Result<TextureHandle, AssetError> {
        let image = parkview_assets::decode_2d(path)?;
        let handle = self.textures.upload_2d(self.device, self.queue, &image);
        tracing::debug!(?handle, "uploaded {}x{} texture {}", image.width, image.height, path.display());
        Ok(handle)
    }

    fn load_cubemap(&mut self, faces: &[PathBuf; 6]) -> Result<TextureHandle, AssetError> {
        let cubemap = parkview_assets::decode_cubemap(faces)?;
        let handle = self.textures.upload_cubemap(self.device, self.queue, &cubemap);
        tracing::debug!(?handle, "uploaded cubemap with {}px faces", cubemap.face_size);
        Ok(handle)
    }
}

fn create_rgba_texture(device: &wgpu::Device, label: &str, size: wgpu::Extent3d) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, layer: u32, width: u32, height: u32, rgba: &[u8]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}
