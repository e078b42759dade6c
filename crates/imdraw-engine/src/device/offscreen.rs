use anyhow::{ensure, Context, Result};

use crate::coords::FramebufferSize;
use crate::render::RenderTarget;

/// Color texture the UI can be rendered into instead of a window surface.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: FramebufferSize,
    format: wgpu::TextureFormat,
}

impl OffscreenTarget {
    /// Creates a `RENDER_ATTACHMENT | COPY_SRC` texture of `size`.
    ///
    /// Zero extents are bumped to 1 since wgpu rejects empty textures; `size()`
    /// still reports the requested size.
    pub fn new(device: &wgpu::Device, size: FramebufferSize, format: wgpu::TextureFormat) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("imdraw offscreen target"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            size,
            format,
        }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> FramebufferSize {
        self.size
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Pairs this target with `encoder` for one frame.
    pub fn target<'a>(&'a self, encoder: &'a mut wgpu::CommandEncoder) -> RenderTarget<'a> {
        RenderTarget::new(encoder, &self.view, self.size)
    }

    /// Copies the texture back to the CPU as tightly packed rows.
    ///
    /// Blocks until the GPU has finished all submitted work. Only 4-byte
    /// color formats are supported.
    pub fn read_pixels(&self, device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Vec<u8>> {
        let bpp = self.format.block_copy_size(None).unwrap_or(0);
        ensure!(bpp == 4, "readback of {:?} is not supported", self.format);

        let width = self.size.width.max(1);
        let height = self.size.height.max(1);
        let row = width * bpp;
        let pitch = wgpu::util::align_to(row, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("imdraw offscreen readback"),
            size: u64::from(pitch) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("imdraw offscreen readback encoder"),
        });
        encoder.copy_texture_to_buffer(
            self.texture.as_image_copy(),
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(pitch),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = std::sync::mpsc::channel();
        readback.map_async(wgpu::MapMode::Read, .., move |res| {
            let _ = tx.send(res);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("device poll failed during readback")?;
        rx.recv()
            .context("readback map callback was dropped")?
            .context("failed to map readback buffer")?;

        let mut pixels = Vec::with_capacity((row * height) as usize);
        {
            let mapped = readback.get_mapped_range(..);
            for line in mapped.chunks_exact(pitch as usize) {
                pixels.extend_from_slice(&line[..row as usize]);
            }
        }
        readback.unmap();
        Ok(pixels)
    }
}
