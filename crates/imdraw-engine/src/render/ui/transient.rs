use wgpu::util::DeviceExt;

use super::scope::capture;
use super::{FrameError, FrameGeometry};

/// Per-frame vertex and index buffers.
///
/// Every upload allocates a fresh pair sized to that frame's geometry; buffers
/// are never resized or rewritten. The previous pair is released only after
/// the new pair exists, and wgpu keeps a released buffer alive for as long as
/// submitted work still references it.
#[derive(Default)]
pub struct TransientBuffers {
    vertex: Option<wgpu::Buffer>,
    index: Option<wgpu::Buffer>,
    vertex_bytes: u64,
    index_bytes: u64,
    generation: u64,
}

impl TransientBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates, fills and unmaps a new vertex/index buffer pair for `geometry`.
    ///
    /// On error the previous pair is left untouched and the generation does not advance.
    pub fn upload(&mut self, device: &wgpu::Device, geometry: &FrameGeometry) -> Result<(), FrameError> {
        if geometry.is_empty() {
            return Err(FrameError::EmptyGeometry);
        }

        let vertex_data: &[u8] = bytemuck::cast_slice(&geometry.vertices);
        let index_data: &[u8] = bytemuck::cast_slice(&geometry.indices);

        let max = device.limits().max_buffer_size;
        check_size("vertex", vertex_data.len() as u64, max)?;
        check_size("index", index_data.len() as u64, max)?;

        // create_buffer_init maps at creation, copies and unmaps.
        let (vertex, index) = capture(device, || {
            let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("imdraw ui vertex buffer"),
                contents: vertex_data,
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("imdraw ui index buffer"),
                contents: index_data,
                usage: wgpu::BufferUsages::INDEX,
            });
            (vertex, index)
        })
        .map_err(|err| FrameError::Device(err.to_string()))?;

        self.vertex = Some(vertex);
        self.index = Some(index);
        self.vertex_bytes = vertex_data.len() as u64;
        self.index_bytes = index_data.len() as u64;
        self.generation += 1;

        log::trace!(
            "ui buffers #{}: {} vertex bytes, {} index bytes",
            self.generation,
            self.vertex_bytes,
            self.index_bytes
        );
        Ok(())
    }

    /// Exact byte range of the current vertex data.
    pub fn vertex_slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        self.vertex.as_ref().map(|b| b.slice(..self.vertex_bytes))
    }

    /// Exact byte range of the current index data (`Uint32`).
    pub fn index_slice(&self) -> Option<wgpu::BufferSlice<'_>> {
        self.index.as_ref().map(|b| b.slice(..self.index_bytes))
    }

    /// Number of successful uploads so far (one per rendered frame).
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn check_size(what: &'static str, size: u64, max: u64) -> Result<(), FrameError> {
    let padded = wgpu::util::align_to(size, wgpu::COPY_BUFFER_ALIGNMENT);
    if padded > max {
        Err(FrameError::BufferTooLarge { what, size: padded, max })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_check_accounts_for_padding() {
        assert!(check_size("index", 8, 8).is_ok());
        assert_eq!(
            check_size("index", 6, 6),
            Err(FrameError::BufferTooLarge { what: "index", size: 8, max: 6 })
        );
    }

    #[test]
    fn fresh_manager_has_nothing_bound() {
        let t = TransientBuffers::new();
        assert!(t.vertex_slice().is_none());
        assert!(t.index_slice().is_none());
        assert_eq!(t.generation(), 0);
    }
}
