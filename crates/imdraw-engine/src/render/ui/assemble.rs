use crate::ui::{DrawData, DrawVertex};

/// One frame's geometry, concatenated across all draw lists.
///
/// Indices are re-based so a single index buffer addresses a single vertex
/// buffer. They are widened to `u32`: each list's indices fit 16 bits, the
/// concatenation of several lists does not have to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameGeometry {
    pub vertices: Vec<DrawVertex>,
    pub indices: Vec<u32>,
}

impl FrameGeometry {
    /// Concatenates every list of `data` in order.
    ///
    /// Returns `None` when the frame has no vertices or no indices (UI hidden);
    /// that is a normal condition and the caller skips the UI pass.
    pub fn assemble(data: &DrawData) -> Option<Self> {
        let total_vertices = data.total_vertex_count();
        let total_indices = data.total_index_count();
        if total_vertices == 0 || total_indices == 0 {
            return None;
        }

        let mut vertices = Vec::with_capacity(total_vertices);
        let mut indices = Vec::with_capacity(total_indices);

        for list in &data.lists {
            let base_vertex = vertices.len() as u32;
            vertices.extend_from_slice(&list.vertices);
            indices.extend(list.indices.iter().map(|&i| base_vertex + u32::from(i)));
        }

        debug_assert_eq!(vertices.len(), total_vertices);
        debug_assert_eq!(indices.len(), total_indices);

        Some(Self { vertices, indices })
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}
