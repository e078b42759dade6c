use crate::coords::{FramebufferSize, Vec2};

use super::DrawList;

/// Everything the UI library produced for one frame.
///
/// `display_pos`/`display_size` describe the UI-space viewport; `framebuffer_scale`
/// maps UI units to physical pixels (2.0 on a typical HiDPI display).
#[derive(Debug, Clone)]
pub struct DrawData {
    pub lists: Vec<DrawList>,
    pub display_pos: Vec2,
    pub display_size: Vec2,
    pub framebuffer_scale: Vec2,
}

impl Default for DrawData {
    fn default() -> Self {
        Self {
            lists: Vec::new(),
            display_pos: Vec2::zero(),
            display_size: Vec2::zero(),
            framebuffer_scale: Vec2::splat(1.0),
        }
    }
}

impl DrawData {
    /// Draw data for a `width` x `height` display at scale 1 with origin (0, 0).
    pub fn new(lists: Vec<DrawList>, width: f32, height: f32) -> Self {
        Self {
            lists,
            display_size: Vec2::new(width, height),
            ..Self::default()
        }
    }

    pub fn total_vertex_count(&self) -> usize {
        self.lists.iter().map(|l| l.vertices.len()).sum()
    }

    pub fn total_index_count(&self) -> usize {
        self.lists.iter().map(|l| l.indices.len()).sum()
    }

    /// Physical size of the render target this data was laid out for.
    #[inline]
    pub fn framebuffer_size(&self) -> FramebufferSize {
        FramebufferSize::from_display(self.display_size, self.framebuffer_scale)
    }
}
