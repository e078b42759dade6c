use crate::coords::FramebufferSize;

/// Device and queue borrowed by renderers for one call.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> Self {
        Self { device, queue }
    }
}

/// Target for drawing (encoder + color view + attachment size in physical pixels).
///
/// Scissor and viewport rects are clamped to `size`; wgpu rejects rects that
/// reach outside the attachment.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    pub size: FramebufferSize,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        size: FramebufferSize,
    ) -> Self {
        Self { encoder, color_view, size }
    }
}
