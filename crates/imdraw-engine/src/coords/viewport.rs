use super::Vec2;

/// Render target size in physical pixels.
///
/// Derived each frame from the UI library's display size and framebuffer scale.
/// A zero extent on either axis means the window is minimized; nothing is drawn.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FramebufferSize {
    pub width: u32,
    pub height: u32,
}

impl FramebufferSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Computes the framebuffer size for a display of `display_size` logical units
    /// rendered at `scale` physical pixels per unit.
    ///
    /// Negative or non-finite products collapse to zero.
    pub fn from_display(display_size: Vec2, scale: Vec2) -> Self {
        let px = display_size.scale(scale);
        let to_px = |v: f32| if v.is_finite() && v > 0.0 { v as u32 } else { 0 };
        Self::new(to_px(px.x), to_px(px.y))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn as_vec2(self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}
