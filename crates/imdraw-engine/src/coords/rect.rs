use super::{FramebufferSize, Vec2};

/// Axis-aligned clip rectangle stored as corners (`min` = x1/y1, `max` = x2/y2).
///
/// The same type carries UI-space rects (as emitted by the UI library) and
/// framebuffer-space rects (after [`ClipRect::to_framebuffer`]).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClipRect {
    pub min: Vec2,
    pub max: Vec2,
}

/// Integer scissor rectangle, already clamped to the render target.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ClipRect {
    #[inline]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            min: Vec2::new(x1, y1),
            max: Vec2::new(x2, y2),
        }
    }

    /// Rect covering the whole framebuffer.
    #[inline]
    pub fn covering(fb: FramebufferSize) -> Self {
        Self {
            min: Vec2::zero(),
            max: fb.as_vec2(),
        }
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    /// Translates a UI-space rect into framebuffer pixels.
    ///
    /// `display_pos` is the UI-space origin of the viewport; `scale` is the
    /// per-axis framebuffer scale (DPI factor).
    #[inline]
    pub fn to_framebuffer(self, display_pos: Vec2, scale: Vec2) -> Self {
        Self {
            min: (self.min - display_pos).scale(scale),
            max: (self.max - display_pos).scale(scale),
        }
    }

    /// True if the rect encloses no area (or contains NaN).
    #[inline]
    pub fn is_degenerate(self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Tests whether a framebuffer-space rect can touch any pixel of `[0, W) x [0, H)`.
    ///
    /// Edge rules: a rect starting at `W`/`H` is outside, a rect ending at
    /// exactly `0` is still considered inside (its scissor clamps to zero
    /// area and the draw is skipped at encode time).
    #[inline]
    pub fn intersects_framebuffer(self, fb: FramebufferSize) -> bool {
        self.min.x < fb.width as f32
            && self.min.y < fb.height as f32
            && self.max.x >= 0.0
            && self.max.y >= 0.0
    }

    /// Clamps a framebuffer-space rect to the target and converts it to
    /// integer scissor arguments.
    ///
    /// Returns `None` if nothing remains after clamping; the caller must skip
    /// the draw since wgpu rejects scissors outside the attachment.
    pub fn to_scissor(self, fb: FramebufferSize) -> Option<ScissorRect> {
        let clamp = |v: f32, hi: u32| -> u32 {
            if v.is_nan() || v <= 0.0 {
                0
            } else {
                (v as u32).min(hi)
            }
        };

        let x = clamp(self.min.x, fb.width);
        let y = clamp(self.min.y, fb.height);
        let x2 = clamp(self.max.x, fb.width);
        let y2 = clamp(self.max.y, fb.height);

        let width = x2.saturating_sub(x);
        let height = y2.saturating_sub(y);

        if width == 0 || height == 0 {
            None
        } else {
            Some(ScissorRect { x, y, width, height })
        }
    }
}
