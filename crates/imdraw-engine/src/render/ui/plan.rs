use bytemuck::{Pod, Zeroable};

use crate::coords::{FramebufferSize, Vec2};
use crate::ui::DrawData;

use super::batch::{build_steps, FrameStep};
use super::FrameGeometry;

// ── projection uniform ────────────────────────────────────────────────────

/// Uniform block of the UI shader: UI space → clip space.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct UiUniform {
    /// Column-major, matching WGSL `mat4x4<f32>`.
    pub projection: [[f32; 4]; 4],
}

impl UiUniform {
    /// Orthographic projection mapping the display rect to clip space.
    ///
    /// `display_pos` lands on (-1, +1) and `display_pos + display_size` on
    /// (+1, -1); +Y down in UI space, +Y up in clip space.
    pub fn orthographic(display_pos: Vec2, display_size: Vec2) -> Self {
        let l = display_pos.x;
        let r = display_pos.x + display_size.x;
        let t = display_pos.y;
        let b = display_pos.y + display_size.y;

        Self {
            projection: [
                [2.0 / (r - l), 0.0, 0.0, 0.0],
                [0.0, 2.0 / (t - b), 0.0, 0.0],
                [0.0, 0.0, -1.0, 0.0],
                [(r + l) / (l - r), (t + b) / (b - t), 0.0, 1.0],
            ],
        }
    }

    /// Applies the projection to a UI-space point (z = 0, w = 1).
    pub fn project(&self, p: Vec2) -> [f32; 4] {
        let m = &self.projection;
        let mut out = [0.0; 4];
        for (row, o) in out.iter_mut().enumerate() {
            *o = m[0][row] * p.x + m[1][row] * p.y + m[3][row];
        }
        out
    }
}

// ── frame plan ────────────────────────────────────────────────────────────

/// Why a frame's UI pass records nothing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SkipReason {
    /// The framebuffer has zero width or height (window minimized).
    ZeroFramebuffer,
    /// No vertices or no indices this frame (UI hidden).
    NoGeometry,
    /// Every element command was culled and there is no callback to run.
    AllCulled,
}

/// Result of [`FramePlan::prepare`].
#[derive(Debug)]
pub enum Prepared {
    Skip(SkipReason),
    Ready(FramePlan),
}

/// Everything the GPU side needs for one frame, computed on the CPU.
#[derive(Debug)]
pub struct FramePlan {
    pub geometry: FrameGeometry,
    pub steps: Vec<FrameStep>,
    pub framebuffer: FramebufferSize,
    pub projection: UiUniform,
    pub culled_index_count: u32,
    display_pos: Vec2,
    framebuffer_scale: Vec2,
}

impl FramePlan {
    /// Runs the geometry assembler and the batch builder over `data`.
    ///
    /// Skipped frames allocate nothing on the GPU side.
    pub fn prepare(data: &DrawData) -> Prepared {
        let framebuffer = data.framebuffer_size();
        if framebuffer.is_empty() {
            return Prepared::Skip(SkipReason::ZeroFramebuffer);
        }

        let Some(geometry) = FrameGeometry::assemble(data) else {
            return Prepared::Skip(SkipReason::NoGeometry);
        };

        let batches = build_steps(data, framebuffer);
        let has_work = batches
            .steps
            .iter()
            .any(|s| matches!(s, FrameStep::Draw(_) | FrameStep::Callback { .. }));
        if !has_work {
            return Prepared::Skip(SkipReason::AllCulled);
        }

        Prepared::Ready(Self {
            geometry,
            steps: batches.steps,
            framebuffer,
            projection: UiUniform::orthographic(data.display_pos, data.display_size),
            culled_index_count: batches.culled_index_count,
            display_pos: data.display_pos,
            framebuffer_scale: data.framebuffer_scale,
        })
    }

    /// Crops the plan to an attachment of `attachment` pixels.
    ///
    /// When the draw data describes a larger framebuffer, the framebuffer
    /// shrinks and the projection is rebuilt over the matching part of the
    /// display, so UI pixels keep their framebuffer position and scissors stay
    /// valid. Returns `false` when nothing of the frame is left.
    pub fn fit_to(&mut self, attachment: FramebufferSize) -> bool {
        let fitted = FramebufferSize::new(
            self.framebuffer.width.min(attachment.width),
            self.framebuffer.height.min(attachment.height),
        );
        if fitted.is_empty() {
            return false;
        }
        if fitted != self.framebuffer {
            let s = self.framebuffer_scale;
            let visible = Vec2::new(fitted.width as f32 / s.x, fitted.height as f32 / s.y);
            self.projection = UiUniform::orthographic(self.display_pos, visible);
            self.framebuffer = fitted;
        }
        true
    }

    pub fn batch_count(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s, FrameStep::Draw(_))).count()
    }
}
