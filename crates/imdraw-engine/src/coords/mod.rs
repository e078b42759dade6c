//! Coordinate and geometry types shared by the UI data model and the backend.
//!
//! Two spaces are in play:
//! - UI space: the coordinates the UI library emits (logical units, origin at
//!   `DrawData::display_pos`, +Y down)
//! - framebuffer space: physical pixels of the render target, origin top-left
//!
//! Conversion from UI space to framebuffer space is `(p - display_pos) * framebuffer_scale`.

mod rect;
mod vec2;
mod viewport;

pub use rect::{ClipRect, ScissorRect};
pub use vec2::Vec2;
pub use viewport::FramebufferSize;
