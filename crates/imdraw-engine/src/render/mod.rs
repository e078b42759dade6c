//! GPU rendering subsystem.
//!
//! Renderers consume UI draw data and issue GPU commands via wgpu. Each
//! renderer owns its GPU resources (pipelines, buffers, textures).
//!
//! Convention:
//! - CPU geometry is in UI space (top-left origin, +Y down).
//! - The vertex shader converts to clip space with a per-frame projection uniform.

mod ctx;
pub mod ui;

pub use ctx::{RenderCtx, RenderTarget};
