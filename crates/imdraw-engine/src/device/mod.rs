//! GPU device management for tools, tests and offscreen rendering.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - creating offscreen color targets the UI renderer can draw into
//!
//! Applications that already own a device skip this module and build a
//! `RenderCtx` from their own device and queue.

mod gpu;
mod init;
mod offscreen;

pub use gpu::Gpu;
pub use init::GpuInit;
pub use offscreen::OffscreenTarget;
