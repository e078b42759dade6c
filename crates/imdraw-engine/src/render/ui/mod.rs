//! Backend for immediate-mode UI draw data.
//!
//! Per frame:
//! 1. `FramePlan::prepare` concatenates geometry (`assemble`) and builds the
//!    ordered step list (`batch`); pure CPU, allocates nothing on the GPU
//! 2. `TransientBuffers::upload` creates this frame's vertex/index buffers
//! 3. `StreamedUniform::write` streams the projection into the next ring slot
//! 4. `UiRenderer` records one render pass: one `draw_indexed` per batch,
//!    scissor set before each
//!
//! Once at startup `UiResources::new` builds the pipeline, font texture and sampler.

mod assemble;
mod batch;
mod error;
mod plan;
mod renderer;
mod resources;
mod scope;
mod transient;
mod uniform;

pub use assemble::FrameGeometry;
pub use batch::{build_steps, BatchOutput, DrawBatch, FrameStep};
pub use error::{FrameError, InitError};
pub use plan::{FramePlan, Prepared, SkipReason, UiUniform};
pub use renderer::{FrameOutcome, FrameStats, UiRenderer, UiRendererConfig};
pub use resources::{UiResources, BIND_GROUP, SAMPLER_BINDING, TEXTURE_BINDING, UNIFORM_BINDING};
pub use transient::TransientBuffers;
pub use uniform::{SlotRing, StreamedUniform, UniformBinding};
