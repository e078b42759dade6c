//! UI-library draw data model.
//!
//! Immediate-mode UI libraries hand their renderer a fresh set of draw lists
//! every frame. These types are the backend's view of that output; adapters
//! for a concrete UI library convert into them (Dear ImGui's `ImDrawData`,
//! `ImDrawList`, `ImDrawCmd` and `ImDrawVert` map onto them field for field).
//!
//! Extending the command set:
//! - add a variant to `DrawCmd`
//! - handle it in `render::ui::batch::build_steps` (emit a `FrameStep` in place)
//! - handle the new step in `UiRenderer::encode`

mod atlas;
mod data;
mod list;
mod vertex;

pub use atlas::FontAtlas;
pub use data::DrawData;
pub use list::{DrawCmd, DrawList, UserCallback};
pub use vertex::{DrawIdx, DrawVertex};
