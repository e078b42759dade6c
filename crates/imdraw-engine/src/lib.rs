//! imdraw engine crate.
//!
//! Renders immediate-mode UI draw data (vertex/index lists plus clipped draw
//! commands) with wgpu. The UI library produces a [`ui::DrawData`] every
//! frame; [`render::ui::UiRenderer`] turns it into one render pass on top of
//! the application's frame.

pub mod coords;
pub mod device;
pub mod logging;
pub mod render;
pub mod ui;
