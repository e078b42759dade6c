use std::fmt;
use std::sync::Arc;

use crate::coords::ClipRect;

use super::{DrawIdx, DrawVertex};

/// User callback embedded in a draw list.
///
/// Runs on the rendering thread, in command order, while the UI pass is being
/// recorded. It receives the draw list it belongs to and nothing from the
/// backend; any GPU work it needs is its own business.
#[derive(Clone)]
pub struct UserCallback(Arc<dyn Fn(&DrawList) + Send + Sync>);

impl UserCallback {
    pub fn new(f: impl Fn(&DrawList) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn invoke(&self, list: &DrawList) {
        (self.0)(list)
    }
}

impl fmt::Debug for UserCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UserCallback(..)")
    }
}

/// One sub-command of a draw list.
#[derive(Debug, Clone)]
pub enum DrawCmd {
    /// Draw `count` indices of the list's index segment, continuing where the
    /// previous `Elements` command stopped, clipped to `clip_rect` (UI space).
    Elements { count: u32, clip_rect: ClipRect },
    /// Invoke a user callback at this point of the sequence.
    Callback(UserCallback),
    /// Re-apply the backend's pipeline and bindings (after a callback changed them).
    ResetRenderState,
}

/// Geometry and commands for one UI layer (window, popup, overlay).
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub vertices: Vec<DrawVertex>,
    pub indices: Vec<DrawIdx>,
    pub commands: Vec<DrawCmd>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a list from raw geometry with no commands yet.
    pub fn with_geometry(vertices: Vec<DrawVertex>, indices: Vec<DrawIdx>) -> Self {
        Self {
            vertices,
            indices,
            commands: Vec::new(),
        }
    }

    /// Appends an element command covering the next `count` indices.
    pub fn push_elements(&mut self, count: u32, clip_rect: ClipRect) -> &mut Self {
        self.commands.push(DrawCmd::Elements { count, clip_rect });
        self
    }

    pub fn push_callback(&mut self, f: impl Fn(&DrawList) + Send + Sync + 'static) -> &mut Self {
        self.commands.push(DrawCmd::Callback(UserCallback::new(f)));
        self
    }

    pub fn push_reset_render_state(&mut self) -> &mut Self {
        self.commands.push(DrawCmd::ResetRenderState);
        self
    }

    /// Sum of index counts over all element commands.
    pub fn element_count(&self) -> u32 {
        self.commands
            .iter()
            .map(|cmd| match cmd {
                DrawCmd::Elements { count, .. } => *count,
                _ => 0,
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn element_count_ignores_callbacks() {
        let mut list = DrawList::new();
        list.push_elements(6, ClipRect::default())
            .push_callback(|_| {})
            .push_reset_render_state()
            .push_elements(3, ClipRect::default());
        assert_eq!(list.element_count(), 9);
        assert_eq!(list.commands.len(), 4);
    }

    #[test]
    fn callback_receives_owning_list() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = Arc::clone(&seen);
        let cb = UserCallback::new(move |l: &DrawList| {
            seen2.store(l.vertices.len(), Ordering::SeqCst);
        });

        let list = DrawList::with_geometry(vec![DrawVertex::default(); 7], vec![]);
        cb.invoke(&list);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }
}
