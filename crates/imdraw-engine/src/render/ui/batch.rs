use crate::coords::{ClipRect, FramebufferSize};
use crate::ui::{DrawCmd, DrawData, UserCallback};

/// A clipped range of the frame's concatenated index buffer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawBatch {
    /// Framebuffer-space clip rect, not clamped to the target.
    pub clip_rect: ClipRect,
    /// First index in the concatenated (re-based) index buffer.
    pub index_offset: u32,
    pub index_count: u32,
}

/// One step of the UI pass, in paint order.
///
/// Geometry and callbacks share a single sequence so their relative order
/// survives any later processing.
#[derive(Debug, Clone)]
pub enum FrameStep {
    Draw(DrawBatch),
    /// `list` is the position of the owning list in `DrawData::lists`.
    Callback { list: usize, callback: UserCallback },
    ResetRenderState,
}

/// Output of [`build_steps`].
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub steps: Vec<FrameStep>,
    /// Indices covered by element commands that were culled.
    pub culled_index_count: u32,
}

impl BatchOutput {
    pub fn batches(&self) -> impl Iterator<Item = &DrawBatch> {
        self.steps.iter().filter_map(|s| match s {
            FrameStep::Draw(b) => Some(b),
            _ => None,
        })
    }

    pub fn drawn_index_count(&self) -> u32 {
        self.batches().map(|b| b.index_count).sum()
    }
}

/// Walks every command of every list and emits the frame's step sequence.
///
/// Element commands are translated to framebuffer space and dropped when
/// they are empty, degenerate or entirely outside `fb`. Dropped commands still
/// consume their index range so later batches keep pointing at the right
/// indices. Nothing is reordered.
pub fn build_steps(data: &DrawData, fb: FramebufferSize) -> BatchOutput {
    let mut out = BatchOutput::default();
    let mut list_index_base = 0u32;

    for (list_idx, list) in data.lists.iter().enumerate() {
        let mut cursor = list_index_base;
        let list_end = list_index_base + list.indices.len() as u32;

        for cmd in &list.commands {
            match cmd {
                DrawCmd::Elements { count, clip_rect } => {
                    // Never hand the GPU a range past the end of this list.
                    let available = list_end.saturating_sub(cursor);
                    let count = if *count > available {
                        log::warn!(
                            "draw list {list_idx}: command wants {count} indices, only {available} left; truncated"
                        );
                        available
                    } else {
                        *count
                    };
                    let clip = clip_rect.to_framebuffer(data.display_pos, data.framebuffer_scale);

                    if count == 0 || clip.is_degenerate() || !clip.intersects_framebuffer(fb) {
                        out.culled_index_count += count;
                    } else {
                        out.steps.push(FrameStep::Draw(DrawBatch {
                            clip_rect: clip,
                            index_offset: cursor,
                            index_count: count,
                        }));
                    }
                    cursor += count;
                }
                DrawCmd::Callback(callback) => out.steps.push(FrameStep::Callback {
                    list: list_idx,
                    callback: callback.clone(),
                }),
                DrawCmd::ResetRenderState => out.steps.push(FrameStep::ResetRenderState),
            }
        }

        list_index_base += list.indices.len() as u32;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use crate::coords::Vec2;
    use crate::ui::{DrawList, DrawVertex};

    const W: u32 = 800;
    const H: u32 = 600;

    fn fb() -> FramebufferSize {
        FramebufferSize::new(W, H)
    }

    fn full() -> ClipRect {
        ClipRect::new(0.0, 0.0, W as f32, H as f32)
    }

    fn list_with(index_count: usize) -> DrawList {
        DrawList::with_geometry(vec![DrawVertex::default(); 4], vec![0; index_count])
    }

    fn draws(out: &BatchOutput) -> Vec<DrawBatch> {
        out.batches().copied().collect()
    }

    #[test]
    fn single_quad_single_batch() {
        let mut l = list_with(6);
        l.push_elements(6, full());
        let out = build_steps(&DrawData::new(vec![l], W as f32, H as f32), fb());

        assert_eq!(
            draws(&out),
            vec![DrawBatch { clip_rect: full(), index_offset: 0, index_count: 6 }]
        );
        assert_eq!(out.culled_index_count, 0);
    }

    #[test]
    fn offsets_point_into_concatenated_buffer() {
        let mut a = list_with(6);
        a.push_elements(6, full());
        let mut b = list_with(9);
        b.push_elements(3, full()).push_elements(6, full());

        let out = build_steps(&DrawData::new(vec![a, b], W as f32, H as f32), fb());
        let offsets: Vec<(u32, u32)> =
            draws(&out).iter().map(|d| (d.index_offset, d.index_count)).collect();
        assert_eq!(offsets, vec![(0, 6), (6, 3), (9, 6)]);
    }

    #[test]
    fn order_is_preserved() {
        let sentinels: Vec<ClipRect> = (0..8)
            .map(|i| {
                let x = (i * 10) as f32;
                ClipRect::new(x, x, x + 5.0, x + 5.0)
            })
            .collect();

        let mut l = list_with(sentinels.len() * 3);
        // Identical rects mixed in must not be merged or moved.
        for r in sentinels.iter().rev() {
            l.push_elements(3, *r);
        }
        let out = build_steps(&DrawData::new(vec![l], W as f32, H as f32), fb());

        let got: Vec<ClipRect> = draws(&out).iter().map(|d| d.clip_rect).collect();
        let want: Vec<ClipRect> = sentinels.iter().rev().copied().collect();
        assert_eq!(got, want);
    }

    #[test]
    fn offscreen_batches_are_culled_but_keep_their_indices() {
        let mut l = list_with(12);
        l.push_elements(3, ClipRect::new(W as f32, 0.0, W as f32 + 10.0, 10.0))
            .push_elements(3, ClipRect::new(0.0, H as f32 + 1.0, 10.0, H as f32 + 20.0))
            .push_elements(3, ClipRect::new(-20.0, -20.0, -1.0, -1.0))
            .push_elements(3, full());

        let out = build_steps(&DrawData::new(vec![l], W as f32, H as f32), fb());

        assert_eq!(
            draws(&out),
            vec![DrawBatch { clip_rect: full(), index_offset: 9, index_count: 3 }]
        );
        assert_eq!(out.culled_index_count, 9);
        assert_eq!(out.drawn_index_count() + out.culled_index_count, 12);
    }

    #[test]
    fn degenerate_and_empty_commands_are_culled() {
        let mut l = list_with(6);
        l.push_elements(3, ClipRect::new(10.0, 10.0, 10.0, 20.0))
            .push_elements(0, full())
            .push_elements(3, full());

        let out = build_steps(&DrawData::new(vec![l], W as f32, H as f32), fb());
        assert_eq!(draws(&out).len(), 1);
        assert_eq!(draws(&out)[0].index_offset, 3);
        assert_eq!(out.culled_index_count, 3);
    }

    #[test]
    fn overlong_command_is_truncated_to_its_list() {
        let mut a = list_with(6);
        a.push_elements(3, full()).push_elements(9, full());
        let mut b = list_with(3);
        b.push_elements(3, full());

        let out = build_steps(&DrawData::new(vec![a, b], W as f32, H as f32), fb());
        let offsets: Vec<(u32, u32)> =
            draws(&out).iter().map(|d| (d.index_offset, d.index_count)).collect();
        assert_eq!(offsets, vec![(0, 3), (3, 3), (6, 3)]);
    }

    #[test]
    fn partial_overlap_keeps_unclamped_rect() {
        let rect = ClipRect::new(-50.0, 500.0, 100.0, 900.0);
        let mut l = list_with(3);
        l.push_elements(3, rect);

        let out = build_steps(&DrawData::new(vec![l], W as f32, H as f32), fb());
        assert_eq!(draws(&out)[0].clip_rect, rect);
    }

    #[test]
    fn clip_rects_use_display_origin_and_scale() {
        let mut l = list_with(3);
        l.push_elements(3, ClipRect::new(110.0, 60.0, 150.0, 80.0));

        let mut data = DrawData::new(vec![l], 400.0, 300.0);
        data.display_pos = Vec2::new(100.0, 50.0);
        data.framebuffer_scale = Vec2::splat(2.0);

        let out = build_steps(&data, data.framebuffer_size());
        assert_eq!(draws(&out)[0].clip_rect, ClipRect::new(20.0, 20.0, 100.0, 60.0));
    }

    #[test]
    fn callbacks_and_resets_stay_in_place() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let calls2 = Arc::clone(&calls);

        let mut a = list_with(6);
        a.push_elements(3, full())
            .push_callback(move |_| calls2.lock().unwrap().push("cb"))
            .push_reset_render_state()
            .push_elements(3, full());
        let mut b = list_with(3);
        b.push_callback(|_| {}).push_elements(3, full());

        let out = build_steps(&DrawData::new(vec![a, b], W as f32, H as f32), fb());

        let shape: Vec<String> = out
            .steps
            .iter()
            .map(|s| match s {
                FrameStep::Draw(d) => format!("draw@{}", d.index_offset),
                FrameStep::Callback { list, .. } => format!("cb{list}"),
                FrameStep::ResetRenderState => "reset".to_owned(),
            })
            .collect();
        assert_eq!(shape, ["draw@0", "cb0", "reset", "draw@3", "cb1", "draw@6"]);

        // Building steps never runs callbacks.
        assert!(calls.lock().unwrap().is_empty());
    }
}
