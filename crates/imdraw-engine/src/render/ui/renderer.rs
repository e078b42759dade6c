use crate::coords::FramebufferSize;
use crate::render::{RenderCtx, RenderTarget};
use crate::ui::{DrawData, FontAtlas};

use super::{
    FrameError, FramePlan, FrameStep, InitError, Prepared, SkipReason, TransientBuffers, UiResources,
    BIND_GROUP, UNIFORM_BINDING,
};

/// Default number of projection slots; covers wgpu's usual two frames in flight plus one.
pub const DEFAULT_UNIFORM_RING_DEPTH: usize = 3;

/// UI renderer configuration.
#[derive(Debug, Clone)]
pub struct UiRendererConfig {
    /// Format of the color attachment the UI is drawn into.
    pub color_format: wgpu::TextureFormat,

    /// Number of slots in the projection uniform ring.
    ///
    /// Must be at least the number of frames the application lets the GPU
    /// queue up; slots are reused without waiting for the GPU.
    pub uniform_ring_depth: usize,

    /// MSAA sample count of the color attachment.
    pub sample_count: u32,
}

impl Default for UiRendererConfig {
    fn default() -> Self {
        Self {
            color_format: wgpu::TextureFormat::Bgra8UnormSrgb,
            uniform_ring_depth: DEFAULT_UNIFORM_RING_DEPTH,
            sample_count: 1,
        }
    }
}

impl UiRendererConfig {
    pub fn with_format(color_format: wgpu::TextureFormat) -> Self {
        Self {
            color_format,
            ..Self::default()
        }
    }
}

/// Counters for one recorded UI pass.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub vertex_count: u32,
    pub index_count: u32,
    /// Batches that survived culling.
    pub batches: u32,
    /// `draw_indexed` calls issued. Lower than `batches` when a scissor
    /// clamps to nothing.
    pub draw_calls: u32,
    pub callbacks: u32,
    pub culled_index_count: u32,
}

/// What happened to a frame's UI pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameOutcome {
    /// Nothing to draw; no GPU resources were touched.
    Skipped(SkipReason),
    Drawn(FrameStats),
    /// A per-frame error dropped the UI pass (only from [`UiRenderer::render_or_skip`]).
    Abandoned,
}

/// Renders immediate-mode UI draw data with wgpu.
///
/// Usage:
/// - `UiRenderer::new` once, after the device exists
/// - optionally `upload_font_texture` early; `render` records it on first use otherwise
/// - `render` every frame into the frame's encoder, after the scene pass
pub struct UiRenderer {
    resources: UiResources,
    buffers: TransientBuffers,
    config: UiRendererConfig,
}

impl UiRenderer {
    /// Builds pipeline, font texture, sampler and uniform ring.
    pub fn new(ctx: &RenderCtx<'_>, atlas: &FontAtlas, config: UiRendererConfig) -> Result<Self, InitError> {
        let resources = UiResources::new(ctx, atlas, &config)?;
        Ok(Self {
            resources,
            buffers: TransientBuffers::new(),
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &UiRendererConfig {
        &self.config
    }

    /// Records the font atlas transfer. Idempotent: only the first call records anything.
    pub fn upload_font_texture(&mut self, encoder: &mut wgpu::CommandEncoder) -> bool {
        self.resources.upload_font_texture(encoder)
    }

    /// Number of vertex/index buffer pairs allocated so far.
    #[inline]
    pub fn buffer_generation(&self) -> u64 {
        self.buffers.generation()
    }

    /// Prepares `data` and records the UI pass into `target`.
    ///
    /// The pass loads the existing attachment contents and draws on top. Draw
    /// data larger than `target.size` is cropped to the attachment.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        data: &DrawData,
    ) -> Result<FrameOutcome, FrameError> {
        let mut plan = match FramePlan::prepare(data) {
            Prepared::Skip(reason) => {
                log::trace!("ui pass skipped: {reason:?}");
                return Ok(FrameOutcome::Skipped(reason));
            }
            Prepared::Ready(plan) => plan,
        };
        if !plan.fit_to(target.size) {
            log::trace!("ui pass skipped: empty attachment");
            return Ok(FrameOutcome::Skipped(SkipReason::ZeroFramebuffer));
        }

        self.resources.upload_font_texture(target.encoder);

        // Mutating steps first; encoding below only borrows immutably.
        self.buffers.upload(ctx.device, &plan.geometry)?;
        self.resources.uniform_mut().write(ctx.queue, &plan.projection);

        let stats = self.encode(target, data, &plan);
        log::trace!("ui pass: {stats:?}");
        Ok(FrameOutcome::Drawn(stats))
    }

    /// Like [`render`](Self::render), but a per-frame error only drops this
    /// frame's UI pass; the error is logged and the caller's frame goes on.
    pub fn render_or_skip(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        data: &DrawData,
    ) -> FrameOutcome {
        match self.render(ctx, target, data) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("ui pass abandoned for this frame: {err}");
                FrameOutcome::Abandoned
            }
        }
    }

    fn encode(&self, target: &mut RenderTarget<'_>, data: &DrawData, plan: &FramePlan) -> FrameStats {
        let mut stats = FrameStats {
            vertex_count: plan.geometry.vertex_count() as u32,
            index_count: plan.geometry.index_count() as u32,
            culled_index_count: plan.culled_index_count,
            ..FrameStats::default()
        };

        let Some(uniform) = self
            .resources
            .uniform()
            .bind_descriptor_at_current_offset(BIND_GROUP, UNIFORM_BINDING)
        else {
            return stats;
        };
        let (Some(vertex), Some(index)) = (self.buffers.vertex_slice(), self.buffers.index_slice()) else {
            return stats;
        };

        let framebuffer = plan.framebuffer;

        let state = RenderState {
            pipeline: self.resources.pipeline(),
            bind_group: self.resources.bind_group(),
            uniform_offset: uniform.dynamic_offset(),
            vertex,
            index,
            framebuffer,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("imdraw ui pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        state.apply(&mut rpass);

        for step in &plan.steps {
            match step {
                FrameStep::Draw(batch) => {
                    stats.batches += 1;
                    // Culling used the unclamped rect; wgpu needs it inside the attachment.
                    let Some(s) = batch.clip_rect.to_scissor(framebuffer) else { continue };
                    rpass.set_scissor_rect(s.x, s.y, s.width, s.height);
                    let start = batch.index_offset;
                    rpass.draw_indexed(start..start + batch.index_count, 0, 0..1);
                    stats.draw_calls += 1;
                }
                FrameStep::Callback { list, callback } => {
                    if let Some(list) = data.lists.get(*list) {
                        callback.invoke(list);
                        stats.callbacks += 1;
                    }
                }
                FrameStep::ResetRenderState => state.apply(&mut rpass),
            }
        }

        stats
    }
}

/// Pipeline + bindings + buffers + viewport, applied at pass start and on
/// every `ResetRenderState`.
struct RenderState<'a> {
    pipeline: &'a wgpu::RenderPipeline,
    bind_group: &'a wgpu::BindGroup,
    uniform_offset: u32,
    vertex: wgpu::BufferSlice<'a>,
    index: wgpu::BufferSlice<'a>,
    framebuffer: FramebufferSize,
}

impl RenderState<'_> {
    fn apply(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_pipeline(self.pipeline);
        rpass.set_bind_group(BIND_GROUP, self.bind_group, &[self.uniform_offset]);
        rpass.set_viewport(
            0.0,
            0.0,
            self.framebuffer.width as f32,
            self.framebuffer.height as f32,
            0.0,
            1.0,
        );
        rpass.set_vertex_buffer(0, self.vertex);
        rpass.set_index_buffer(self.index, wgpu::IndexFormat::Uint32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use crate::coords::ClipRect;
    use crate::device::{Gpu, GpuInit, OffscreenTarget};
    use crate::logging::{init_logging, LoggingConfig};
    use crate::ui::{DrawList, DrawVertex};

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// `None` on machines without any adapter; GPU tests return early there.
    fn gpu() -> Option<Gpu> {
        gpu_with(GpuInit::default())
    }

    fn gpu_with(init: GpuInit) -> Option<Gpu> {
        init_logging(LoggingConfig::for_tests());
        match Gpu::new_blocking(init) {
            Ok(gpu) => Some(gpu),
            Err(err) => {
                log::warn!("skipping gpu test: {err:#}");
                None
            }
        }
    }

    /// Device whose buffers may not exceed `max_buffer_size` bytes.
    fn small_buffer_gpu(max_buffer_size: u64) -> Option<Gpu> {
        gpu_with(GpuInit {
            required_limits: wgpu::Limits {
                max_buffer_size,
                ..wgpu::Limits::downlevel_defaults()
            },
            ..GpuInit::default()
        })
    }

    fn white_atlas() -> FontAtlas {
        FontAtlas::new(1, 1, vec![255; 4])
    }

    fn renderer(gpu: &Gpu) -> UiRenderer {
        UiRenderer::new(&gpu.render_ctx(), &white_atlas(), UiRendererConfig::with_format(FORMAT))
            .expect("ui renderer")
    }

    fn quad(clip: ClipRect) -> DrawList {
        quad_at([10.0, 10.0], [60.0, 60.0], clip)
    }

    /// Opaque white quad from `min` to `max` in UI space, drawn with one command.
    fn quad_at(min: [f32; 2], max: [f32; 2], clip: ClipRect) -> DrawList {
        let white = [255, 255, 255, 255];
        let mut l = DrawList::with_geometry(
            vec![
                DrawVertex::new(min, [0.0, 0.0], white),
                DrawVertex::new([max[0], min[1]], [1.0, 0.0], white),
                DrawVertex::new(max, [1.0, 1.0], white),
                DrawVertex::new([min[0], max[1]], [0.0, 1.0], white),
            ],
            vec![0, 1, 2, 0, 2, 3],
        );
        l.push_elements(6, clip);
        l
    }

    fn pixel(pixels: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [pixels[i], pixels[i + 1], pixels[i + 2], pixels[i + 3]]
    }

    fn render_once(gpu: &Gpu, ui: &mut UiRenderer, out: &OffscreenTarget, data: &DrawData) -> FrameOutcome {
        let mut encoder = gpu.create_encoder();
        let outcome = {
            let mut target = out.target(&mut encoder);
            ui.render(&gpu.render_ctx(), &mut target, data).expect("ui frame")
        };
        gpu.submit(encoder);
        outcome
    }

    // ── config ────────────────────────────────────────────────────────────

    #[test]
    fn default_config() {
        let c = UiRendererConfig::default();
        assert_eq!(c.uniform_ring_depth, DEFAULT_UNIFORM_RING_DEPTH);
        assert_eq!(c.sample_count, 1);
        assert_eq!(UiRendererConfig::with_format(FORMAT).color_format, FORMAT);
    }

    // ── init ──────────────────────────────────────────────────────────────

    #[test]
    fn bad_atlas_fails_init() {
        let Some(gpu) = gpu() else { return };
        let atlas = FontAtlas::new(4, 4, vec![0; 3]);
        let err = UiRenderer::new(&gpu.render_ctx(), &atlas, UiRendererConfig::with_format(FORMAT)).err();
        assert!(matches!(err, Some(InitError::InvalidFontAtlas { .. })));
    }

    #[test]
    fn zero_ring_depth_fails_init() {
        let Some(gpu) = gpu() else { return };
        let config = UiRendererConfig {
            uniform_ring_depth: 0,
            ..UiRendererConfig::with_format(FORMAT)
        };
        let err = UiRenderer::new(&gpu.render_ctx(), &white_atlas(), config).err();
        assert!(matches!(err, Some(InitError::InvalidConfig(_))));
    }

    #[test]
    fn font_upload_is_recorded_once() {
        let Some(gpu) = gpu() else { return };
        let mut ui = renderer(&gpu);

        let mut encoder = gpu.create_encoder();
        assert!(ui.upload_font_texture(&mut encoder));
        assert!(!ui.upload_font_texture(&mut encoder));
        gpu.submit(encoder);
        assert!(ui.resources.font_uploaded());
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn single_quad_frame() {
        let Some(gpu) = gpu() else { return };
        let mut ui = renderer(&gpu);
        let out = OffscreenTarget::new(gpu.device(), FramebufferSize::new(800, 600), FORMAT);

        let data = DrawData::new(vec![quad(ClipRect::new(0.0, 0.0, 800.0, 600.0))], 800.0, 600.0);
        let outcome = render_once(&gpu, &mut ui, &out, &data);

        assert_eq!(
            outcome,
            FrameOutcome::Drawn(FrameStats {
                vertex_count: 4,
                index_count: 6,
                batches: 1,
                draw_calls: 1,
                callbacks: 0,
                culled_index_count: 0,
            })
        );
        assert_eq!(ui.buffer_generation(), 1);
        assert!(ui.resources.font_uploaded());
    }

    #[test]
    fn minimized_window_allocates_nothing() {
        let Some(gpu) = gpu() else { return };
        let mut ui = renderer(&gpu);
        let out = OffscreenTarget::new(gpu.device(), FramebufferSize::new(0, 0), FORMAT);

        let data = DrawData::new(vec![quad(ClipRect::new(0.0, 0.0, 10.0, 10.0))], 0.0, 0.0);
        let outcome = render_once(&gpu, &mut ui, &out, &data);

        assert_eq!(outcome, FrameOutcome::Skipped(SkipReason::ZeroFramebuffer));
        assert_eq!(ui.buffer_generation(), 0);
        assert_eq!(ui.resources.uniform().ring().current(), None);
    }

    #[test]
    fn each_frame_gets_fresh_buffers_and_next_uniform_slot() {
        let Some(gpu) = gpu() else { return };
        let mut ui = renderer(&gpu);
        let out = OffscreenTarget::new(gpu.device(), FramebufferSize::new(128, 128), FORMAT);
        let data = DrawData::new(vec![quad(ClipRect::new(0.0, 0.0, 128.0, 128.0))], 128.0, 128.0);

        let depth = ui.config().uniform_ring_depth;
        let mut slots = Vec::new();
        for _ in 0..=depth {
            render_once(&gpu, &mut ui, &out, &data);
            slots.push(ui.resources.uniform().ring().current());
        }

        assert_eq!(ui.buffer_generation(), depth as u64 + 1);
        assert_eq!(slots.first(), Some(&Some(0)));
        assert_eq!(slots.last(), Some(&Some(0)));
    }

    #[test]
    fn callbacks_run_in_order_with_their_list() {
        let Some(gpu) = gpu() else { return };
        let mut ui = renderer(&gpu);
        let out = OffscreenTarget::new(gpu.device(), FramebufferSize::new(64, 64), FORMAT);

        let seen = Arc::new(AtomicU32::new(0));
        let mut list = quad(ClipRect::new(0.0, 0.0, 64.0, 64.0));
        let probe = Arc::clone(&seen);
        list.push_callback(move |l| {
            probe.fetch_add(l.vertices.len() as u32, Ordering::SeqCst);
        })
        .push_reset_render_state()
        .push_elements(0, ClipRect::new(0.0, 0.0, 64.0, 64.0));

        let data = DrawData::new(vec![list], 64.0, 64.0);
        let outcome = render_once(&gpu, &mut ui, &out, &data);

        let FrameOutcome::Drawn(stats) = outcome else {
            panic!("expected a drawn frame, got {outcome:?}");
        };
        assert_eq!(stats.callbacks, 1);
        assert_eq!(stats.batches, 1);
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn culled_batches_are_not_drawn() {
        let Some(gpu) = gpu() else { return };
        let mut ui = renderer(&gpu);
        let out = OffscreenTarget::new(gpu.device(), FramebufferSize::new(100, 100), FORMAT);

        let mut list = quad(ClipRect::new(0.0, 0.0, 50.0, 50.0));
        list.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
        list.push_elements(6, ClipRect::new(200.0, 0.0, 300.0, 50.0));
        let data = DrawData::new(vec![list], 100.0, 100.0);

        let FrameOutcome::Drawn(stats) = render_once(&gpu, &mut ui, &out, &data) else {
            panic!("expected a drawn frame");
        };
        assert_eq!(stats.batches, 1);
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.culled_index_count, 6);
    }

    #[test]
    fn draw_data_larger_than_target_is_cropped() {
        let Some(gpu) = gpu() else { return };
        let mut ui = renderer(&gpu);
        let out = OffscreenTarget::new(gpu.device(), FramebufferSize::new(32, 32), FORMAT);

        let list = quad_at([20.0, 20.0], [30.0, 30.0], ClipRect::new(20.0, 20.0, 30.0, 30.0));
        let data = DrawData::new(vec![list], 64.0, 64.0);
        let FrameOutcome::Drawn(stats) = render_once(&gpu, &mut ui, &out, &data) else {
            panic!("expected a drawn frame");
        };
        assert_eq!(stats.draw_calls, 1);

        let pixels = out.read_pixels(gpu.device(), gpu.queue()).expect("readback");
        assert_eq!(pixel(&pixels, 32, 25, 25), [255, 255, 255, 255]);
        assert_eq!(pixel(&pixels, 32, 10, 10), [0, 0, 0, 0]);
    }

    #[test]
    fn atlas_is_sampled_and_scissor_clips() {
        let Some(gpu) = gpu() else { return };
        let green = FontAtlas::new(1, 1, vec![0, 255, 0, 255]);
        let mut ui = UiRenderer::new(&gpu.render_ctx(), &green, UiRendererConfig::with_format(FORMAT))
            .expect("ui renderer");
        let out = OffscreenTarget::new(gpu.device(), FramebufferSize::new(64, 64), FORMAT);

        // Quad covers the whole target; the clip keeps only the left half.
        let list = quad_at([0.0, 0.0], [64.0, 64.0], ClipRect::new(0.0, 0.0, 32.0, 64.0));
        let data = DrawData::new(vec![list], 64.0, 64.0);
        render_once(&gpu, &mut ui, &out, &data);

        let pixels = out.read_pixels(gpu.device(), gpu.queue()).expect("readback");
        assert_eq!(pixel(&pixels, 64, 8, 32), [0, 255, 0, 255]);
        assert_eq!(pixel(&pixels, 64, 31, 0), [0, 255, 0, 255]);
        assert_eq!(pixel(&pixels, 64, 32, 32), [0, 0, 0, 0]);
        assert_eq!(pixel(&pixels, 64, 63, 63), [0, 0, 0, 0]);
    }

    // ── errors ────────────────────────────────────────────────────────────

    #[test]
    fn oversized_uniform_ring_fails_init() {
        let Some(gpu) = small_buffer_gpu(1024) else { return };
        let config = UiRendererConfig {
            uniform_ring_depth: 64,
            ..UiRendererConfig::with_format(FORMAT)
        };
        let err = UiRenderer::new(&gpu.render_ctx(), &white_atlas(), config).err();
        assert!(matches!(
            err,
            Some(InitError::BufferTooLarge { what: "uniform ring", .. })
        ));
    }

    #[test]
    fn tiny_buffer_limit_fails_init_without_panicking() {
        let Some(gpu) = small_buffer_gpu(64) else { return };
        let err = UiRenderer::new(&gpu.render_ctx(), &white_atlas(), UiRendererConfig::with_format(FORMAT)).err();
        assert!(matches!(err, Some(InitError::BufferTooLarge { .. })));
    }

    #[test]
    fn oversized_frame_is_an_error_and_allocates_nothing() {
        let Some(gpu) = small_buffer_gpu(1024) else { return };
        let mut ui = renderer(&gpu);
        let out = OffscreenTarget::new(gpu.device(), FramebufferSize::new(64, 64), FORMAT);

        // 100 vertices are 2000 bytes, past the 1024 byte limit.
        let mut list = DrawList::with_geometry(vec![DrawVertex::default(); 100], vec![0, 1, 2]);
        list.push_elements(3, ClipRect::new(0.0, 0.0, 64.0, 64.0));
        let data = DrawData::new(vec![list], 64.0, 64.0);

        let mut encoder = gpu.create_encoder();
        let err = {
            let mut target = out.target(&mut encoder);
            ui.render(&gpu.render_ctx(), &mut target, &data).err()
        };
        assert!(matches!(
            err,
            Some(FrameError::BufferTooLarge { what: "vertex", size: 2000, max: 1024 })
        ));

        let outcome = {
            let mut target = out.target(&mut encoder);
            ui.render_or_skip(&gpu.render_ctx(), &mut target, &data)
        };
        gpu.submit(encoder);

        assert_eq!(outcome, FrameOutcome::Abandoned);
        assert_eq!(ui.buffer_generation(), 0);
    }

    #[test]
    fn render_or_skip_reports_skips() {
        let Some(gpu) = gpu() else { return };
        let mut ui = renderer(&gpu);
        let out = OffscreenTarget::new(gpu.device(), FramebufferSize::new(16, 16), FORMAT);

        let mut encoder = gpu.create_encoder();
        let outcome = {
            let mut target = out.target(&mut encoder);
            ui.render_or_skip(&gpu.render_ctx(), &mut target, &DrawData::new(vec![], 16.0, 16.0))
        };
        gpu.submit(encoder);
        assert_eq!(outcome, FrameOutcome::Skipped(SkipReason::NoGeometry));
    }
}
