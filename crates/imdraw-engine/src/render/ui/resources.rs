use wgpu::util::DeviceExt;

use crate::render::RenderCtx;
use crate::ui::{DrawVertex, FontAtlas};

use super::scope::capture;
use super::uniform::StreamedUniform;
use super::{InitError, UiRendererConfig, UiUniform};

pub const BIND_GROUP: u32 = 0;
pub const UNIFORM_BINDING: u32 = 0;
pub const TEXTURE_BINDING: u32 = 1;
pub const SAMPLER_BINDING: u32 = 2;

// ── pipeline state ────────────────────────────────────────────────────────

/// Straight-alpha "over" compositing.
pub(super) fn over_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── font atlas staging ────────────────────────────────────────────────────

pub(super) fn validate_atlas(atlas: &FontAtlas, max_dimension: u32) -> Result<(), InitError> {
    if atlas.width == 0 || atlas.height == 0 || atlas.pixels.len() != atlas.expected_len() {
        return Err(InitError::InvalidFontAtlas {
            width: atlas.width,
            height: atlas.height,
            len: atlas.pixels.len(),
        });
    }
    if atlas.width > max_dimension || atlas.height > max_dimension {
        return Err(InitError::FontAtlasTooLarge {
            width: atlas.width,
            height: atlas.height,
            max: max_dimension,
        });
    }
    Ok(())
}

/// Row pitch of the staging copy: one atlas row rounded up to the copy alignment.
pub(super) fn padded_pitch(atlas: &FontAtlas) -> u32 {
    wgpu::util::align_to(atlas.row_bytes() as u32, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

/// Copies atlas rows into a buffer whose rows start on
/// `COPY_BYTES_PER_ROW_ALIGNMENT` boundaries. Returns the data and the padded row pitch.
pub(super) fn pad_rows(atlas: &FontAtlas) -> (Vec<u8>, u32) {
    let row = atlas.row_bytes();
    let pitch = padded_pitch(atlas);
    let mut data = vec![0u8; pitch as usize * atlas.height as usize];

    for (dst, src) in data.chunks_exact_mut(pitch as usize).zip(atlas.pixels.chunks_exact(row)) {
        dst[..row].copy_from_slice(src);
    }
    (data, pitch)
}

/// Staging copy of the atlas waiting for its first transfer to the texture.
struct PendingFontUpload {
    staging: wgpu::Buffer,
    bytes_per_row: u32,
    extent: wgpu::Extent3d,
}

// ── resources ─────────────────────────────────────────────────────────────

/// GPU objects created once and shared by every frame: pipeline, bind group,
/// font texture, sampler and the projection uniform ring.
pub struct UiResources {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform: StreamedUniform<UiUniform>,

    font_texture: wgpu::Texture,
    // Views and samplers are referenced by the bind group; kept for the
    // renderer's lifetime alongside it.
    _font_view: wgpu::TextureView,
    _sampler: wgpu::Sampler,
    pending_font_upload: Option<PendingFontUpload>,
}

impl UiResources {
    /// Builds every one-time resource. Any failure aborts construction.
    ///
    /// Device errors raised while building are returned as [`InitError::Device`].
    pub fn new(ctx: &RenderCtx<'_>, atlas: &FontAtlas, config: &UiRendererConfig) -> Result<Self, InitError> {
        if config.sample_count == 0 {
            return Err(InitError::InvalidConfig("sample count must be at least 1".into()));
        }
        let limits = ctx.device.limits();
        validate_atlas(atlas, limits.max_texture_dimension_2d)?;

        let staging_size = u64::from(padded_pitch(atlas)) * u64::from(atlas.height);
        if staging_size > limits.max_buffer_size {
            return Err(InitError::BufferTooLarge {
                what: "font staging",
                size: staging_size,
                max: limits.max_buffer_size,
            });
        }

        capture(ctx.device, || Self::build(ctx, atlas, config))
            .map_err(|err| InitError::Device(err.to_string()))?
    }

    fn build(ctx: &RenderCtx<'_>, atlas: &FontAtlas, config: &UiRendererConfig) -> Result<Self, InitError> {
        let uniform = StreamedUniform::<UiUniform>::new(
            ctx.device,
            config.uniform_ring_depth,
            "imdraw ui projection ring",
        )?;
        let uniform_size = StreamedUniform::<UiUniform>::binding_size()
            .ok_or_else(|| InitError::InvalidConfig("uniform type has zero size".into()))?;

        let bind_group_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("imdraw ui bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: UNIFORM_BINDING,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: Some(uniform_size),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: TEXTURE_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline = create_pipeline(ctx.device, &bind_group_layout, config);

        // ── font texture ──────────────────────────────────────────────────
        let extent = wgpu::Extent3d {
            width: atlas.width,
            height: atlas.height,
            depth_or_array_layers: 1,
        };
        let font_texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("imdraw ui font atlas"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let font_view = font_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let (padded, bytes_per_row) = pad_rows(atlas);
        let staging = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("imdraw ui font staging"),
            contents: &padded,
            usage: wgpu::BufferUsages::COPY_SRC,
        });

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("imdraw ui font sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("imdraw ui bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: UNIFORM_BINDING,
                    resource: uniform.binding_resource(),
                },
                wgpu::BindGroupEntry {
                    binding: TEXTURE_BINDING,
                    resource: wgpu::BindingResource::TextureView(&font_view),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        log::debug!(
            "ui resources ready: atlas {}x{}, uniform ring depth {}, format {:?}",
            atlas.width,
            atlas.height,
            config.uniform_ring_depth,
            config.color_format
        );

        Ok(Self {
            pipeline,
            bind_group,
            uniform,
            font_texture,
            _font_view: font_view,
            _sampler: sampler,
            pending_font_upload: Some(PendingFontUpload {
                staging,
                bytes_per_row,
                extent,
            }),
        })
    }

    /// Records the staging → texture copy the first time it is called.
    ///
    /// The staging buffer is released right after recording (wgpu keeps it
    /// alive until the copy has executed). Returns `false` once the atlas is
    /// already uploaded.
    pub fn upload_font_texture(&mut self, encoder: &mut wgpu::CommandEncoder) -> bool {
        let Some(pending) = self.pending_font_upload.take() else {
            return false;
        };

        encoder.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer: &pending.staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(pending.bytes_per_row),
                    rows_per_image: Some(pending.extent.height),
                },
            },
            wgpu::TexelCopyTextureInfo {
                texture: &self.font_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pending.extent,
        );

        log::debug!(
            "ui font atlas upload recorded ({}x{})",
            pending.extent.width,
            pending.extent.height
        );
        true
    }

    #[inline]
    pub fn font_uploaded(&self) -> bool {
        self.pending_font_upload.is_none()
    }

    #[inline]
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    #[inline]
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    #[inline]
    pub fn uniform(&self) -> &StreamedUniform<UiUniform> {
        &self.uniform
    }

    #[inline]
    pub fn uniform_mut(&mut self) -> &mut StreamedUniform<UiUniform> {
        &mut self.uniform
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    config: &UiRendererConfig,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("imdraw ui shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/ui.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("imdraw ui pipeline layout"),
        bind_group_layouts: &[bind_group_layout],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("imdraw ui pipeline"),
        layout: Some(&pipeline_layout),

        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[DrawVertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: config.color_format,
                blend: Some(over_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        // UI draws in painter's order; no depth or stencil.
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: config.sample_count,
            ..Default::default()
        },

        multiview_mask: None,
        cache: None,
    })
}
