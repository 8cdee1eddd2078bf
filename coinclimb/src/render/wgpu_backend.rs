use std::{collections::HashMap, fs, path::Path};

use anyhow::{anyhow, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use wgpu::{
    vertex_attr_array, AddressMode, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, Buffer,
    BufferBindingType, BufferUsages, ColorTargetState, ColorWrites, CommandEncoder,
    CommandEncoderDescriptor, CompositeAlphaMode, DeviceDescriptor, Extent3d, FilterMode,
    FragmentState, Instance, LoadOp, MultisampleState, Operations, Origin3d,
    PipelineLayoutDescriptor, PresentMode, PrimitiveState, RenderPassColorAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions,
    SamplerBindingType, SamplerDescriptor, ShaderModuleDescriptor, ShaderSource,
    SurfaceConfiguration, TexelCopyBufferLayout, TexelCopyTextureInfo, Texture, TextureAspect,
    TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType, TextureUsages,
    TextureView, TextureViewDescriptor, TextureViewDimension, VertexState,
};
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    math::{Camera2D, Rect, Vec2},
    render::sprite::{Sprite, TextureHandle},
    render::text::{FontHandle, GlyphCacheEntry, TextRenderer},
};

/// Queued sprite draw; the bind group is looked up when the frame is flushed.
struct SpriteDrawCommand {
    uniform_offset: u64,
    texture_handle: TextureHandle,
}

/// Wrapper around wgpu surface/device setup and simple frame management.
pub struct Renderer<'window> {
    backend: WgpuBackend<'window>,
}

impl<'window> Renderer<'window> {
    pub fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let backend = WgpuBackend::new(window, vsync)?;
        Ok(Self { backend })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.backend.resize(new_size);
    }

    pub fn begin_frame(&mut self) -> Result<Frame> {
        self.backend.begin_frame()
    }

    /// Clear the frame to `color` (sRGB, 0.0..=1.0) before any sprite is drawn.
    pub fn clear(&mut self, frame: &mut Frame, color: [f32; 4]) {
        frame.clear_color = color;
    }

    pub fn draw_sprite(
        &mut self,
        frame: &mut Frame,
        sprite: &Sprite,
        camera: &Camera2D,
    ) -> Result<()> {
        self.backend.draw_sprite(frame, sprite, camera)
    }

    pub fn end_frame(&mut self, frame: Frame) -> Result<()> {
        self.backend.end_frame(frame)
    }

    pub fn load_texture_from_file(&mut self, path: impl AsRef<Path>) -> Result<TextureHandle> {
        self.backend.load_texture_from_file(path.as_ref())
    }

    pub fn load_texture_from_bytes(&mut self, bytes: &[u8]) -> Result<TextureHandle> {
        self.backend.load_texture_from_bytes(bytes)
    }

    /// Load a texture from raw RGBA8 data (no PNG decoding).
    ///
    /// `data` must be `width * height * 4` bytes in RGBA8 format.
    pub fn load_texture_from_rgba(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle> {
        self.backend
            .load_texture_from_rgba(data, width, height, false)
    }

    pub fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.backend.texture_size(handle)
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.backend.surface_size()
    }

    /// Load a font from bytes (TTF/OTF format).
    pub fn load_font_from_bytes(&mut self, bytes: &[u8]) -> Result<FontHandle> {
        self.backend.text_renderer.load_font_from_bytes(bytes)
    }

    /// Draw a single line of text.
    ///
    /// `position` is the left end of the baseline in the camera's world
    /// coordinates. Glyphs are rasterized and cached on first use.
    pub fn draw_text(
        &mut self,
        frame: &mut Frame,
        text: &str,
        font: FontHandle,
        size: f32,
        position: Vec2,
        color: [f32; 4],
        camera: &Camera2D,
    ) -> Result<()> {
        self.backend
            .draw_text(frame, text, font, size, position, color, camera)
    }
}

pub struct Frame {
    surface_texture: Option<wgpu::SurfaceTexture>,
    view: TextureView,
    encoder: Option<CommandEncoder>,
    sprite_draws: Vec<SpriteDrawCommand>,
    clear_color: [f32; 4],
}

impl Drop for Frame {
    fn drop(&mut self) {
        // A frame dropped without end_frame still has to give its surface texture back.
        if let Some(surface_texture) = self.surface_texture.take() {
            surface_texture.present();
        }
    }
}

struct TextureEntry {
    /// Must outlive `bind_group`.
    #[allow(dead_code)]
    texture: Texture,
    /// Built once at upload. The uniform slot is picked per draw by dynamic offset.
    bind_group: wgpu::BindGroup,
    size: (u32, u32),
}

struct SpritePipeline {
    pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    uniform_buffer: Buffer,
    bind_group_layout: BindGroupLayout,
    uniform_alignment: u64,
}

const MAX_SPRITES_PER_FRAME: u64 = 8192;

struct WgpuBackend<'window> {
    surface: wgpu::Surface<'window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: SurfaceConfiguration,
    present_mode: PresentMode,
    sprite_pipeline: SpritePipeline,
    textures: HashMap<TextureHandle, TextureEntry>,
    next_texture_id: u32,
    uniform_write_offset: u64,
    text_renderer: TextRenderer,
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SpriteVertex {
    position: [f32; 2],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct SpriteUniforms {
    mvp: [[f32; 4]; 4],
    color: [f32; 4],
    uv_offset: [f32; 2],
    uv_scale: [f32; 2],
}

// World space is y-up while texture rows run top to bottom, so the top edge
// of the quad samples v = 0.
const SPRITE_VERTICES: [SpriteVertex; 6] = [
    SpriteVertex {
        position: [-0.5, -0.5],
        uv: [0.0, 1.0],
    },
    SpriteVertex {
        position: [0.5, -0.5],
        uv: [1.0, 1.0],
    },
    SpriteVertex {
        position: [0.5, 0.5],
        uv: [1.0, 0.0],
    },
    SpriteVertex {
        position: [-0.5, -0.5],
        uv: [0.0, 1.0],
    },
    SpriteVertex {
        position: [0.5, 0.5],
        uv: [1.0, 0.0],
    },
    SpriteVertex {
        position: [-0.5, 0.5],
        uv: [0.0, 0.0],
    },
];

impl<'window> WgpuBackend<'window> {
    fn new(window: &'window Window, vsync: bool) -> Result<Self> {
        let instance = Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&DeviceDescriptor {
            label: Some("coinclimb-device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            experimental_features: Default::default(),
            memory_hints: Default::default(),
            trace: wgpu::Trace::Off,
        }))?;

        let size = window.inner_size();
        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;

        let present_mode = choose_present_mode(&capabilities.present_modes, vsync);
        let alpha_mode = choose_alpha_mode(&capabilities.alpha_modes);

        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let sprite_pipeline = create_sprite_pipeline(&device, format);
        log::info!(
            "Renderer ready: {}x{} {:?} {:?}",
            surface_config.width,
            surface_config.height,
            format,
            present_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            surface_config,
            present_mode,
            sprite_pipeline,
            textures: HashMap::new(),
            next_texture_id: 1,
            uniform_write_offset: 0,
            text_renderer: TextRenderer::new(),
        })
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.surface_config.width = new_size.width;
        self.surface_config.height = new_size.height;
        self.surface_config.present_mode = self.present_mode;
        self.surface.configure(&self.device, &self.surface_config);
    }

    fn begin_frame(&mut self) -> Result<Frame> {
        self.uniform_write_offset = 0;

        loop {
            match self.surface.get_current_texture() {
                Ok(surface_texture) => {
                    let view = surface_texture
                        .texture
                        .create_view(&TextureViewDescriptor::default());
                    let encoder = self
                        .device
                        .create_command_encoder(&CommandEncoderDescriptor {
                            label: Some("frame-encoder"),
                        });

                    return Ok(Frame {
                        surface_texture: Some(surface_texture),
                        view,
                        encoder: Some(encoder),
                        sprite_draws: Vec::new(),
                        clear_color: [0.0, 0.0, 0.0, 1.0],
                    });
                }
                Err(e) => match e {
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                        self.surface.configure(&self.device, &self.surface_config);
                        continue;
                    }
                    wgpu::SurfaceError::Timeout => {
                        continue;
                    }
                    wgpu::SurfaceError::OutOfMemory => {
                        return Err(anyhow!("Surface ran out of memory"));
                    }
                    wgpu::SurfaceError::Other => {
                        return Err(anyhow!("Surface error: Other"));
                    }
                },
            }
        }
    }

    /// Visible world rectangle for `camera` on the current surface.
    fn view_rect(&self, camera: &Camera2D) -> Rect {
        let zoom = if camera.zoom > 0.0 { camera.zoom } else { 1.0 };
        let extent = Vec2::new(
            self.surface_config.width as f32 / zoom,
            self.surface_config.height as f32 / zoom,
        );
        Rect::new(camera.position + extent / 2.0, extent / 2.0)
    }

    fn draw_sprite(&mut self, frame: &mut Frame, sprite: &Sprite, camera: &Camera2D) -> Result<()> {
        let texture = self
            .textures
            .get(&sprite.texture)
            .ok_or_else(|| anyhow!("Unknown texture handle"))?;

        let base_size = sprite.base_size(texture.size);
        let transform = &sprite.transform;

        let mut half = Vec2::new(
            (base_size.x * transform.scale.x).abs() * 0.5,
            (base_size.y * transform.scale.y).abs() * 0.5,
        );
        if transform.rotation != 0.0 {
            let r = half.length();
            half = Vec2::new(r, r);
        }
        if !Rect::new(transform.position, half).overlaps(&self.view_rect(camera)) {
            return Ok(());
        }

        let uniform_capacity = MAX_SPRITES_PER_FRAME * self.sprite_pipeline.uniform_alignment;
        if self.uniform_write_offset >= uniform_capacity {
            return Err(anyhow!(
                "Too many sprites drawn in one frame (max: {})",
                MAX_SPRITES_PER_FRAME
            ));
        }

        let model = transform.to_matrix(base_size);
        let vp = camera.view_projection(self.surface_config.width, self.surface_config.height);
        let mvp = vp * model;
        let (uv_offset, uv_scale) = sprite.uv_params();

        let uniforms = SpriteUniforms {
            mvp: mvp.to_cols_array_2d(),
            color: sprite.tint,
            uv_offset,
            uv_scale,
        };

        let aligned_offset = if self.uniform_write_offset == 0 {
            0
        } else {
            (self.uniform_write_offset + self.sprite_pipeline.uniform_alignment - 1)
                & !(self.sprite_pipeline.uniform_alignment - 1)
        };

        self.queue.write_buffer(
            &self.sprite_pipeline.uniform_buffer,
            aligned_offset,
            bytemuck::bytes_of(&uniforms),
        );

        frame.sprite_draws.push(SpriteDrawCommand {
            uniform_offset: aligned_offset,
            texture_handle: sprite.texture,
        });

        self.uniform_write_offset = aligned_offset + self.sprite_pipeline.uniform_alignment;

        Ok(())
    }

    fn glyph(&mut self, font: FontHandle, ch: char, size: f32) -> Result<GlyphCacheEntry> {
        if let Some(entry) = self.text_renderer.cached(font, ch, size) {
            return Ok(entry);
        }

        let glyph = self.text_renderer.rasterize(font, ch, size)?;
        let texture = if glyph.width > 0 && glyph.height > 0 {
            Some(self.load_texture_from_rgba(&glyph.rgba, glyph.width, glyph.height, true)?)
        } else {
            None
        };
        let entry = GlyphCacheEntry {
            texture,
            metrics: glyph.metrics,
        };
        self.text_renderer.cache_glyph(font, ch, size, entry);
        Ok(entry)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        frame: &mut Frame,
        text: &str,
        font: FontHandle,
        size: f32,
        position: Vec2,
        color: [f32; 4],
        camera: &Camera2D,
    ) -> Result<()> {
        let mut pen = position;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            if let Some(p) = prev {
                pen.x += self.text_renderer.kern(font, p, ch, size);
            }
            let entry = self.glyph(font, ch, size)?;
            if let Some(texture) = entry.texture {
                let (center, quad_size) = entry.metrics.quad(pen);
                let mut sprite = Sprite::new(texture);
                sprite.transform.position = center;
                sprite.size = Some(quad_size);
                sprite.tint = color;
                self.draw_sprite(frame, &sprite, camera)?;
            }
            pen.x += entry.metrics.advance;
            prev = Some(ch);
        }

        Ok(())
    }

    fn end_frame(&mut self, mut frame: Frame) -> Result<()> {
        let mut encoder = frame
            .encoder
            .take()
            .ok_or_else(|| anyhow!("Frame already ended"))?;

        let [r, g, b, a] = frame.clear_color;
        let clear = if self.surface_config.format.is_srgb() {
            [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), a]
        } else {
            frame.clear_color
        };

        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("sprite-pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: clear[0] as f64,
                            g: clear[1] as f64,
                            b: clear[2] as f64,
                            a: clear[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                multiview_mask: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            pass.set_pipeline(&self.sprite_pipeline.pipeline);
            pass.set_vertex_buffer(0, self.sprite_pipeline.vertex_buffer.slice(..));

            for draw_cmd in &frame.sprite_draws {
                let texture = self
                    .textures
                    .get(&draw_cmd.texture_handle)
                    .ok_or_else(|| anyhow!("Unknown texture handle"))?;
                pass.set_bind_group(0, &texture.bind_group, &[draw_cmd.uniform_offset as u32]);
                pass.draw(0..SPRITE_VERTICES.len() as u32, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));

        let surface_texture = frame
            .surface_texture
            .take()
            .ok_or_else(|| anyhow!("Frame already ended"))?;
        surface_texture.present();
        Ok(())
    }

    fn load_texture_from_file(&mut self, path: &Path) -> Result<TextureHandle> {
        let data = fs::read(path)
            .map_err(|e| anyhow!("Failed to read texture {}: {}", path.display(), e))?;
        self.load_texture_from_bytes(&data)
    }

    fn load_texture_from_bytes(&mut self, bytes: &[u8]) -> Result<TextureHandle> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let dimensions = image.dimensions();
        self.load_texture_from_rgba(&image, dimensions.0, dimensions.1, false)
    }

    /// Upload RGBA8 pixels. Glyph textures sample with `Nearest` to stay crisp.
    fn load_texture_from_rgba(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        is_font_texture: bool,
    ) -> Result<TextureHandle> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(anyhow!(
                "RGBA data is {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            ));
        }

        let size = Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = self.device.create_texture(&TextureDescriptor {
            label: Some("texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            data,
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&TextureViewDescriptor::default());

        let (mag_filter, min_filter) = if is_font_texture {
            (FilterMode::Nearest, FilterMode::Nearest)
        } else {
            (FilterMode::Linear, FilterMode::Linear)
        };

        let sampler = self.device.create_sampler(&SamplerDescriptor {
            label: Some(if is_font_texture {
                "font-sampler"
            } else {
                "sprite-sampler"
            }),
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter,
            min_filter,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("sprite-bind-group"),
            layout: &self.sprite_pipeline.bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &self.sprite_pipeline.uniform_buffer,
                        offset: 0,
                        size: uniform_binding_size(),
                    }),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::TextureView(&view),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        let handle = TextureHandle(self.next_texture_id);
        self.next_texture_id += 1;
        self.textures.insert(
            handle,
            TextureEntry {
                texture,
                bind_group,
                size: (width, height),
            },
        );

        Ok(handle)
    }

    fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&handle).map(|t| t.size)
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}

/// Each draw sees exactly one `SpriteUniforms` window of the uniform buffer.
fn uniform_binding_size() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<SpriteUniforms>() as u64)
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn create_sprite_pipeline(device: &wgpu::Device, surface_format: TextureFormat) -> SpritePipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("sprite-shader"),
        source: ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("sprite-bind-group-layout"),
        entries: &[
            BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: BindingType::Buffer {
                    ty: BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: uniform_binding_size(),
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: BindingType::Texture {
                    sample_type: TextureSampleType::Float { filterable: true },
                    view_dimension: TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("sprite-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        immediate_size: 0,
    });

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("sprite-vertices"),
        contents: bytemuck::cast_slice(&SPRITE_VERTICES),
        usage: BufferUsages::VERTEX,
    });

    // Usually 256 bytes; every sprite gets its own aligned uniform slot.
    let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment as u64;

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("sprite-uniform-buffer"),
        size: MAX_SPRITES_PER_FRAME * uniform_alignment,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("sprite-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &vertex_attr_array![0 => Float32x2, 1 => Float32x2],
            }],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: PrimitiveState::default(),
        depth_stencil: None,
        multisample: MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    SpritePipeline {
        pipeline,
        vertex_buffer,
        uniform_buffer,
        bind_group_layout,
        uniform_alignment,
    }
}

fn choose_present_mode(modes: &[PresentMode], vsync: bool) -> PresentMode {
    if vsync {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Fifo | PresentMode::FifoRelaxed))
            .unwrap_or(PresentMode::Fifo)
    } else {
        modes
            .iter()
            .copied()
            .find(|mode| matches!(mode, PresentMode::Immediate | PresentMode::Mailbox))
            .unwrap_or(PresentMode::Fifo)
    }
}

fn choose_alpha_mode(modes: &[CompositeAlphaMode]) -> CompositeAlphaMode {
    modes
        .iter()
        .copied()
        .find(|mode| matches!(mode, CompositeAlphaMode::Auto))
        .unwrap_or_else(|| modes.first().copied().unwrap_or(CompositeAlphaMode::Opaque))
}
