use aurum_common::{BlendMode, Rgb};
use aurum_field::Point;
use aurum_render::{
    Frame, FrameSurface, PointMaterial, RenderError, SurfaceHost, SurfaceSize, SurfaceSpec,
};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::shaders;

const MSAA_SAMPLES: u32 = 4;
const QUAD_VERTICES: u32 = 6;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

impl Uniforms {
    fn new(view_proj: Mat4, model: Mat4, material: &PointMaterial, aspect: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            color: material.color.with_alpha(material.opacity),
            params: [material.size, aspect, 0.0, 0.0],
        }
    }
}

fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
    }
}

/// Colors are display-referred, so prefer a non-sRGB format and blend in the
/// same space the values were authored in.
fn choose_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

fn clear_color(color: Rgb, transparent: bool) -> wgpu::Color {
    if transparent {
        return wgpu::Color::TRANSPARENT;
    }
    wgpu::Color {
        r: color.r as f64,
        g: color.g as f64,
        b: color.b as f64,
        a: 1.0,
    }
}

/// A transparent field needs a compositor that honors alpha. Premultiplied is
/// preferred since cleared-to-zero additive output is already premultiplied.
fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    transparent: bool,
) -> wgpu::CompositeAlphaMode {
    use wgpu::CompositeAlphaMode::{Auto, Inherit, PostMultiplied, PreMultiplied};
    if transparent {
        if let Some(mode) = [PreMultiplied, PostMultiplied, Inherit]
            .into_iter()
            .find(|m| modes.contains(m))
        {
            return mode;
        }
        tracing::warn!("surface cannot composite with alpha; drawing opaque");
    }
    modes.first().copied().unwrap_or(Auto)
}

/// Mounts a wgpu surface onto any window-like target.
pub struct WgpuHost<T> {
    target: T,
    backends: wgpu::Backends,
    power_preference: wgpu::PowerPreference,
}

impl<T> WgpuHost<T>
where
    T: Into<wgpu::SurfaceTarget<'static>>,
{
    pub fn new(target: T) -> Self {
        Self {
            target,
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::LowPower,
        }
    }

    pub fn with_backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    pub fn with_power_preference(mut self, preference: wgpu::PowerPreference) -> Self {
        self.power_preference = preference;
        self
    }
}

impl<T> SurfaceHost for WgpuHost<T>
where
    T: Into<wgpu::SurfaceTarget<'static>>,
{
    type Surface = WgpuSurface;

    fn acquire(self, spec: &SurfaceSpec) -> Result<WgpuSurface, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: self.backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(self.target)
            .map_err(|e| RenderError::CapabilityMissing(format!("create surface: {e}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: self.power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| RenderError::CapabilityMissing("no compatible GPU adapter".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("aurum_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::CapabilityMissing(format!("request device: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = choose_format(&surface_caps.formats).ok_or_else(|| {
            RenderError::CapabilityMissing("surface reports no supported formats".into())
        })?;

        let sample_count = if spec.antialias
            && adapter
                .get_texture_format_features(format)
                .flags
                .sample_count_supported(MSAA_SAMPLES)
        {
            MSAA_SAMPLES
        } else {
            1
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: spec.size.width.max(1),
            height: spec.size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: choose_alpha_mode(&surface_caps.alpha_modes, spec.transparent),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            sample_count,
            "GPU surface acquired"
        );

        Ok(WgpuSurface::new(
            surface,
            device,
            queue,
            config,
            sample_count,
            spec,
        ))
    }
}

/// wgpu surface plus every GPU resource the particle field draws with.
pub struct WgpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    instance_count: u32,
    msaa_texture: Option<wgpu::Texture>,
    sample_count: u32,
    material: PointMaterial,
    clear: wgpu::Color,
    released: bool,
}

impl WgpuSurface {
    fn new(
        surface: wgpu::Surface<'static>,
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: wgpu::SurfaceConfiguration,
        sample_count: u32,
        spec: &SurfaceSpec,
    ) -> Self {
        let uniforms = Uniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            &spec.material,
            config.width as f32 / config.height as f32,
        );
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("point_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::POINT_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("point_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Point>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(blend_state(spec.material.blend)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        // Instance buffer (pre-allocated for the whole particle set)
        let instance_capacity = spec.particle_count;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (instance_capacity.max(1) * std::mem::size_of::<Point>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let msaa_texture = Self::create_msaa_texture(&device, &config, sample_count);

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            instance_buffer,
            instance_capacity,
            instance_count: 0,
            msaa_texture,
            sample_count,
            material: spec.material,
            clear: clear_color(spec.clear_color, spec.transparent),
            released: false,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    fn create_msaa_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<wgpu::Texture> {
        if sample_count <= 1 {
            return None;
        }
        Some(device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa_texture"),
            size: wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        }))
    }

    fn upload_positions(&mut self, positions: &[Point]) {
        let count = positions.len().min(self.instance_capacity);
        if count > 0 {
            self.queue.write_buffer(
                &self.instance_buffer,
                0,
                bytemuck::cast_slice(&positions[..count]),
            );
        }
        self.instance_count = count as u32;
    }
}

impl FrameSurface for WgpuSurface {
    fn resize(&mut self, size: SurfaceSize) {
        if self.released {
            return;
        }
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        if let Some(old) = self.msaa_texture.take() {
            old.destroy();
        }
        self.msaa_texture = Self::create_msaa_texture(&self.device, &self.config, self.sample_count);
    }

    fn present(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Frame("surface already released".into()));
        }

        if let Some(positions) = frame.positions {
            self.upload_positions(positions);
        }
        self.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms::new(
                frame.view_proj,
                frame.model,
                &self.material,
                frame.aspect,
            )),
        );

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.surface.configure(&self.device, &self.config);
                return Err(RenderError::Frame(format!("{e}; surface reconfigured")));
            }
            Err(e) => return Err(RenderError::Frame(e.to_string())),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let msaa_view = self
            .msaa_texture
            .as_ref()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()));
        let (target, resolve_target, store) = match &msaa_view {
            Some(msaa) => (msaa, Some(&view), wgpu::StoreOp::Discard),
            None => (&view, None, wgpu::StoreOp::Store),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("particle_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            if self.instance_count > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
                pass.draw(0..QUAD_VERTICES, 0..self.instance_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.instance_buffer.destroy();
        self.uniform_buffer.destroy();
        if let Some(texture) = self.msaa_texture.take() {
            texture.destroy();
        }
        tracing::debug!("GPU buffers released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurum_common::FieldConfig;

    #[test]
    fn uniforms_match_shader_layout() {
        // Two mat4x4 plus two vec4, no padding.
        assert_eq!(std::mem::size_of::<Uniforms>(), 160);
    }

    #[test]
    fn uniforms_carry_material() {
        let material = PointMaterial::from(&FieldConfig::default());
        let u = Uniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, &material, 1.5);
        assert_eq!(u.color[3], 0.6);
        assert_eq!(u.params[0], 0.012);
        assert_eq!(u.params[1], 1.5);
        assert_eq!(u.model, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn additive_blend_sums_colors() {
        let state = blend_state(BlendMode::Additive);
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.operation, wgpu::BlendOperation::Add);
        assert_eq!(blend_state(BlendMode::Alpha), wgpu::BlendState::ALPHA_BLENDING);
    }

    #[test]
    fn format_prefers_linear_encoding() {
        let formats = [
            wgpu::TextureFormat::Bgra8UnormSrgb,
            wgpu::TextureFormat::Bgra8Unorm,
        ];
        assert_eq!(choose_format(&formats), Some(wgpu::TextureFormat::Bgra8Unorm));
        assert_eq!(
            choose_format(&[wgpu::TextureFormat::Rgba8UnormSrgb]),
            Some(wgpu::TextureFormat::Rgba8UnormSrgb)
        );
        assert_eq!(choose_format(&[]), None);
    }

    #[test]
    fn clear_color_is_opaque_by_default() {
        let c = clear_color(Rgb::from_hex(0xFF0000), false);
        assert_eq!((c.r, c.g, c.b, c.a), (1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn transparent_clear_has_zero_alpha() {
        let c = clear_color(Rgb::from_hex(0x0B0B0C), true);
        assert_eq!(c, wgpu::Color::TRANSPARENT);
    }

    #[test]
    fn alpha_mode_follows_transparency() {
        use wgpu::CompositeAlphaMode::{Auto, Opaque, PostMultiplied, PreMultiplied};
        let modes = [Opaque, PostMultiplied, PreMultiplied];
        assert_eq!(choose_alpha_mode(&modes, false), Opaque);
        assert_eq!(choose_alpha_mode(&modes, true), PreMultiplied);
        assert_eq!(choose_alpha_mode(&[Opaque, PostMultiplied], true), PostMultiplied);
        assert_eq!(choose_alpha_mode(&[Opaque], true), Opaque);
        assert_eq!(choose_alpha_mode(&[], false), Auto);
    }
}
