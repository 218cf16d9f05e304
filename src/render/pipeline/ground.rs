//! Textured ground quad pipeline

use crate::core::error::Error;
use crate::render::buffer::{GroundMesh, GroundVertex};
use crate::render::program::{ShaderProgram, StageKind, UniformBuffers, ENTRY_POINT};
use crate::render::texture::{GroundTexture, DEPTH_FORMAT};

/// Draws the ground with its own program, uniforms, mesh and texture
pub struct GroundPipeline {
    pipeline: wgpu::RenderPipeline,
    program: ShaderProgram,
    uniforms: UniformBuffers,
    texture_bind_group: wgpu::BindGroup,
    mesh: GroundMesh,
    // Keeps the sampled texture alive for the bind group
    _texture: GroundTexture,
}

impl GroundPipeline {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        program: ShaderProgram,
        texture: GroundTexture,
    ) -> Result<Self, Error> {
        let vertex_module = program.create_module(device, StageKind::Vertex)
            .ok_or_else(|| Error::Gpu(format!("'{}' has no vertex stage", program.label())))?;
        let fragment_module = program.create_module(device, StageKind::Fragment)
            .ok_or_else(|| Error::Gpu(format!("'{}' has no fragment stage", program.label())))?;

        let uniforms = UniformBuffers::new(device, &program);

        // Group 1: texture + sampler
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ground_texture_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ground_texture_bind_group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(texture.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(texture.sampler()),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("ground_pipeline_layout"),
            bind_group_layouts: &[uniforms.layout(), &texture_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ground_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(ENTRY_POINT),
                buffers: &[GroundVertex::layout()],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(ENTRY_POINT),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            program,
            uniforms,
            texture_bind_group,
            mesh: GroundMesh::new(device, queue),
            _texture: texture,
        })
    }

    pub fn program_mut(&mut self) -> &mut ShaderProgram {
        &mut self.program
    }

    /// Push staged uniforms to the GPU
    pub fn activate(&mut self, queue: &wgpu::Queue) {
        self.program.activate(queue, &self.uniforms);
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, self.uniforms.bind_group(), &[]);
        pass.set_bind_group(1, &self.texture_bind_group, &[]);
        pass.set_vertex_buffer(0, self.mesh.buffer().slice(..));
        pass.draw(0..self.mesh.vertex_count(), 0..1);
    }
}
