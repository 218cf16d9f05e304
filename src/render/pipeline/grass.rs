//! Grass tessellation pipeline
//!
//! Two compute passes emulate the fixed-function patch stages: the vertex
//! stage assembles patches and the tess-control stage writes one control
//! point per blade. The tess-eval stage then runs as the vertex shader of an
//! instanced draw (one instance per blade).

use crate::core::error::Error;
use crate::grass::blade::Blade;
use crate::grass::tessellation::DrawCall;
use crate::render::buffer::BladeBuffers;
use crate::render::program::{ShaderProgram, StageKind, UniformBuffers, ENTRY_POINT};
use crate::render::texture::DEPTH_FORMAT;

pub struct GrassPipeline {
    patch_pipeline: wgpu::ComputePipeline,
    control_pipeline: wgpu::ComputePipeline,
    render_pipeline: wgpu::RenderPipeline,
    compute_bind_group: wgpu::BindGroup,
    render_bind_group: wgpu::BindGroup,
    program: ShaderProgram,
    uniforms: UniformBuffers,
    buffers: BladeBuffers,
    draw_call: DrawCall,
}

fn storage_entry(binding: u32, visibility: wgpu::ShaderStages, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

impl GrassPipeline {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        program: ShaderProgram,
        blades: &[Blade],
    ) -> Result<Self, Error> {
        if !program.is_tessellated() {
            return Err(Error::Gpu(format!("'{}' is not a tessellated program", program.label())));
        }
        let module = |kind: StageKind| {
            program.create_module(device, kind)
                .ok_or_else(|| Error::Gpu(format!("'{}' has no {kind} stage", program.label())))
        };
        let patch_module = module(StageKind::Vertex)?;
        let control_module = module(StageKind::TessControl)?;
        let eval_module = module(StageKind::TessEval)?;
        let fragment_module = module(StageKind::Fragment)?;

        let uniforms = UniformBuffers::new(device, &program);
        let buffers = BladeBuffers::new(device, queue, blades);

        // Group 1 (compute): blades -> patches -> control points
        let compute_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grass_compute_layout"),
            entries: &[
                storage_entry(0, wgpu::ShaderStages::COMPUTE, true),
                storage_entry(1, wgpu::ShaderStages::COMPUTE, false),
                storage_entry(2, wgpu::ShaderStages::COMPUTE, false),
            ],
        });
        let compute_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass_compute_bind_group"),
            layout: &compute_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: buffers.blades().as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: buffers.patches().as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: buffers.control().as_entire_binding() },
            ],
        });

        // Group 1 (render): control points, read by tess-eval
        let render_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("grass_render_layout"),
            entries: &[storage_entry(2, wgpu::ShaderStages::VERTEX, true)],
        });
        let render_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("grass_render_bind_group"),
            layout: &render_layout,
            entries: &[wgpu::BindGroupEntry { binding: 2, resource: buffers.control().as_entire_binding() }],
        });

        let compute_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grass_compute_pipeline_layout"),
            bind_group_layouts: &[uniforms.layout(), &compute_layout],
            immediate_size: 0,
        });

        let compute_pipeline = |label: &str, module: &wgpu::ShaderModule| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&compute_pipeline_layout),
                module,
                entry_point: Some(ENTRY_POINT),
                compilation_options: Default::default(),
                cache: None,
            })
        };
        let patch_pipeline = compute_pipeline("grass_patch_pipeline", &patch_module);
        let control_pipeline = compute_pipeline("grass_control_pipeline", &control_module);

        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("grass_render_pipeline_layout"),
            bind_group_layouts: &[uniforms.layout(), &render_layout],
            immediate_size: 0,
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("grass_render_pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &eval_module,
                entry_point: Some(ENTRY_POINT),
                buffers: &[],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                // Blades are two-sided
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

        let draw_call = DrawCall::for_blade_count(buffers.blade_count());

        Ok(Self {
            patch_pipeline,
            control_pipeline,
            render_pipeline,
            compute_bind_group,
            render_bind_group,
            program,
            uniforms,
            buffers,
            draw_call,
        })
    }

    pub fn program_mut(&mut self) -> &mut ShaderProgram {
        &mut self.program
    }

    pub fn draw_call(&self) -> DrawCall {
        self.draw_call
    }

    pub fn blade_count(&self) -> u32 {
        self.buffers.blade_count()
    }

    /// Push staged uniforms to the GPU
    pub fn activate(&mut self, queue: &wgpu::Queue) {
        self.program.activate(queue, &self.uniforms);
    }

    /// Encode the patch-vertex and tess-control passes
    pub fn encode_tessellation(&self, encoder: &mut wgpu::CommandEncoder) {
        if self.draw_call.is_empty() {
            return;
        }
        let passes = [
            ("grass_patch_pass", &self.patch_pipeline, self.draw_call.patch_workgroups),
            ("grass_control_pass", &self.control_pipeline, self.draw_call.control_workgroups),
        ];
        for (label, pipeline, workgroups) in passes {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, self.uniforms.bind_group(), &[]);
            pass.set_bind_group(1, &self.compute_bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }
    }

    /// Draw every blade's tessellated surface
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.draw_call.is_empty() {
            return;
        }
        pass.set_pipeline(&self.render_pipeline);
        pass.set_bind_group(0, self.uniforms.bind_group(), &[]);
        pass.set_bind_group(1, &self.render_bind_group, &[]);
        pass.draw(0..self.draw_call.vertex_count, 0..self.draw_call.instance_count);
    }
}
