//! Frame orchestration: ground and grass into one render pass

use std::sync::Arc;

use glam::Mat4;
use winit::window::Window;

use crate::core::camera::Camera;
use crate::core::config::{AppConfig, ClearColor};
use crate::core::error::Error;
use crate::core::types::{Result, Vec3};
use crate::grass::GrassSystem;
use crate::render::context::GpuContext;
use crate::render::pipeline::{load_grass_program, load_ground_program, GrassPipeline, GroundPipeline};
use crate::render::program::ShaderProgram;
use crate::render::texture::{load_ground_image, DepthTexture, GroundTexture};

/// Outcome of one [`SceneRenderer::render`] call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Presented,
    /// Zero-sized framebuffer or a lost surface; nothing was drawn
    Skipped,
}

pub struct SceneRenderer {
    ctx: GpuContext,
    depth: DepthTexture,
    ground: GroundPipeline,
    grass: GrassPipeline,
    model: Mat4,
    clear_color: ClearColor,
    width: u32,
    height: u32,
}

impl SceneRenderer {
    /// Create the GPU context, link both programs and upload scene data
    pub fn new(window: Arc<Window>, config: &AppConfig) -> Result<Self> {
        let size = window.inner_size();
        let ctx = pollster::block_on(GpuContext::new(window, config.window.vsync))?;
        let (surface_w, surface_h) = ctx.size();

        let mut ground_program = load_ground_program(&config.shader_dir)?;
        let mut grass_program = load_grass_program(&config.shader_dir)?;
        log::info!(
            "Linked programs: {} ({} blocks), {} ({} blocks)",
            ground_program.label(),
            ground_program.blocks().len(),
            grass_program.label(),
            grass_program.blocks().len()
        );

        let grass = GrassSystem::new(config.grass.clone())?;
        grass.apply_uniforms(&mut grass_program);

        let ground_cfg = &config.ground;
        ground_program.set_vec3("tint", Vec3::from_array(ground_cfg.tint));
        ground_program.set_float("uv_scale", ground_cfg.uv_scale);

        let image = load_ground_image(ground_cfg.texture.as_deref());
        let texture = GroundTexture::new(&ctx.device, &ctx.queue, &image);

        let ground = GroundPipeline::new(&ctx.device, &ctx.queue, ctx.format(), ground_program, texture)?;
        let grass_pipeline =
            GrassPipeline::new(&ctx.device, &ctx.queue, ctx.format(), grass_program, grass.blades())?;
        let depth = DepthTexture::new(&ctx.device, surface_w, surface_h);

        Ok(Self {
            ctx,
            depth,
            ground,
            grass: grass_pipeline,
            model: Mat4::from_scale(Vec3::splat(ground_cfg.scale)),
            clear_color: config.clear_color,
            width: size.width,
            height: size.height,
        })
    }

    /// Follow a framebuffer resize; zero sizes pause rendering
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        if width == 0 || height == 0 {
            return;
        }
        self.ctx.resize(width, height);
        self.depth = DepthTexture::new(&self.ctx.device, width, height);
        log::debug!("Resized to {width}x{height}");
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn blade_count(&self) -> u32 {
        self.grass.blade_count()
    }

    /// Draw one frame from the camera's current state
    pub fn render(&mut self, camera: &Camera) -> Result<FrameStatus> {
        if self.width == 0 || self.height == 0 {
            return Ok(FrameStatus::Skipped);
        }

        let view = camera.view_matrix();
        let proj = camera.projection_matrix(self.ctx.aspect());
        let (width, height) = self.ctx.size();
        set_transforms(self.ground.program_mut(), &self.model, &view, &proj);
        set_transforms(self.grass.program_mut(), &self.model, &view, &proj);
        GrassSystem::set_viewport(self.grass.program_mut(), width, height);
        self.ground.activate(&self.ctx.queue);
        self.grass.activate(&self.ctx.queue);

        let frame = match self.ctx.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.ctx.reconfigure();
                return Ok(FrameStatus::Skipped);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface acquire timed out, skipping frame");
                return Ok(FrameStatus::Skipped);
            }
            Err(e) => return Err(Error::Gpu(e.to_string())),
        };
        let target = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.ctx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        self.grass.encode_tessellation(&mut encoder);

        {
            let [r, g, b, a] = self.clear_color.0;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.depth.view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.ground.draw(&mut pass);
            self.grass.draw(&mut pass);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(FrameStatus::Presented)
    }
}

fn set_transforms(program: &mut ShaderProgram, model: &Mat4, view: &Mat4, proj: &Mat4) {
    program.set_mat4("model", model);
    program.set_mat4("view", view);
    program.set_mat4("proj", proj);
}
