/// ShadowMap - depth texture and framebuffer of one frame in flight

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{
    Framebuffer, FramebufferDesc, GraphicsDevice, RenderPass, Texture, TextureDesc, TextureFormat,
    TextureUsage,
};

pub const SHADOW_MAP_FORMAT: TextureFormat = TextureFormat::D32_FLOAT;

/// One shadow map: a sampled depth texture with its framebuffer
///
/// The shadow pass renders into it; the main pass samples it through
/// the shadow system's compare sampler. One per frame in flight, so a
/// frame being presented never races the one being recorded.
pub struct ShadowMap {
    texture: Arc<dyn Texture>,
    framebuffer: Arc<dyn Framebuffer>,
    resolution: u32,
}

impl ShadowMap {
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        render_pass: &Arc<dyn RenderPass>,
        resolution: u32,
    ) -> Result<Self> {
        let texture = device.create_texture(&TextureDesc {
            width: resolution,
            height: resolution,
            format: SHADOW_MAP_FORMAT,
            usage: TextureUsage::DepthStencilSampled,
            data: None,
        })?;
        let framebuffer = device.create_framebuffer(&FramebufferDesc {
            render_pass,
            color_attachments: Vec::new(),
            depth_attachment: Some(Arc::clone(&texture)),
            width: resolution,
            height: resolution,
        })?;
        Ok(Self {
            texture,
            framebuffer,
            resolution,
        })
    }

    pub fn texture(&self) -> &Arc<dyn Texture> {
        &self.texture
    }

    pub fn framebuffer(&self) -> &Arc<dyn Framebuffer> {
        &self.framebuffer
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }
}
