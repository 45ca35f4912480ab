/// RenderContext - the shared target state every drawable renders into
///
/// Owns the swapchain, the depth buffer, the main render pass and one
/// framebuffer per swapchain image. Handed by reference to every
/// subsystem that creates resources; nothing in the crate reaches for
/// globals.

use std::sync::Arc;

use crate::engine_info;
use crate::error::Result;
use crate::graphics_device::{
    AttachmentDesc, ClearValue, Framebuffer, FramebufferDesc, GraphicsDevice, ImageLayout, LoadOp,
    RenderPass, RenderPassDesc, StoreOp, Swapchain, Texture, TextureDesc, TextureFormat,
    TextureUsage,
};

const LOG_SOURCE: &str = "prism::RenderContext";

/// Configuration for creating a render context
#[derive(Debug, Clone)]
pub struct RenderContextDesc {
    /// Clear color for the main pass (RGBA)
    pub clear_color: [f32; 4],
    /// Depth buffer format
    pub depth_format: TextureFormat,
}

impl Default for RenderContextDesc {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            depth_format: TextureFormat::D32_FLOAT,
        }
    }
}

pub struct RenderContext {
    device: Arc<dyn GraphicsDevice>,
    swapchain: Box<dyn Swapchain>,
    depth_buffer: Arc<dyn Texture>,
    render_pass: Arc<dyn RenderPass>,
    framebuffers: Vec<Arc<dyn Framebuffer>>,
    clear_color: [f32; 4],
    depth_format: TextureFormat,
}

impl RenderContext {
    /// Create the context around an existing swapchain
    ///
    /// Builds the depth buffer, the main render pass and one framebuffer
    /// per swapchain image.
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        swapchain: Box<dyn Swapchain>,
        desc: RenderContextDesc,
    ) -> Result<Self> {
        let (width, height) = (swapchain.width(), swapchain.height());
        let depth_buffer = Self::create_depth_buffer(&device, width, height, desc.depth_format)?;
        let render_pass =
            Self::create_main_render_pass(&device, swapchain.format(), desc.depth_format)?;
        let framebuffers =
            Self::create_framebuffers(&device, &*swapchain, &render_pass, &depth_buffer)?;

        engine_info!(
            LOG_SOURCE,
            "Created {}x{} context with {} swapchain images",
            width,
            height,
            swapchain.image_count()
        );

        Ok(Self {
            device,
            swapchain,
            depth_buffer,
            render_pass,
            framebuffers,
            clear_color: desc.clear_color,
            depth_format: desc.depth_format,
        })
    }

    /// Rebuild the swapchain-dependent resources after a resize
    ///
    /// Waits for the device to go idle first. The image count may change;
    /// callers must re-query `frame_count()` and rebuild their own
    /// per-frame resources afterwards.
    pub fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        self.device.wait_idle()?;
        self.framebuffers.clear();
        self.swapchain.recreate(width, height)?;
        self.depth_buffer =
            Self::create_depth_buffer(&self.device, width, height, self.depth_format)?;
        self.render_pass = Self::create_main_render_pass(
            &self.device,
            self.swapchain.format(),
            self.depth_format,
        )?;
        self.framebuffers = Self::create_framebuffers(
            &self.device,
            &*self.swapchain,
            &self.render_pass,
            &self.depth_buffer,
        )?;

        engine_info!(
            LOG_SOURCE,
            "Recreated at {}x{}, {} swapchain images",
            width,
            height,
            self.swapchain.image_count()
        );
        Ok(())
    }

    // ===== ACCESSORS =====

    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    /// Number of frames in flight; the count every per-frame resource
    /// must be duplicated to
    pub fn frame_count(&self) -> usize {
        self.swapchain.image_count()
    }

    pub fn extent(&self) -> (u32, u32) {
        (self.swapchain.width(), self.swapchain.height())
    }

    pub fn render_pass(&self) -> &Arc<dyn RenderPass> {
        &self.render_pass
    }

    pub fn framebuffer(&self, frame_index: usize) -> &Arc<dyn Framebuffer> {
        &self.framebuffers[frame_index]
    }

    pub fn swapchain_mut(&mut self) -> &mut dyn Swapchain {
        &mut *self.swapchain
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    /// Clear values for the main pass: color, then depth cleared to 1.0
    pub fn clear_values(&self) -> Vec<ClearValue> {
        vec![
            ClearValue::Color(self.clear_color),
            ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
        ]
    }

    // ===== INTERNAL =====

    fn create_depth_buffer(
        device: &Arc<dyn GraphicsDevice>,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<Arc<dyn Texture>> {
        device.create_texture(&TextureDesc {
            width,
            height,
            format,
            usage: TextureUsage::DepthStencil,
            data: None,
        })
    }

    fn create_main_render_pass(
        device: &Arc<dyn GraphicsDevice>,
        color_format: TextureFormat,
        depth_format: TextureFormat,
    ) -> Result<Arc<dyn RenderPass>> {
        device.create_render_pass(&RenderPassDesc {
            color_attachments: vec![AttachmentDesc {
                format: color_format,
                load_op: LoadOp::Clear,
                store_op: StoreOp::Store,
                initial_layout: ImageLayout::Undefined,
                final_layout: ImageLayout::PresentSrc,
            }],
            depth_attachment: Some(AttachmentDesc {
                format: depth_format,
                load_op: LoadOp::Clear,
                store_op: StoreOp::DontCare,
                initial_layout: ImageLayout::Undefined,
                final_layout: ImageLayout::DepthStencilAttachment,
            }),
        })
    }

    fn create_framebuffers(
        device: &Arc<dyn GraphicsDevice>,
        swapchain: &dyn Swapchain,
        render_pass: &Arc<dyn RenderPass>,
        depth_buffer: &Arc<dyn Texture>,
    ) -> Result<Vec<Arc<dyn Framebuffer>>> {
        let (width, height) = (swapchain.width(), swapchain.height());
        let mut framebuffers = Vec::with_capacity(swapchain.image_count());
        for index in 0..swapchain.image_count() {
            framebuffers.push(device.create_framebuffer(&FramebufferDesc {
                render_pass,
                color_attachments: vec![swapchain.image(index)?],
                depth_attachment: Some(Arc::clone(depth_buffer)),
                width,
                height,
            })?);
        }
        Ok(framebuffers)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
