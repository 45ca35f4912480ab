/// GraphicsDevice trait - the factory seam every backend implements

use std::sync::Arc;
use winit::window::Window;

use crate::error::Result;
use crate::graphics_device::{
    Buffer, BufferDesc, CommandList, DescriptorPool, DescriptorPoolDesc, Framebuffer,
    FramebufferDesc, Pipeline, PipelineDesc, RenderPass, RenderPassDesc, Sampler, SamplerDesc,
    Shader, ShaderDesc, Swapchain, Texture, TextureDesc, TextureFormat,
};

/// The backend device seam
///
/// One object per GPU. All resource creation goes through here; the
/// returned trait objects release their GPU resources on drop. All
/// factory methods take `&self` so the device can be shared behind an
/// `Arc` by every subsystem that creates resources.
///
/// # Example
///
/// ```ignore
/// let buffer = device.create_buffer(&BufferDesc {
///     size: 256,
///     usage: BufferUsage::Uniform,
///     memory: MemoryKind::HostVisible,
/// })?;
/// buffer.update(0, bytemuck::bytes_of(&matrix))?;
/// ```
pub trait GraphicsDevice: Send + Sync {
    /// Create a buffer
    fn create_buffer(&self, desc: &BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a texture, uploading initial pixel data if provided
    fn create_texture(&self, desc: &TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a sampler
    fn create_sampler(&self, desc: &SamplerDesc) -> Result<Arc<dyn Sampler>>;

    /// Create a shader module from backend bytecode
    fn create_shader(&self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>>;

    /// Create a graphics pipeline
    fn create_pipeline(&self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Create a render pass
    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>>;

    /// Create a framebuffer
    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    /// Create a descriptor pool
    fn create_descriptor_pool(&self, desc: &DescriptorPoolDesc) -> Result<Box<dyn DescriptorPool>>;

    /// Create an empty command list, ready for `begin()`
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Create a swapchain for a window
    fn create_swapchain(&self, window: &Window) -> Result<Box<dyn Swapchain>>;

    /// Copy between buffers and block until the copy completes
    ///
    /// Used for staging uploads of vertex and index data. Waits for the
    /// transfer queue to go idle before returning, so the source buffer
    /// may be dropped immediately afterwards.
    fn copy_buffer_blocking(
        &self,
        src: &Arc<dyn Buffer>,
        dst: &Arc<dyn Buffer>,
        size: u64,
    ) -> Result<()>;

    /// Whether the device can sample and upload the given format
    fn is_format_supported(&self, format: TextureFormat) -> bool;

    /// Minimum alignment for dynamic uniform buffer offsets, in bytes
    fn min_uniform_offset_alignment(&self) -> u64;

    /// Block until the device finishes all submitted work
    ///
    /// Required before destroying resources a frame in flight may still
    /// reference (resize, shutdown).
    fn wait_idle(&self) -> Result<()>;
}
