/// CommandList trait - for recording rendering commands

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    Buffer, DescriptorSet, Framebuffer, ImageLayout, IndexType, Pipeline, RenderPass, Texture,
};

/// Clear value for a render pass attachment
#[derive(Debug, Clone, Copy)]
pub enum ClearValue {
    /// Color attachment clear (RGBA)
    Color([f32; 4]),
    /// Depth/stencil attachment clear
    DepthStencil { depth: f32, stencil: u32 },
}

/// Command list for recording rendering commands
///
/// Commands are recorded and later submitted to the GPU by the
/// submission/synchronization collaborator. Recording is strictly
/// sequential on the driving CPU thread.
pub trait CommandList: Send + Sync {
    /// Begin recording commands
    ///
    /// Also resets any previously recorded content, so a list may be
    /// re-recorded every frame.
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Begin a render pass
    ///
    /// # Arguments
    ///
    /// * `render_pass` - The render pass to begin
    /// * `framebuffer` - The framebuffer containing the attachments
    /// * `clear_values` - Clear values, one per attachment
    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn RenderPass>,
        framebuffer: &Arc<dyn Framebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Bind a graphics pipeline
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    /// Bind a descriptor set
    ///
    /// # Arguments
    ///
    /// * `pipeline` - Pipeline owning the layout the set was created against
    /// * `set` - The descriptor set to bind
    /// * `dynamic_offsets` - One offset per dynamic uniform binding in the
    ///   set, in binding order (empty if none)
    fn bind_descriptor_set(
        &mut self,
        pipeline: &Arc<dyn Pipeline>,
        set: &Arc<dyn DescriptorSet>,
        dynamic_offsets: &[u32],
    ) -> Result<()>;

    /// Bind a vertex buffer
    ///
    /// # Arguments
    ///
    /// * `buffer` - Buffer to bind
    /// * `offset` - Offset into the buffer in bytes
    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()>;

    /// Bind an index buffer
    ///
    /// # Arguments
    ///
    /// * `buffer` - Buffer to bind
    /// * `offset` - Offset into the buffer in bytes
    /// * `index_type` - Type of indices (U16 or U32)
    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()>;

    /// Draw vertices
    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) -> Result<()>;

    /// Draw indexed vertices
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> Result<()>;

    /// Transition a texture between image layouts (pipeline barrier)
    ///
    /// Used by the shadow pass to move the depth image between
    /// shader-read and depth-attachment layouts. Must be called outside
    /// a render pass.
    fn transition_texture(
        &mut self,
        texture: &Arc<dyn Texture>,
        from: ImageLayout,
        to: ImageLayout,
    ) -> Result<()>;
}
