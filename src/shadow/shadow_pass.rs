/// ShadowPass - records the depth-only pass, one command list per frame

use std::sync::Arc;

use crate::engine_bail;
use crate::error::Result;
use crate::graphics_device::{
    AttachmentDesc, ClearValue, CommandList, GraphicsDevice, ImageLayout, LoadOp, RenderPass,
    RenderPassDesc, StoreOp,
};
use crate::registry::Renderables;
use crate::shadow::{ShadowMap, SHADOW_MAP_FORMAT};

const LOG_SOURCE: &str = "prism::ShadowPass";

pub struct ShadowPass {
    render_pass: Arc<dyn RenderPass>,
    lists: Vec<Box<dyn CommandList>>,
}

impl ShadowPass {
    pub fn new(device: &Arc<dyn GraphicsDevice>, frame_count: usize) -> Result<Self> {
        // Layouts stay at depth-attachment across the pass; the explicit
        // barriers in record() move the map in and out of shader-read.
        let render_pass = device.create_render_pass(&RenderPassDesc {
            color_attachments: Vec::new(),
            depth_attachment: Some(AttachmentDesc {
                format: SHADOW_MAP_FORMAT,
                load_op: LoadOp::Clear,
                store_op: StoreOp::Store,
                initial_layout: ImageLayout::DepthStencilAttachment,
                final_layout: ImageLayout::DepthStencilAttachment,
            }),
        })?;
        let lists = Self::create_lists(device, frame_count)?;
        Ok(Self { render_pass, lists })
    }

    pub fn render_pass(&self) -> &Arc<dyn RenderPass> {
        &self.render_pass
    }

    pub fn list(&self, frame_index: usize) -> Option<&dyn CommandList> {
        self.lists.get(frame_index).map(|l| &**l)
    }

    /// Record the depth pass for one frame
    ///
    /// Every shadow-casting renderable draws with its depth-only
    /// pipeline, replaying the same descriptor sets and dynamic offsets
    /// as the main pass.
    pub fn record(
        &mut self,
        frame_index: usize,
        map: &ShadowMap,
        registry: &Renderables,
    ) -> Result<()> {
        let Some(cmd) = self.lists.get_mut(frame_index) else {
            engine_bail!(LOG_SOURCE, "no command list for frame {}", frame_index);
        };
        let cmd = &mut **cmd;

        cmd.begin()?;
        cmd.transition_texture(
            map.texture(),
            ImageLayout::ShaderReadOnly,
            ImageLayout::DepthStencilAttachment,
        )?;
        cmd.begin_render_pass(
            &self.render_pass,
            map.framebuffer(),
            &[ClearValue::DepthStencil { depth: 1.0, stencil: 0 }],
        )?;
        for (_, renderable) in registry.iter() {
            if renderable.casts_shadow() {
                renderable.issue_shadow_commands(cmd, frame_index)?;
            }
        }
        cmd.end_render_pass()?;
        cmd.transition_texture(
            map.texture(),
            ImageLayout::DepthStencilAttachment,
            ImageLayout::ShaderReadOnly,
        )?;
        cmd.end()
    }

    /// Rebuild the per-frame lists for a new frame count
    pub fn recreate(&mut self, device: &Arc<dyn GraphicsDevice>, frame_count: usize) -> Result<()> {
        self.lists = Self::create_lists(device, frame_count)?;
        Ok(())
    }

    fn create_lists(
        device: &Arc<dyn GraphicsDevice>,
        frame_count: usize,
    ) -> Result<Vec<Box<dyn CommandList>>> {
        (0..frame_count).map(|_| device.create_command_list()).collect()
    }
}
