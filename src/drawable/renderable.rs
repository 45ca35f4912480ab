/// Renderable - a registered drawable, compiled to GPU state
///
/// Owns everything one drawable needs to be drawn: its shaders (shared
/// through the cache), its AddOns, its pipeline, its per-frame
/// descriptor sets and, optionally, a slot in the shared dynamic
/// uniform arena plus a depth-only pipeline for the shadow pass.

use std::sync::Arc;

use crate::clock::FrameClock;
use crate::context::RenderContext;
use crate::drawable::{
    AddOns, Customizer, Descriptors, DrawableKind, DrawableSpec, DynamicUniformBuffer, MeshData,
    ShaderCache, UniformBlock, UpdateFn, UpdateTarget,
};
use crate::engine_bail;
use crate::error::{Error, Result};
use crate::graphics_device::{
    Buffer, CommandList, DepthStencilState, GraphicsDevice, Pipeline, PipelineDesc,
    PrimitiveTopology, RenderPass, Shader, ShaderStage,
};

const LOG_SOURCE: &str = "prism::Renderable";

/// When a drawable's commands are (re-)recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingCadence {
    /// Recorded once after allocation, then replayed
    AtInitOnly,
    /// Re-recorded every frame
    UponEachFrame,
    /// Re-recorded only after an explicit change flag
    OnChangeFlagged,
}

/// A drawable's slot in the shared dynamic uniform arena
struct DynamicBinding {
    arena: Arc<DynamicUniformBuffer>,
    slot: u32,
    /// Current CPU-side element value, uploaded per frame
    data: Vec<u8>,
}

impl Drop for DynamicBinding {
    fn drop(&mut self) {
        self.arena.free_slot(self.slot);
    }
}

pub struct Renderable {
    name: String,
    kind: DrawableKind,
    customizer: Customizer,
    topology: PrimitiveTopology,
    casts_shadow: bool,
    self_managed: bool,
    mesh: MeshData,
    uniforms: Vec<UniformBlock>,
    update: Option<UpdateFn>,
    vertex_shader: Arc<dyn Shader>,
    fragment_shader: Option<Arc<dyn Shader>>,
    addons: AddOns,
    pipeline: Arc<dyn Pipeline>,
    shadow_pipeline: Option<Arc<dyn Pipeline>>,
    descriptors: Descriptors,
    dynamic: Option<DynamicBinding>,
}

impl Renderable {
    /// Compile a spec into GPU state
    ///
    /// # Arguments
    ///
    /// * `context` - Target the drawable will render into
    /// * `shader_cache` - Shared module cache
    /// * `spec` - The drawable's description (consumed)
    /// * `dynamic_arena` - Shared arena; required when the spec carries
    ///   `dynamic_data`
    pub fn new(
        context: &RenderContext,
        shader_cache: &mut ShaderCache,
        spec: DrawableSpec,
        dynamic_arena: Option<&Arc<DynamicUniformBuffer>>,
    ) -> Result<Self> {
        let device = context.device();
        let frame_count = context.frame_count();

        let vertex_source = spec
            .shaders
            .iter()
            .find(|s| s.stage == ShaderStage::Vertex)
            .ok_or_else(|| {
                crate::engine_err!(LOG_SOURCE, "drawable '{}' has no vertex shader", spec.name)
            })?;
        let vertex_shader = shader_cache.get_or_create(vertex_source)?;
        let fragment_shader = spec
            .shaders
            .iter()
            .find(|s| s.stage == ShaderStage::Fragment)
            .map(|s| shader_cache.get_or_create(s))
            .transpose()?;

        let dynamic = match spec.dynamic_data {
            Some(data) => {
                let Some(arena) = dynamic_arena else {
                    engine_bail!(
                        LOG_SOURCE,
                        "drawable '{}' wants a dynamic slot but no arena is configured",
                        spec.name
                    );
                };
                if data.len() as u64 != arena.element_size() {
                    return Err(Error::UniformSizeMismatch {
                        name: spec.name.clone(),
                        expected: arena.element_size(),
                        actual: data.len() as u64,
                    });
                }
                let slot = arena.alloc_slot()?;
                let binding = DynamicBinding {
                    arena: Arc::clone(arena),
                    slot,
                    data,
                };
                for frame in 0..frame_count {
                    binding.arena.write(frame, slot, &binding.data)?;
                }
                Some(binding)
            }
            None => None,
        };

        let addons = AddOns::new(
            device,
            frame_count,
            &spec.mesh,
            &spec.uniforms,
            &spec.textures,
            dynamic.as_ref().map(|d| d.arena.element_size()),
        )?;

        let pipeline = build_pipeline(
            device,
            &addons,
            &vertex_shader,
            fragment_shader.as_ref(),
            spec.customizer,
            spec.topology,
            context.render_pass(),
            context.extent(),
        )?;

        let descriptors = create_descriptors(device, frame_count, &addons, dynamic.as_ref())?;

        Ok(Self {
            name: spec.name,
            kind: spec.kind,
            customizer: spec.customizer,
            topology: spec.topology,
            casts_shadow: spec.casts_shadow,
            self_managed: spec.self_managed,
            mesh: spec.mesh,
            uniforms: spec.uniforms,
            update: spec.update,
            vertex_shader,
            fragment_shader,
            addons,
            pipeline,
            shadow_pipeline: None,
            descriptors,
            dynamic,
        })
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DrawableKind {
        self.kind
    }

    pub fn casts_shadow(&self) -> bool {
        self.casts_shadow
    }

    pub fn is_self_managed(&self) -> bool {
        self.self_managed
    }

    pub fn has_shadow_pipeline(&self) -> bool {
        self.shadow_pipeline.is_some()
    }

    /// Recording cadence implied by the drawable kind
    pub fn cadence(&self) -> RecordingCadence {
        match self.kind {
            DrawableKind::Fixed => RecordingCadence::AtInitOnly,
            DrawableKind::Dynamic => RecordingCadence::UponEachFrame,
            DrawableKind::Overlay => RecordingCadence::OnChangeFlagged,
        }
    }

    /// Replace the mesh content; takes effect on the next recreation
    /// with `reload_mesh` set
    pub fn set_mesh(&mut self, mesh: MeshData) {
        self.mesh = mesh;
    }

    /// Mutable access to the CPU-side uniform blocks
    pub fn uniforms_mut(&mut self) -> &mut [UniformBlock] {
        &mut self.uniforms
    }

    // ===== PER-FRAME WORK =====

    /// Run the update callback, if any
    ///
    /// Returns true when the callback reports a change that needs
    /// commands re-recorded.
    pub fn update(&mut self, clock: &FrameClock) -> bool {
        let Some(update) = self.update.as_mut() else {
            return false;
        };
        update(
            clock,
            UpdateTarget {
                uniforms: &mut self.uniforms,
                dynamic_data: self.dynamic.as_mut().map(|d| &mut d.data),
            },
        )
    }

    /// Upload the current uniform values for one frame
    pub fn update_uniform_buffers(&self, frame_index: usize) -> Result<()> {
        for (block_index, block) in self.uniforms.iter().enumerate() {
            self.addons.update_uniform(frame_index, block_index, &block.data)?;
        }
        if let Some(dynamic) = &self.dynamic {
            dynamic.arena.write(frame_index, dynamic.slot, &dynamic.data)?;
        }
        Ok(())
    }

    /// Record this drawable's binds and draw into `cmd`
    ///
    /// Must be called inside the main render pass.
    pub fn issue_bind_and_draw_commands(
        &self,
        cmd: &mut dyn CommandList,
        frame_index: usize,
    ) -> Result<()> {
        self.record_draw(cmd, frame_index, &self.pipeline)
    }

    /// Record this drawable into the shadow depth pass
    ///
    /// A drawable without a shadow pipeline is silently skipped.
    pub fn issue_shadow_commands(&self, cmd: &mut dyn CommandList, frame_index: usize) -> Result<()> {
        match &self.shadow_pipeline {
            Some(pipeline) => self.record_draw(cmd, frame_index, pipeline),
            None => Ok(()),
        }
    }

    fn record_draw(
        &self,
        cmd: &mut dyn CommandList,
        frame_index: usize,
        pipeline: &Arc<dyn Pipeline>,
    ) -> Result<()> {
        let offsets = match &self.dynamic {
            Some(dynamic) => vec![dynamic.arena.offset_for(dynamic.slot)],
            None => Vec::new(),
        };
        cmd.bind_pipeline(pipeline)?;
        cmd.bind_descriptor_set(pipeline, self.descriptors.set(frame_index), &offsets)?;
        if let Some(vertex_buffer) = self.addons.vertex_buffer() {
            cmd.bind_vertex_buffer(vertex_buffer, 0)?;
        }
        match self.addons.index_buffer() {
            Some(index) => {
                cmd.bind_index_buffer(&index.buffer, 0, index.index_type)?;
                cmd.draw_indexed(index.count, 1, 0, 0, 0)
            }
            None => cmd.draw(self.addons.vertex_count(), 1, 0, 0),
        }
    }

    // ===== SHADOW PIPELINE =====

    /// Build the depth-only pipeline for the shadow pass
    pub fn enable_shadow(
        &mut self,
        device: &Arc<dyn GraphicsDevice>,
        shadow_render_pass: &Arc<dyn RenderPass>,
        resolution: u32,
    ) -> Result<()> {
        self.shadow_pipeline = Some(build_pipeline(
            device,
            &self.addons,
            &self.vertex_shader,
            None,
            self.customizer,
            self.topology,
            shadow_render_pass,
            (resolution, resolution),
        )?);
        Ok(())
    }

    pub fn disable_shadow(&mut self) {
        self.shadow_pipeline = None;
    }

    // ===== RECREATION =====

    /// Rebuild after a resize: AddOns first (when the mesh changed, and
    /// for the new frame count), then the pipeline, then the descriptors
    ///
    /// `shadow_render_pass` rebuilds the depth-only pipeline when the
    /// drawable had one.
    pub fn recreate(
        &mut self,
        context: &RenderContext,
        reload_mesh: bool,
        shadow_render_pass: Option<(&Arc<dyn RenderPass>, u32)>,
    ) -> Result<()> {
        let device = context.device();
        let frame_count = context.frame_count();

        if reload_mesh {
            self.addons.reload_mesh(device, &self.mesh)?;
        }
        self.addons.recreate_per_frame(device, frame_count, &self.uniforms)?;

        self.pipeline = build_pipeline(
            device,
            &self.addons,
            &self.vertex_shader,
            self.fragment_shader.as_ref(),
            self.customizer,
            self.topology,
            context.render_pass(),
            context.extent(),
        )?;

        if self.shadow_pipeline.is_some() {
            match shadow_render_pass {
                Some((render_pass, resolution)) => {
                    self.enable_shadow(device, render_pass, resolution)?
                }
                None => self.shadow_pipeline = None,
            }
        }

        self.descriptors = create_descriptors(device, frame_count, &self.addons, self.dynamic.as_ref())?;

        // The new per-frame buffers start empty; refill every frame.
        for frame in 0..frame_count {
            self.update_uniform_buffers(frame)?;
        }
        Ok(())
    }
}

// ===== INTERNAL =====

#[allow(clippy::too_many_arguments)]
fn build_pipeline(
    device: &Arc<dyn GraphicsDevice>,
    addons: &AddOns,
    vertex_shader: &Arc<dyn Shader>,
    fragment_shader: Option<&Arc<dyn Shader>>,
    customizer: Customizer,
    topology: PrimitiveTopology,
    render_pass: &Arc<dyn RenderPass>,
    extent: (u32, u32),
) -> Result<Arc<dyn Pipeline>> {
    device.create_pipeline(&PipelineDesc {
        vertex_shader: Arc::clone(vertex_shader),
        fragment_shader: fragment_shader.map(Arc::clone),
        vertex_layout: addons.vertex_layout().clone(),
        topology,
        descriptor_layout: addons.layout().to_vec(),
        render_pass: Arc::clone(render_pass),
        extent,
        rasterization: customizer.rasterization_state(),
        depth_stencil: DepthStencilState::default(),
        color_blend: customizer.color_blend_state(),
    })
}

fn create_descriptors(
    device: &Arc<dyn GraphicsDevice>,
    frame_count: usize,
    addons: &AddOns,
    dynamic: Option<&DynamicBinding>,
) -> Result<Descriptors> {
    let arena_buffers: Vec<Arc<dyn Buffer>> = match dynamic {
        Some(binding) => (0..frame_count).map(|f| binding.arena.buffer(f)).collect(),
        None => Vec::new(),
    };
    let mut frames = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let dynamic_ref = dynamic.map(|d| (&arena_buffers[frame], d.arena.element_size()));
        frames.push(addons.descriptor_bindings(frame, dynamic_ref)?);
    }
    Descriptors::new(device, addons.layout(), &frames)
}

#[cfg(test)]
#[path = "renderable_tests.rs"]
mod tests;
