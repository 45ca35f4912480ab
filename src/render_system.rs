/// RenderSystem - the facade tying registry, commands and shadows together
///
/// Owns the whole object tree: the render context, the shader cache,
/// the renderable registry, the command control and the shadow system.
/// Callers register drawables, then drive the per-frame loop:
/// `update()`, `record_for_frame()`, `buffers_for_frame()`.

use std::sync::Arc;

use crate::clock::FrameClock;
use crate::command::CommandControl;
use crate::context::{RenderContext, RenderContextDesc};
use crate::drawable::{DrawableSpec, DynamicUniformBuffer, Renderable, ShaderCache};
use crate::engine_info;
use crate::error::Result;
use crate::graphics_device::{CommandList, GraphicsDevice, Swapchain};
use crate::registry::{DrawableKey, Renderables};
use crate::shadow::{ShadowConfig, ShadowSystem};

const LOG_SOURCE: &str = "prism::RenderSystem";

/// Sizing of the shared dynamic uniform arena
#[derive(Debug, Clone, Copy)]
pub struct DynamicUniformDesc {
    /// Size of one element in bytes
    pub element_size: u64,
    /// Maximum number of drawables holding a slot at once
    pub capacity: u32,
}

/// Configuration for building a render system
#[derive(Default)]
pub struct RenderSystemDesc {
    pub context: RenderContextDesc,
    pub shadows: ShadowConfig,
    /// `None` disables the shared dynamic uniform arena
    pub dynamic_uniforms: Option<DynamicUniformDesc>,
}

pub struct RenderSystem {
    context: RenderContext,
    shader_cache: ShaderCache,
    registry: Renderables,
    commands: CommandControl,
    shadows: ShadowSystem,
    dynamic_uniforms: Option<Arc<DynamicUniformBuffer>>,
}

impl RenderSystem {
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        swapchain: Box<dyn Swapchain>,
        desc: RenderSystemDesc,
    ) -> Result<Self> {
        let context = RenderContext::new(Arc::clone(&device), swapchain, desc.context)?;
        let frame_count = context.frame_count();
        let shadows = ShadowSystem::new(&device, frame_count, desc.shadows)?;
        let dynamic_uniforms = desc
            .dynamic_uniforms
            .map(|d| {
                DynamicUniformBuffer::new(&device, frame_count, d.element_size, d.capacity)
                    .map(Arc::new)
            })
            .transpose()?;
        Ok(Self {
            shader_cache: ShaderCache::new(device),
            context,
            registry: Renderables::new(),
            commands: CommandControl::new(),
            shadows,
            dynamic_uniforms,
        })
    }

    // ===== REGISTRATION =====

    /// Compile and register a drawable
    ///
    /// Valid at any time; registering after command buffers were
    /// allocated frees and reallocates them for the new bucket topology.
    pub fn register(&mut self, spec: DrawableSpec) -> Result<DrawableKey> {
        let mut renderable = Renderable::new(
            &self.context,
            &mut self.shader_cache,
            spec,
            self.dynamic_uniforms.as_ref(),
        )?;
        if renderable.casts_shadow() {
            if let Some(render_pass) = self.shadows.render_pass() {
                renderable.enable_shadow(
                    self.context.device(),
                    render_pass,
                    self.shadows.resolution(),
                )?;
            }
        }
        let key = self.registry.add(renderable);
        self.reallocate_if_prepared()?;
        Ok(key)
    }

    /// Remove one drawable, waiting for in-flight frames first
    pub fn remove(&mut self, key: DrawableKey) -> Result<bool> {
        if self.registry.get(key).is_none() {
            return Ok(false);
        }
        self.context.device().wait_idle()?;
        self.registry.remove(key);
        self.reallocate_if_prepared()?;
        Ok(true)
    }

    /// Remove every drawable except self-managed ones
    pub fn remove_all(&mut self) -> Result<()> {
        self.context.device().wait_idle()?;
        let removed = self.registry.remove_all();
        engine_info!(LOG_SOURCE, "Removed {} drawables", removed.len());
        drop(removed);
        self.reallocate_if_prepared()?;
        Ok(())
    }

    /// Allocate the command buffers once registration is complete,
    /// recording the init-once buckets for every frame right away
    pub fn post_init_prep_buffers(&mut self) -> Result<()> {
        self.commands.post_init_prep_buffers(&self.context, &self.registry)
    }

    // ===== PER-FRAME LOOP =====

    /// Run every drawable's update callback
    pub fn update(&mut self, clock: &FrameClock) -> bool {
        self.registry.update(clock)
    }

    /// Flag one drawable's bucket for re-recording
    pub fn flag_changed(&mut self, key: DrawableKey) {
        self.registry.flag_changed(key);
    }

    /// Bring one frame's GPU state up to date: uniforms, then the shadow
    /// pass, then whichever main-pass buckets need re-recording
    pub fn record_for_frame(&mut self, frame_index: usize) -> Result<()> {
        self.registry.update_uniform_buffers(frame_index)?;
        self.shadows.record_for_frame(frame_index, &self.registry)?;
        self.commands.record_for_frame(frame_index, &self.context, &self.registry)
    }

    /// Command lists to submit for one frame: the shadow pass first,
    /// then the main-pass buckets in registration order
    pub fn buffers_for_frame(&self, frame_index: usize) -> Vec<&dyn CommandList> {
        let mut buffers = Vec::new();
        if let Some(shadow_list) = self.shadows.command_list(frame_index) {
            buffers.push(shadow_list);
        }
        buffers.extend(self.commands.buffers_for_frame(frame_index));
        buffers
    }

    // ===== RESIZE =====

    /// Run the full recreation cascade after a window resize
    ///
    /// Frees the command buffers, recreates the swapchain (which may
    /// change the frame count), then rebuilds every frame-count-dependent
    /// resource and reallocates the command buffers.
    pub fn recreate_on_resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.commands.free_buffers();
        self.context.recreate(width, height)?;
        let frame_count = self.context.frame_count();

        if let Some(arena) = &self.dynamic_uniforms {
            arena.recreate(self.context.device(), frame_count)?;
        }
        self.shadows.recreate(self.context.device(), frame_count)?;

        let shadow_target = self
            .shadows
            .render_pass()
            .cloned()
            .map(|render_pass| (render_pass, self.shadows.resolution()));
        for (_, renderable) in self.registry.iter_mut() {
            renderable.recreate(
                &self.context,
                false,
                shadow_target.as_ref().map(|(rp, res)| (rp, *res)),
            )?;
        }

        self.post_init_prep_buffers()
    }

    /// Replace one drawable's mesh and rebuild it (AddOns first)
    pub fn replace_mesh(&mut self, key: DrawableKey, mesh: crate::drawable::MeshData) -> Result<()> {
        self.context.device().wait_idle()?;
        let shadow_target = self
            .shadows
            .render_pass()
            .cloned()
            .map(|render_pass| (render_pass, self.shadows.resolution()));
        let Some(renderable) = self.registry.get_mut(key) else {
            crate::engine_bail!(LOG_SOURCE, "replace_mesh on an unknown drawable");
        };
        renderable.set_mesh(mesh);
        renderable.recreate(
            &self.context,
            true,
            shadow_target.as_ref().map(|(rp, res)| (rp, *res)),
        )?;
        self.reallocate_if_prepared()
    }

    // ===== ACCESSORS =====

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RenderContext {
        &mut self.context
    }

    pub fn frame_count(&self) -> usize {
        self.context.frame_count()
    }

    pub fn shadows(&self) -> &ShadowSystem {
        &self.shadows
    }

    pub fn shadows_mut(&mut self) -> &mut ShadowSystem {
        &mut self.shadows
    }

    pub fn dynamic_uniforms(&self) -> Option<&Arc<DynamicUniformBuffer>> {
        self.dynamic_uniforms.as_ref()
    }

    pub fn drawable_count(&self) -> usize {
        self.registry.len()
    }

    // ===== INTERNAL =====

    /// After a topology change, stale command buffers must not survive
    fn reallocate_if_prepared(&mut self) -> Result<()> {
        if self.commands.is_allocated() {
            self.commands.free_buffers();
            self.post_init_prep_buffers()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "render_system_tests.rs"]
mod tests;
