/// Descriptors - pool and per-frame descriptor sets of one drawable
///
/// The set count always equals the frame count; after a recreation the
/// whole object is rebuilt so the two can never drift apart.

use std::sync::Arc;

use crate::engine_bail;
use crate::error::Result;
use crate::graphics_device::{
    BindingType, DescriptorBinding, DescriptorLayoutEntry, DescriptorPool, DescriptorPoolDesc,
    DescriptorSet, GraphicsDevice,
};

const LOG_SOURCE: &str = "prism::Descriptors";

pub struct Descriptors {
    // Pool is dropped last; sets allocated from it must not outlive it.
    sets: Vec<Arc<dyn DescriptorSet>>,
    _pool: Box<dyn DescriptorPool>,
}

impl Descriptors {
    /// Allocate one set per frame
    ///
    /// # Arguments
    ///
    /// * `layout` - Binding layout of the drawable's set
    /// * `frames` - Resource writes per frame; length fixes the set count
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        layout: &[DescriptorLayoutEntry],
        frames: &[Vec<DescriptorBinding>],
    ) -> Result<Self> {
        if frames.is_empty() {
            engine_bail!(LOG_SOURCE, "descriptor sets need at least one frame");
        }
        for (frame_index, bindings) in frames.iter().enumerate() {
            if bindings.len() != layout.len() {
                engine_bail!(
                    LOG_SOURCE,
                    "frame {} writes {} bindings, layout has {}",
                    frame_index,
                    bindings.len(),
                    layout.len()
                );
            }
        }

        let pool = device.create_descriptor_pool(&pool_desc(layout, frames.len() as u32))?;
        let mut sets = Vec::with_capacity(frames.len());
        for bindings in frames {
            sets.push(pool.allocate_set(bindings)?);
        }
        Ok(Self { sets, _pool: pool })
    }

    /// The set for one frame in flight
    pub fn set(&self, frame_index: usize) -> &Arc<dyn DescriptorSet> {
        &self.sets[frame_index]
    }

    pub fn set_count(&self) -> usize {
        self.sets.len()
    }
}

/// Pool capacities for `frame_count` sets of the given layout
fn pool_desc(layout: &[DescriptorLayoutEntry], frame_count: u32) -> DescriptorPoolDesc {
    let mut desc = DescriptorPoolDesc {
        max_sets: frame_count,
        ..Default::default()
    };
    for entry in layout {
        let slot = match entry.binding_type {
            BindingType::UniformBuffer => &mut desc.uniform_buffers,
            BindingType::UniformBufferDynamic => &mut desc.dynamic_uniform_buffers,
            BindingType::CombinedImageSampler => &mut desc.combined_image_samplers,
        };
        *slot += entry.count * frame_count;
    }
    desc
}

#[cfg(test)]
#[path = "descriptors_tests.rs"]
mod tests;
