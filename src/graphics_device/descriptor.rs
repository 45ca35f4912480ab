/// Descriptor pool, set layout and binding description types

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Buffer, Sampler, ShaderStageFlags, Texture};

/// Kind of resource bound at one descriptor binding index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingType {
    /// Uniform buffer with a fixed offset
    UniformBuffer,
    /// Uniform buffer whose offset is supplied at bind time
    UniformBufferDynamic,
    /// Sampled texture with its sampler
    CombinedImageSampler,
}

/// One entry in a descriptor set layout
///
/// Binding indices must match the shader's `layout(binding = N)`
/// declarations. A drawable's set always lists uniform blocks first,
/// then textures, in declaration order.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorLayoutEntry {
    /// Binding index within the set
    pub binding: u32,
    /// Kind of resource at this binding
    pub binding_type: BindingType,
    /// Number of descriptors (arrays; usually 1)
    pub count: u32,
    /// Shader stages that access this binding
    pub stages: ShaderStageFlags,
}

/// Descriptor for creating a descriptor pool
///
/// Capacities are totals across all sets the pool will allocate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorPoolDesc {
    /// Maximum number of sets allocatable from the pool
    pub max_sets: u32,
    /// Total uniform buffer descriptors
    pub uniform_buffers: u32,
    /// Total dynamic uniform buffer descriptors
    pub dynamic_uniform_buffers: u32,
    /// Total combined image sampler descriptors
    pub combined_image_samplers: u32,
}

/// One resource write into a descriptor set at allocation time
pub enum DescriptorBinding<'a> {
    /// Uniform buffer region with a fixed offset
    UniformBuffer {
        binding: u32,
        buffer: &'a Arc<dyn Buffer>,
        offset: u64,
        range: u64,
        stages: ShaderStageFlags,
    },
    /// Uniform buffer region whose offset is supplied at bind time
    DynamicUniformBuffer {
        binding: u32,
        buffer: &'a Arc<dyn Buffer>,
        /// Size of one element, not of the whole buffer
        range: u64,
        stages: ShaderStageFlags,
    },
    /// Sampled texture with its sampler
    CombinedImageSampler {
        binding: u32,
        texture: &'a Arc<dyn Texture>,
        sampler: &'a Arc<dyn Sampler>,
        stages: ShaderStageFlags,
    },
}

impl DescriptorBinding<'_> {
    /// Binding index of this write
    pub fn binding(&self) -> u32 {
        match self {
            DescriptorBinding::UniformBuffer { binding, .. } => *binding,
            DescriptorBinding::DynamicUniformBuffer { binding, .. } => *binding,
            DescriptorBinding::CombinedImageSampler { binding, .. } => *binding,
        }
    }

    /// Layout entry matching this write
    pub fn layout_entry(&self) -> DescriptorLayoutEntry {
        match self {
            DescriptorBinding::UniformBuffer { binding, stages, .. } => DescriptorLayoutEntry {
                binding: *binding,
                binding_type: BindingType::UniformBuffer,
                count: 1,
                stages: *stages,
            },
            DescriptorBinding::DynamicUniformBuffer { binding, stages, .. } => {
                DescriptorLayoutEntry {
                    binding: *binding,
                    binding_type: BindingType::UniformBufferDynamic,
                    count: 1,
                    stages: *stages,
                }
            }
            DescriptorBinding::CombinedImageSampler { binding, stages, .. } => {
                DescriptorLayoutEntry {
                    binding: *binding,
                    binding_type: BindingType::CombinedImageSampler,
                    count: 1,
                    stages: *stages,
                }
            }
        }
    }
}

/// Pool from which descriptor sets are allocated
///
/// Dropping the pool frees all sets allocated from it, so per-frame set
/// lifetimes are tied to the pool's lifetime.
pub trait DescriptorPool: Send + Sync {
    /// Allocate one descriptor set and write the given bindings into it.
    ///
    /// # Arguments
    ///
    /// * `bindings` - Resource writes, in binding-index order
    fn allocate_set(&self, bindings: &[DescriptorBinding]) -> Result<Arc<dyn DescriptorSet>>;
}

/// Allocated descriptor set (opaque handle)
pub trait DescriptorSet: Send + Sync {}
