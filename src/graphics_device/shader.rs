/// Shader trait and shader descriptor
///
/// Shader compilation is out of scope; descriptors carry pre-compiled
/// backend bytecode (e.g. SPIR-V).

/// Shader stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

bitflags::bitflags! {
    /// Shader stage visibility flags for resource bindings
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX   = 0b01;
        const FRAGMENT = 0b10;
    }
}

impl From<ShaderStage> for ShaderStageFlags {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => ShaderStageFlags::VERTEX,
            ShaderStage::Fragment => ShaderStageFlags::FRAGMENT,
        }
    }
}

/// Descriptor for creating a shader module
#[derive(Debug, Clone)]
pub struct ShaderDesc {
    /// Human-readable name, also the shader-cache key
    pub name: String,
    /// Stage this module is for
    pub stage: ShaderStage,
    /// Pre-compiled bytecode
    pub code: Vec<u8>,
}

/// Shader module resource trait
///
/// Implemented by backend-specific shader types (e.g., VulkanShader).
/// Destroyed when the last `Arc` handle drops; the shader cache holds one
/// handle per distinct module.
pub trait Shader: Send + Sync {}
