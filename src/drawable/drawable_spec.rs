/// DrawableSpec - everything the caller hands over to register a drawable

use crate::clock::FrameClock;
use crate::drawable::{Customizer, MeshData};
use crate::graphics_device::{
    DecodedImage, PrimitiveTopology, SamplerDesc, ShaderStage, ShaderStageFlags,
};

/// How a drawable's commands are recorded
///
/// The kind decides the recording cadence of the command bucket the
/// drawable lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawableKind {
    /// Static content; commands recorded once after registration
    Fixed,
    /// Content whose uniforms change every frame; commands re-recorded
    /// each frame
    Dynamic,
    /// Content that changes occasionally; commands re-recorded only when
    /// flagged, in a bucket of its own
    Overlay,
}

/// One shader module of a drawable
#[derive(Debug, Clone)]
pub struct ShaderSource {
    /// Cache key; two drawables naming the same shader share one module
    pub name: String,
    pub stage: ShaderStage,
    /// Pre-compiled bytecode
    pub code: Vec<u8>,
}

/// One uniform block of a drawable
///
/// `data` holds the current CPU-side value; it is copied into the
/// per-frame uniform buffer each time that frame is prepared. The byte
/// length fixes the buffer size at registration and may never change.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    /// Name used in size-mismatch diagnostics
    pub name: String,
    pub data: Vec<u8>,
    /// Shader stages reading this block
    pub stages: ShaderStageFlags,
}

/// One texture of a drawable
#[derive(Debug, Clone)]
pub struct TextureSpec {
    pub image: DecodedImage,
    pub sampler: SamplerDesc,
}

/// Mutable view handed to a drawable's update callback
pub struct UpdateTarget<'a> {
    /// The drawable's uniform blocks; resizing `data` is not allowed
    pub uniforms: &'a mut [UniformBlock],
    /// Element bytes in the shared dynamic uniform buffer, if the
    /// drawable has a slot there
    pub dynamic_data: Option<&'a mut Vec<u8>>,
}

/// Per-frame update callback
///
/// Returns true when the drawable changed in a way that requires its
/// commands to be re-recorded (only meaningful for `Overlay` drawables).
pub type UpdateFn = Box<dyn FnMut(&FrameClock, UpdateTarget) -> bool + Send>;

/// Full description of a drawable, consumed by registration
pub struct DrawableSpec {
    pub name: String,
    pub kind: DrawableKind,
    pub mesh: MeshData,
    pub topology: PrimitiveTopology,
    /// Vertex shader required, fragment shader optional
    pub shaders: Vec<ShaderSource>,
    /// Bound at binding indices 0..n, in declaration order
    pub uniforms: Vec<UniformBlock>,
    /// Bound after the uniform blocks, in declaration order
    pub textures: Vec<TextureSpec>,
    pub customizer: Customizer,
    /// Include this drawable in the shadow depth pass
    pub casts_shadow: bool,
    /// Survives `remove_all()`; removed only explicitly
    pub self_managed: bool,
    /// Initial element bytes in the shared dynamic uniform buffer;
    /// `None` means the drawable takes no slot there
    pub dynamic_data: Option<Vec<u8>>,
    pub update: Option<UpdateFn>,
}

impl DrawableSpec {
    pub fn new(name: impl Into<String>, kind: DrawableKind, mesh: MeshData) -> Self {
        Self {
            name: name.into(),
            kind,
            mesh,
            topology: PrimitiveTopology::TriangleList,
            shaders: Vec::new(),
            uniforms: Vec::new(),
            textures: Vec::new(),
            customizer: Customizer::default(),
            casts_shadow: false,
            self_managed: false,
            dynamic_data: None,
            update: None,
        }
    }

    pub fn with_shader(mut self, name: impl Into<String>, stage: ShaderStage, code: Vec<u8>) -> Self {
        self.shaders.push(ShaderSource {
            name: name.into(),
            stage,
            code,
        });
        self
    }

    pub fn with_uniform(
        mut self,
        name: impl Into<String>,
        data: Vec<u8>,
        stages: ShaderStageFlags,
    ) -> Self {
        self.uniforms.push(UniformBlock {
            name: name.into(),
            data,
            stages,
        });
        self
    }

    pub fn with_texture(mut self, image: DecodedImage, sampler: SamplerDesc) -> Self {
        self.textures.push(TextureSpec { image, sampler });
        self
    }

    pub fn with_customizer(mut self, customizer: Customizer) -> Self {
        self.customizer = customizer;
        self
    }

    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        self.casts_shadow = true;
        self
    }

    pub fn self_managed(mut self) -> Self {
        self.self_managed = true;
        self
    }

    pub fn with_dynamic_data(mut self, data: Vec<u8>) -> Self {
        self.dynamic_data = Some(data);
        self
    }

    pub fn with_update(
        mut self,
        update: impl FnMut(&FrameClock, UpdateTarget) -> bool + Send + 'static,
    ) -> Self {
        self.update = Some(Box::new(update));
        self
    }
}
