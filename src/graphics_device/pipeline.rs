/// Pipeline trait and pipeline descriptor

use std::sync::Arc;
use crate::graphics_device::{DescriptorLayoutEntry, RenderPass, Shader};

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    /// Triangle list
    TriangleList,
    /// Triangle strip
    TriangleStrip,
    /// Line list
    LineList,
    /// Point list
    PointList,
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 16-bit indices (max 65535 vertices)
    U16,
    /// 32-bit indices (max ~4 billion vertices)
    U32,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Vertex attribute component format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    F32,
    F32x2,
    F32x3,
    F32x4,
}

impl VertexFormat {
    /// Size in bytes of one attribute of this format
    pub fn size_bytes(&self) -> u32 {
        match self {
            VertexFormat::F32 => 4,
            VertexFormat::F32x2 => 8,
            VertexFormat::F32x3 => 12,
            VertexFormat::F32x4 => 16,
        }
    }
}

/// Vertex attribute description
#[derive(Debug, Clone, Copy)]
pub struct VertexAttribute {
    /// Attribute location in shader
    pub location: u32,
    /// Format of the attribute (data type and component count)
    pub format: VertexFormat,
    /// Offset in bytes from the start of the vertex
    pub offset: u32,
}

/// Vertex input layout (single interleaved binding)
#[derive(Debug, Clone, Default)]
pub struct VertexLayout {
    /// Stride in bytes between consecutive vertices
    pub stride: u32,
    /// Vertex attributes
    pub attributes: Vec<VertexAttribute>,
}

// ===== RASTERIZATION ENUMS =====

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Front face winding order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    /// Counter-clockwise vertices define front face
    CounterClockwise,
    /// Clockwise vertices define front face
    Clockwise,
}

/// Polygon rendering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    /// Fill polygons
    Fill,
    /// Draw edges only (wireframe)
    Line,
}

/// Comparison operator for depth tests and compare samplers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

// ===== FIXED-FUNCTION STATE =====

/// Rasterization fixed-function state
#[derive(Debug, Clone, Copy)]
pub struct RasterizationState {
    /// Face culling mode
    pub cull_mode: CullMode,
    /// Front face winding order
    pub front_face: FrontFace,
    /// Polygon rendering mode
    pub polygon_mode: PolygonMode,
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            polygon_mode: PolygonMode::Fill,
        }
    }
}

/// Depth testing state
#[derive(Debug, Clone, Copy)]
pub struct DepthStencilState {
    /// Enable depth testing
    pub depth_test_enable: bool,
    /// Enable writing to depth buffer
    pub depth_write_enable: bool,
    /// Depth comparison operator
    pub depth_compare_op: CompareOp,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_op: CompareOp::Less,
        }
    }
}

/// Color blending state (single attachment)
#[derive(Debug, Clone, Copy)]
pub struct ColorBlendState {
    /// Enable standard src-alpha / one-minus-src-alpha blending
    pub blend_enable: bool,
}

impl Default for ColorBlendState {
    fn default() -> Self {
        Self { blend_enable: false }
    }
}

// ===== PIPELINE DESCRIPTOR =====

/// Descriptor for creating a graphics pipeline
#[derive(Clone)]
pub struct PipelineDesc {
    /// Vertex shader
    pub vertex_shader: Arc<dyn Shader>,
    /// Fragment shader (None for depth-only passes)
    pub fragment_shader: Option<Arc<dyn Shader>>,
    /// Vertex input layout
    pub vertex_layout: VertexLayout,
    /// Primitive topology
    pub topology: PrimitiveTopology,
    /// Descriptor set layout entries (binding indices into the one set)
    pub descriptor_layout: Vec<DescriptorLayoutEntry>,
    /// Render pass this pipeline renders into
    pub render_pass: Arc<dyn RenderPass>,
    /// Viewport extent in pixels (width, height)
    pub extent: (u32, u32),
    /// Rasterization state
    pub rasterization: RasterizationState,
    /// Depth testing state
    pub depth_stencil: DepthStencilState,
    /// Color blending state
    pub color_blend: ColorBlendState,
}

/// Pipeline resource trait
///
/// Implemented by backend-specific pipeline types (e.g., VulkanPipeline).
/// The pipeline is automatically destroyed when dropped.
pub trait Pipeline: Send + Sync {}
