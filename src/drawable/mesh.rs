/// Mesh data - CPU-side vertex and index content handed over at registration

use bytemuck::Pod;

use crate::engine_bail;
use crate::error::Result;
use crate::graphics_device::{IndexType, VertexLayout};

const LOG_SOURCE: &str = "prism::MeshData";

/// Index buffer content
#[derive(Debug, Clone)]
pub struct IndexData {
    /// Raw index bytes
    pub data: Vec<u8>,
    /// Element type of the indices
    pub index_type: IndexType,
    /// Number of indices
    pub count: u32,
}

/// CPU-side mesh content
///
/// Vertex data is an opaque byte blob described by `layout`; indices are
/// optional. Uploaded to device-local memory when the drawable is
/// registered. A mesh may also carry no vertex data at all, for shaders
/// that generate their geometry from the vertex index alone.
#[derive(Debug, Clone)]
pub struct MeshData {
    /// Interleaved vertex bytes
    pub vertex_data: Vec<u8>,
    /// Number of vertices
    pub vertex_count: u32,
    /// Layout of one vertex
    pub layout: VertexLayout,
    /// Optional index data
    pub indices: Option<IndexData>,
}

impl MeshData {
    /// Build from a typed vertex slice
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mesh = MeshData::from_vertices(&vertices, layout)
    ///     .with_indices_u32(&[0, 1, 2, 2, 3, 0]);
    /// ```
    pub fn from_vertices<T: Pod>(vertices: &[T], layout: VertexLayout) -> Self {
        Self {
            vertex_data: bytemuck::cast_slice(vertices).to_vec(),
            vertex_count: vertices.len() as u32,
            layout,
            indices: None,
        }
    }

    /// Build a mesh with no vertex buffer
    ///
    /// The vertex shader fabricates positions from `gl_VertexIndex`;
    /// `vertex_count` is the number of invocations to draw.
    pub fn procedural(vertex_count: u32) -> Self {
        Self {
            vertex_data: Vec::new(),
            vertex_count,
            layout: VertexLayout {
                stride: 0,
                attributes: Vec::new(),
            },
            indices: None,
        }
    }

    /// Whether this mesh carries vertex bytes to upload
    pub fn has_vertex_data(&self) -> bool {
        !self.vertex_data.is_empty()
    }

    pub fn with_indices_u16(mut self, indices: &[u16]) -> Self {
        self.indices = Some(IndexData {
            data: bytemuck::cast_slice(indices).to_vec(),
            index_type: IndexType::U16,
            count: indices.len() as u32,
        });
        self
    }

    pub fn with_indices_u32(mut self, indices: &[u32]) -> Self {
        self.indices = Some(IndexData {
            data: bytemuck::cast_slice(indices).to_vec(),
            index_type: IndexType::U32,
            count: indices.len() as u32,
        });
        self
    }

    /// Check internal consistency before upload
    pub fn validate(&self) -> Result<()> {
        if self.vertex_count == 0 {
            engine_bail!(LOG_SOURCE, "mesh has no vertices");
        }
        if self.vertex_data.is_empty() {
            // Procedural mesh: the shader owns the geometry, so there
            // must be no layout either.
            if self.layout.stride != 0 || !self.layout.attributes.is_empty() {
                engine_bail!(LOG_SOURCE, "vertex layout given without vertex data");
            }
        } else {
            if self.layout.stride == 0 {
                engine_bail!(LOG_SOURCE, "vertex layout has zero stride");
            }
            let expected = self.layout.stride as usize * self.vertex_count as usize;
            if self.vertex_data.len() != expected {
                engine_bail!(
                    LOG_SOURCE,
                    "vertex data is {} bytes, {} vertices of stride {} need {}",
                    self.vertex_data.len(),
                    self.vertex_count,
                    self.layout.stride,
                    expected
                );
            }
        }
        for attribute in &self.layout.attributes {
            if attribute.offset + attribute.format.size_bytes() > self.layout.stride {
                engine_bail!(
                    LOG_SOURCE,
                    "attribute at location {} overruns the vertex stride",
                    attribute.location
                );
            }
        }
        if let Some(indices) = &self.indices {
            let expected = indices.index_type.size_bytes() as usize * indices.count as usize;
            if indices.data.len() != expected {
                engine_bail!(
                    LOG_SOURCE,
                    "index data is {} bytes, {} indices need {}",
                    indices.data.len(),
                    indices.count,
                    expected
                );
            }
        }
        Ok(())
    }
}

// ===== TESTS =====
