/// AddOns - the GPU residency of one drawable
///
/// Owns the device-local vertex/index buffers, one uniform buffer per
/// frame per block, and the textures with their samplers. Also fixes the
/// drawable's descriptor binding layout: uniform blocks first, then the
/// dynamic element (if any), then textures, at binding indices 0..k.

use std::sync::Arc;

use crate::engine_bail;
use crate::engine_warn;
use crate::error::{Error, Result};
use crate::drawable::{MeshData, TextureSpec, UniformBlock};
use crate::graphics_device::{
    BindingType, Buffer, BufferDesc, BufferUsage, DescriptorBinding, DescriptorLayoutEntry,
    GraphicsDevice, IndexType, MemoryKind, Sampler, ShaderStageFlags, Texture, TextureDesc,
    TextureFormat, TextureUsage, VertexLayout,
};

const LOG_SOURCE: &str = "prism::AddOns";

/// Uploaded index buffer with its draw parameters
pub struct IndexBuffer {
    pub buffer: Arc<dyn Buffer>,
    pub index_type: IndexType,
    pub count: u32,
}

pub struct AddOns {
    /// Absent for procedural meshes whose shader generates its geometry
    vertex_buffer: Option<Arc<dyn Buffer>>,
    vertex_count: u32,
    vertex_layout: VertexLayout,
    index_buffer: Option<IndexBuffer>,
    /// `uniform_buffers[frame][block]`
    uniform_buffers: Vec<Vec<Arc<dyn Buffer>>>,
    uniform_sizes: Vec<u64>,
    uniform_names: Vec<String>,
    textures: Vec<(Arc<dyn Texture>, Arc<dyn Sampler>)>,
    layout: Vec<DescriptorLayoutEntry>,
}

impl AddOns {
    /// Upload a drawable's resources
    ///
    /// Vertex and index data go through a staging buffer into
    /// device-local memory (blocking); a procedural mesh uploads no
    /// vertex buffer at all. Uniform buffers are host-visible
    /// and duplicated `frame_count` times. Textures in a format the
    /// device rejects are re-packed to `R8G8B8A8_UNORM` with a warning.
    pub fn new(
        device: &Arc<dyn GraphicsDevice>,
        frame_count: usize,
        mesh: &MeshData,
        uniforms: &[UniformBlock],
        textures: &[TextureSpec],
        dynamic_element: Option<u64>,
    ) -> Result<Self> {
        mesh.validate()?;

        let vertex_buffer = if mesh.has_vertex_data() {
            Some(upload_device_local(device, &mesh.vertex_data, BufferUsage::Vertex)?)
        } else {
            None
        };
        let index_buffer = match &mesh.indices {
            Some(indices) => Some(IndexBuffer {
                buffer: upload_device_local(device, &indices.data, BufferUsage::Index)?,
                index_type: indices.index_type,
                count: indices.count,
            }),
            None => None,
        };

        let uniform_buffers = create_uniform_buffers(device, frame_count, uniforms)?;
        let uniform_sizes = uniforms.iter().map(|u| u.data.len() as u64).collect();
        let uniform_names = uniforms.iter().map(|u| u.name.clone()).collect();

        let mut loaded_textures = Vec::with_capacity(textures.len());
        for spec in textures {
            loaded_textures.push(create_texture(device, spec)?);
        }

        let layout = build_layout(uniforms, dynamic_element.is_some(), textures.len());

        Ok(Self {
            vertex_buffer,
            vertex_count: mesh.vertex_count,
            vertex_layout: mesh.layout.clone(),
            index_buffer,
            uniform_buffers,
            uniform_sizes,
            uniform_names,
            textures: loaded_textures,
            layout,
        })
    }

    // ===== ACCESSORS =====

    pub fn vertex_buffer(&self) -> Option<&Arc<dyn Buffer>> {
        self.vertex_buffer.as_ref()
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn vertex_layout(&self) -> &VertexLayout {
        &self.vertex_layout
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index_buffer.as_ref()
    }

    /// Descriptor layout of this drawable's single set
    pub fn layout(&self) -> &[DescriptorLayoutEntry] {
        &self.layout
    }

    pub fn uniform_count(&self) -> usize {
        self.uniform_sizes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn uniform_buffer(&self, frame_index: usize, block_index: usize) -> &Arc<dyn Buffer> {
        &self.uniform_buffers[frame_index][block_index]
    }

    // ===== UPDATES =====

    /// Copy one uniform block's bytes into its buffer for one frame
    ///
    /// A size mismatch is fatal: the shader layout contract is broken.
    pub fn update_uniform(&self, frame_index: usize, block_index: usize, data: &[u8]) -> Result<()> {
        let expected = self.uniform_sizes[block_index];
        if data.len() as u64 != expected {
            return Err(Error::UniformSizeMismatch {
                name: self.uniform_names[block_index].clone(),
                expected,
                actual: data.len() as u64,
            });
        }
        self.uniform_buffers[frame_index][block_index].update(0, data)
    }

    // ===== RECREATION =====

    /// Rebuild the per-frame uniform buffers for a new frame count
    pub fn recreate_per_frame(
        &mut self,
        device: &Arc<dyn GraphicsDevice>,
        frame_count: usize,
        uniforms: &[UniformBlock],
    ) -> Result<()> {
        self.uniform_buffers = create_uniform_buffers(device, frame_count, uniforms)?;
        Ok(())
    }

    /// Re-upload vertex and index data (mesh content changed)
    pub fn reload_mesh(&mut self, device: &Arc<dyn GraphicsDevice>, mesh: &MeshData) -> Result<()> {
        mesh.validate()?;
        self.vertex_buffer = if mesh.has_vertex_data() {
            Some(upload_device_local(device, &mesh.vertex_data, BufferUsage::Vertex)?)
        } else {
            None
        };
        self.vertex_count = mesh.vertex_count;
        self.vertex_layout = mesh.layout.clone();
        self.index_buffer = match &mesh.indices {
            Some(indices) => Some(IndexBuffer {
                buffer: upload_device_local(device, &indices.data, BufferUsage::Index)?,
                index_type: indices.index_type,
                count: indices.count,
            }),
            None => None,
        };
        Ok(())
    }

    // ===== DESCRIPTOR WRITES =====

    /// Writes for this drawable's descriptor set of one frame
    ///
    /// `dynamic` supplies the shared arena's buffer for that frame and
    /// the element size, when the drawable holds a slot there.
    pub fn descriptor_bindings<'a>(
        &'a self,
        frame_index: usize,
        dynamic: Option<(&'a Arc<dyn Buffer>, u64)>,
    ) -> Result<Vec<DescriptorBinding<'a>>> {
        let mut bindings = Vec::with_capacity(self.layout.len());
        let mut next_uniform = 0;
        let mut next_texture = 0;
        for entry in &self.layout {
            match entry.binding_type {
                BindingType::UniformBuffer => {
                    bindings.push(DescriptorBinding::UniformBuffer {
                        binding: entry.binding,
                        buffer: &self.uniform_buffers[frame_index][next_uniform],
                        offset: 0,
                        range: self.uniform_sizes[next_uniform],
                        stages: entry.stages,
                    });
                    next_uniform += 1;
                }
                BindingType::UniformBufferDynamic => {
                    let Some((buffer, element_size)) = dynamic else {
                        engine_bail!(
                            LOG_SOURCE,
                            "layout has a dynamic binding but no arena was supplied"
                        );
                    };
                    bindings.push(DescriptorBinding::DynamicUniformBuffer {
                        binding: entry.binding,
                        buffer,
                        range: element_size,
                        stages: entry.stages,
                    });
                }
                BindingType::CombinedImageSampler => {
                    let (texture, sampler) = &self.textures[next_texture];
                    bindings.push(DescriptorBinding::CombinedImageSampler {
                        binding: entry.binding,
                        texture,
                        sampler,
                        stages: entry.stages,
                    });
                    next_texture += 1;
                }
            }
        }
        Ok(bindings)
    }
}

// ===== INTERNAL =====

/// Stage bytes into a device-local buffer, blocking on the copy
fn upload_device_local(
    device: &Arc<dyn GraphicsDevice>,
    data: &[u8],
    usage: BufferUsage,
) -> Result<Arc<dyn Buffer>> {
    let size = data.len() as u64;
    let staging = device.create_buffer(&BufferDesc {
        size,
        usage: BufferUsage::Staging,
        memory: MemoryKind::HostVisible,
    })?;
    staging.update(0, data)?;
    let destination = device.create_buffer(&BufferDesc {
        size,
        usage,
        memory: MemoryKind::DeviceLocal,
    })?;
    device.copy_buffer_blocking(&staging, &destination, size)?;
    Ok(destination)
}

fn create_uniform_buffers(
    device: &Arc<dyn GraphicsDevice>,
    frame_count: usize,
    uniforms: &[UniformBlock],
) -> Result<Vec<Vec<Arc<dyn Buffer>>>> {
    let mut frames = Vec::with_capacity(frame_count);
    for _ in 0..frame_count {
        let mut buffers = Vec::with_capacity(uniforms.len());
        for block in uniforms {
            if block.data.is_empty() {
                engine_bail!(LOG_SOURCE, "uniform block '{}' is empty", block.name);
            }
            let buffer = device.create_buffer(&BufferDesc {
                size: block.data.len() as u64,
                usage: BufferUsage::Uniform,
                memory: MemoryKind::HostVisible,
            })?;
            buffer.update(0, &block.data)?;
            buffers.push(buffer);
        }
        frames.push(buffers);
    }
    Ok(frames)
}

fn create_texture(
    device: &Arc<dyn GraphicsDevice>,
    spec: &TextureSpec,
) -> Result<(Arc<dyn Texture>, Arc<dyn Sampler>)> {
    let image = &spec.image;
    let (format, pixels) = if device.is_format_supported(image.format) {
        (image.format, image.pixels.clone())
    } else {
        engine_warn!(
            LOG_SOURCE,
            "Device rejects {:?}, re-packing as R8G8B8A8_UNORM",
            image.format
        );
        (
            TextureFormat::R8G8B8A8_UNORM,
            repack_rgba(&image.pixels, image.format)?,
        )
    };

    let texture = device.create_texture(&TextureDesc {
        width: image.width,
        height: image.height,
        format,
        usage: TextureUsage::Sampled,
        data: Some(pixels),
    })?;
    let sampler = device.create_sampler(&spec.sampler)?;
    Ok((texture, sampler))
}

/// Expand pixels of an unsupported color format to tightly packed RGBA8
fn repack_rgba(pixels: &[u8], format: TextureFormat) -> Result<Vec<u8>> {
    match format {
        TextureFormat::R8G8B8_UNORM => {
            let mut rgba = Vec::with_capacity(pixels.len() / 3 * 4);
            for rgb in pixels.chunks_exact(3) {
                rgba.extend_from_slice(rgb);
                rgba.push(255);
            }
            Ok(rgba)
        }
        other => Err(crate::engine_err!(
            LOG_SOURCE,
            "no fallback re-packing for {:?}",
            other
        )),
    }
}

fn build_layout(
    uniforms: &[UniformBlock],
    has_dynamic: bool,
    texture_count: usize,
) -> Vec<DescriptorLayoutEntry> {
    let mut layout = Vec::new();
    let mut binding = 0;
    for block in uniforms {
        layout.push(DescriptorLayoutEntry {
            binding,
            binding_type: BindingType::UniformBuffer,
            count: 1,
            stages: block.stages,
        });
        binding += 1;
    }
    if has_dynamic {
        layout.push(DescriptorLayoutEntry {
            binding,
            binding_type: BindingType::UniformBufferDynamic,
            count: 1,
            stages: ShaderStageFlags::VERTEX,
        });
        binding += 1;
    }
    for _ in 0..texture_count {
        layout.push(DescriptorLayoutEntry {
            binding,
            binding_type: BindingType::CombinedImageSampler,
            count: 1,
            stages: ShaderStageFlags::FRAGMENT,
        });
        binding += 1;
    }
    layout
}

#[cfg(test)]
#[path = "addons_tests.rs"]
mod tests;
