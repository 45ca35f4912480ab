use std::sync::Arc;

use super::*;
use crate::drawable::MeshData;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::{
    DecodedImage, SamplerDesc, VertexAttribute, VertexFormat,
};

fn quad_mesh() -> MeshData {
    let layout = VertexLayout {
        stride: 12,
        attributes: vec![VertexAttribute {
            location: 0,
            format: VertexFormat::F32x3,
            offset: 0,
        }],
    };
    MeshData::from_vertices(&[[0.0f32, 0.0, 0.0]; 4], layout).with_indices_u16(&[0, 1, 2, 2, 3, 0])
}

fn uniform(name: &str, bytes: usize) -> UniformBlock {
    UniformBlock {
        name: name.to_string(),
        data: vec![7; bytes],
        stages: ShaderStageFlags::VERTEX,
    }
}

fn rgba_texture() -> TextureSpec {
    TextureSpec {
        image: DecodedImage {
            pixels: vec![128; 2 * 2 * 4],
            width: 2,
            height: 2,
            format: TextureFormat::R8G8B8A8_UNORM,
        },
        sampler: SamplerDesc::default(),
    }
}

fn make(
    device: &Arc<MockGraphicsDevice>,
    frame_count: usize,
    uniforms: &[UniformBlock],
    textures: &[TextureSpec],
) -> AddOns {
    let dyn_device = device.clone() as Arc<dyn GraphicsDevice>;
    AddOns::new(&dyn_device, frame_count, &quad_mesh(), uniforms, textures, None).unwrap()
}

#[test]
fn procedural_mesh_skips_the_vertex_upload() {
    let device = MockGraphicsDevice::new();
    let dyn_device = device.clone() as Arc<dyn GraphicsDevice>;
    let addons =
        AddOns::new(&dyn_device, 2, &MeshData::procedural(3), &[], &[], None).unwrap();

    assert!(addons.vertex_buffer().is_none());
    assert_eq!(addons.vertex_count(), 3);
    assert_eq!(device.live_buffers(), 0);
}

#[test]
fn mesh_lands_in_device_local_buffers() {
    let device = MockGraphicsDevice::new();
    let addons = make(&device, 3, &[], &[]);

    assert_eq!(addons.vertex_count(), 4);
    let index = addons.index_buffer().unwrap();
    assert_eq!(index.count, 6);
    assert_eq!(index.index_type, IndexType::U16);
    // Staging copies are gone; only vertex and index buffers remain.
    assert_eq!(device.live_buffers(), 2);
    // Index bytes actually arrived through the staging path.
    assert_eq!(
        index.buffer.read_back(0, 4).unwrap(),
        bytemuck::cast_slice::<u16, u8>(&[0u16, 1]).to_vec()
    );
}

#[test]
fn uniform_buffers_are_duplicated_per_frame() {
    let device = MockGraphicsDevice::new();
    let addons = make(&device, 3, &[uniform("view", 64), uniform("light", 32)], &[]);

    // 2 mesh buffers + 3 frames x 2 blocks.
    assert_eq!(device.live_buffers(), 8);
    assert_eq!(addons.uniform_buffer(2, 1).size(), 32);
    // Initial contents are uploaded at creation.
    assert_eq!(addons.uniform_buffer(0, 0).read_back(0, 4).unwrap(), vec![7; 4]);
}

#[test]
fn update_uniform_writes_only_one_frame() {
    let device = MockGraphicsDevice::new();
    let addons = make(&device, 2, &[uniform("view", 8)], &[]);

    addons.update_uniform(1, 0, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    assert_eq!(
        addons.uniform_buffer(1, 0).read_back(0, 8).unwrap(),
        vec![1, 2, 3, 4, 5, 6, 7, 8]
    );
    assert_eq!(addons.uniform_buffer(0, 0).read_back(0, 8).unwrap(), vec![7; 8]);
}

#[test]
fn uniform_size_mismatch_is_fatal() {
    let device = MockGraphicsDevice::new();
    let addons = make(&device, 2, &[uniform("view", 8)], &[]);

    let error = addons.update_uniform(0, 0, &[0; 12]).unwrap_err();
    assert!(matches!(
        error,
        Error::UniformSizeMismatch { ref name, expected: 8, actual: 12 } if name == "view"
    ));
}

#[test]
fn layout_is_uniforms_then_textures() {
    let device = MockGraphicsDevice::new();
    let addons = make(
        &device,
        2,
        &[uniform("view", 16)],
        &[rgba_texture(), rgba_texture()],
    );

    let layout = addons.layout();
    assert_eq!(layout.len(), 3);
    assert_eq!(layout[0].binding, 0);
    assert_eq!(layout[0].binding_type, BindingType::UniformBuffer);
    assert_eq!(layout[1].binding, 1);
    assert_eq!(layout[1].binding_type, BindingType::CombinedImageSampler);
    assert_eq!(layout[2].binding, 2);
    assert_eq!(layout[2].binding_type, BindingType::CombinedImageSampler);
}

#[test]
fn dynamic_slot_sits_between_uniforms_and_textures() {
    let device = MockGraphicsDevice::new();
    let dyn_device = device.clone() as Arc<dyn GraphicsDevice>;
    let addons = AddOns::new(
        &dyn_device,
        2,
        &quad_mesh(),
        &[uniform("view", 16)],
        &[rgba_texture()],
        Some(64),
    )
    .unwrap();

    let layout = addons.layout();
    assert_eq!(layout[1].binding_type, BindingType::UniformBufferDynamic);
    assert_eq!(layout[2].binding_type, BindingType::CombinedImageSampler);
}

#[test]
fn unsupported_format_falls_back_to_rgba() {
    let device = MockGraphicsDevice::new();
    let rgb = TextureSpec {
        image: DecodedImage {
            pixels: vec![10, 20, 30, 40, 50, 60],
            width: 2,
            height: 1,
            format: TextureFormat::R8G8B8_UNORM,
        },
        sampler: SamplerDesc::default(),
    };
    let addons = make(&device, 1, &[], &[rgb]);

    assert_eq!(addons.texture_count(), 1);
    assert_eq!(
        device.created_texture_formats(),
        vec![TextureFormat::R8G8B8A8_UNORM]
    );
}

#[test]
fn recreate_per_frame_changes_duplication_count() {
    let device = MockGraphicsDevice::new();
    let uniforms = [uniform("view", 16)];
    let mut addons = make(&device, 3, &uniforms, &[]);
    assert_eq!(device.live_buffers(), 2 + 3);

    let dyn_device = device.clone() as Arc<dyn GraphicsDevice>;
    addons.recreate_per_frame(&dyn_device, 2, &uniforms).unwrap();
    assert_eq!(device.live_buffers(), 2 + 2);
}
